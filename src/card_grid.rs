// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Card grid rendering for the filtered plane collection.
//!
//! Each card walks the photo state machine: cache hit draws immediately,
//! otherwise a background load is requested and the placeholder shows until
//! the load finishes or fails. The grid owns a liveness token for its photo
//! loads; rebuilding the displayed set cancels the old token so loads
//! finishing afterwards are discarded.

use planes_api::PlaneRecord;
use tokio_util::sync::CancellationToken;

use crate::photo_cache::{PhotoState, PhotoTextureManager};

const CARD_WIDTH: f32 = 340.0;
const CARD_HEIGHT: f32 = 290.0;
const IMAGE_SIZE: egui::Vec2 = egui::Vec2::new(260.0, 150.0);

/// Grid of plane cards over the currently displayed records.
#[derive(Debug)]
pub struct CardGrid {
    liveness: CancellationToken,
    displayed_refs: Vec<String>,
}

impl CardGrid {
    pub fn new() -> Self {
        Self {
            liveness: CancellationToken::new(),
            displayed_refs: Vec::new(),
        }
    }

    /// Draw the grid; returns the id of a clicked card, if any.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        photos: &PhotoTextureManager,
        planes: &[PlaneRecord],
        cards_per_row: usize,
    ) -> Option<i64> {
        self.refresh_liveness(planes);

        let mut clicked = None;
        let cards_per_row = cards_per_row.max(1);

        egui::ScrollArea::vertical().show(ui, |ui| {
            if planes.is_empty() {
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("No planes match the current filters")
                            .size(15.0)
                            .color(egui::Color32::from_rgb(90, 109, 120)),
                    );
                });
                return;
            }

            for row in planes.chunks(cards_per_row) {
                ui.horizontal(|ui| {
                    for plane in row {
                        if self.draw_card(ui, photos, plane).clicked() {
                            clicked = plane.id;
                        }
                    }
                });
                ui.add_space(12.0);
            }
        });

        clicked
    }

    /// Cancel in-flight photo loads when the displayed set changes.
    fn refresh_liveness(&mut self, planes: &[PlaneRecord]) {
        let refs: Vec<String> = planes
            .iter()
            .filter_map(|p| p.image_ref.clone())
            .collect();
        if refs != self.displayed_refs {
            self.liveness.cancel();
            self.liveness = CancellationToken::new();
            self.displayed_refs = refs;
        }
    }

    fn draw_card(
        &self,
        ui: &mut egui::Ui,
        photos: &PhotoTextureManager,
        plane: &PlaneRecord,
    ) -> egui::Response {
        let frame = egui::Frame::group(ui.style()).fill(ui.visuals().extreme_bg_color);

        let inner = ui.allocate_ui(egui::vec2(CARD_WIDTH, CARD_HEIGHT), |ui| {
            frame.show(ui, |ui| {
                ui.set_min_size(egui::vec2(CARD_WIDTH - 16.0, CARD_HEIGHT - 16.0));
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    self.draw_photo(ui, photos, plane);
                    ui.add_space(6.0);

                    ui.label(egui::RichText::new(&plane.name).size(16.0).strong());
                    ui.label(
                        egui::RichText::new(format!(
                            "{} · {} · Seats: {}",
                            plane.manufacturer,
                            plane.year,
                            plane.total_seats()
                        ))
                        .size(13.0)
                        .color(egui::Color32::from_rgb(90, 109, 120)),
                    );
                });
            });
        });

        let id = ui.id().with(("plane_card", plane.id));
        ui.interact(inner.response.rect, id, egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand)
    }

    fn draw_photo(&self, ui: &mut egui::Ui, photos: &PhotoTextureManager, plane: &PlaneRecord) {
        let texture = match plane.image_ref.as_deref() {
            Some(image_ref) => match photos.get(image_ref) {
                Some(PhotoState::Loaded(texture)) => Some(texture),
                Some(PhotoState::Loading) => None,
                Some(PhotoState::Failed) => None,
                None => {
                    photos.request(ui.ctx(), image_ref, &self.liveness);
                    None
                }
            },
            None => None,
        };

        match texture {
            Some(texture) => {
                ui.add(egui::Image::new(&texture).fit_to_exact_size(IMAGE_SIZE));
            }
            None => {
                // Fallback icon while loading, on failure, or with no reference
                if let Some(placeholder) = photos.placeholder() {
                    ui.add(egui::Image::new(placeholder).fit_to_exact_size(IMAGE_SIZE));
                } else {
                    ui.allocate_space(IMAGE_SIZE);
                }
            }
        }
    }
}

impl Default for CardGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CardGrid {
    fn drop(&mut self) {
        self.liveness.cancel();
    }
}
