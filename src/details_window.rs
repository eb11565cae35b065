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

//! Plane details window with edit/delete actions.
//!
//! Deletion is a two-step confirmation. The window owns a liveness token for
//! its large photo load and is closed by the app when its record is deleted.

use planes_api::PlaneRecord;
use tokio_util::sync::CancellationToken;

use crate::photo_cache::{PhotoState, PhotoTextureManager};

const DETAIL_IMAGE_SIZE: egui::Vec2 = egui::Vec2::new(420.0, 220.0);

/// What the details window asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsAction {
    None,
    Edit(i64),
    Delete(i64),
    Close,
}

/// State of one open details window.
#[derive(Debug)]
pub struct DetailsWindow {
    pub id: i64,
    liveness: CancellationToken,
    confirm_delete: bool,
}

impl DetailsWindow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            liveness: CancellationToken::new(),
            confirm_delete: false,
        }
    }

    /// Draw the window for `plane` (already looked up by the caller).
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        photos: &PhotoTextureManager,
        plane: &PlaneRecord,
        busy: bool,
    ) -> DetailsAction {
        let mut action = DetailsAction::None;
        let mut open = true;

        egui::Window::new(format!("Plane Details – {}", plane.name))
            .id(egui::Id::new(("plane_details", self.id)))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    self.draw_photo(ui, photos, plane);
                });
                ui.add_space(10.0);

                egui::Grid::new(("details_fields", self.id))
                    .num_columns(2)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new("Manufacturer:").strong());
                        ui.label(&plane.manufacturer);
                        ui.end_row();

                        ui.label(egui::RichText::new("Year:").strong());
                        ui.label(plane.year.to_string());
                        ui.end_row();

                        ui.label(egui::RichText::new("Seats:").strong());
                        ui.label(format!(
                            "{} / {} / {} (total {})",
                            plane.seats_class_a,
                            plane.seats_class_b,
                            plane.seats_class_c,
                            plane.total_seats()
                        ));
                        ui.end_row();
                    });

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!busy, |ui| {
                        if ui.button("Edit").clicked() {
                            action = DetailsAction::Edit(self.id);
                        }
                        if !self.confirm_delete {
                            if ui.button("Delete").clicked() {
                                self.confirm_delete = true;
                            }
                        }
                    });

                    if let Some(url) = plane.image_ref.as_deref() {
                        if url.starts_with("http") && ui.button("Open picture link").clicked() {
                            if let Err(e) = webbrowser::open(url) {
                                log::warn!("failed to open picture link: {e}");
                            }
                        }
                    }
                });

                if self.confirm_delete {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.colored_label(
                            egui::Color32::from_rgb(200, 70, 70),
                            format!("Delete {}?", plane.name),
                        );
                        ui.add_enabled_ui(!busy, |ui| {
                            if ui.button("Yes, delete").clicked() {
                                action = DetailsAction::Delete(self.id);
                            }
                            if ui.button("Keep").clicked() {
                                self.confirm_delete = false;
                            }
                        });
                    });
                }

                if busy {
                    ui.add_space(4.0);
                    ui.spinner();
                }
            });

        if !open {
            action = DetailsAction::Close;
        }
        action
    }

    fn draw_photo(&self, ui: &mut egui::Ui, photos: &PhotoTextureManager, plane: &PlaneRecord) {
        let texture = match plane.image_ref.as_deref() {
            Some(image_ref) => match photos.get(image_ref) {
                Some(PhotoState::Loaded(texture)) => Some(texture),
                Some(PhotoState::Loading) | Some(PhotoState::Failed) => None,
                None => {
                    photos.request(ui.ctx(), image_ref, &self.liveness);
                    None
                }
            },
            None => None,
        };

        match texture {
            Some(texture) => {
                ui.add(egui::Image::new(&texture).fit_to_exact_size(DETAIL_IMAGE_SIZE));
            }
            None => {
                if let Some(placeholder) = photos.placeholder() {
                    ui.add(egui::Image::new(placeholder).fit_to_exact_size(DETAIL_IMAGE_SIZE));
                } else {
                    ui.allocate_space(DETAIL_IMAGE_SIZE);
                }
            }
        }
    }
}

impl Drop for DetailsWindow {
    fn drop(&mut self) {
        self.liveness.cancel();
    }
}
