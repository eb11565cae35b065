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

//! Add/edit plane form dialog.
//!
//! The form stays open until the presenter confirms the save; a rejected
//! payload shows its message inline so the user can correct the fields.

use chrono::Datelike;
use planes_api::{PlaneFields, PlaneRecord};

/// Whether the form creates a new plane or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { id: i64 },
}

/// What the form asked for this frame.
#[derive(Debug, Clone)]
pub enum FormAction {
    None,
    Save(PlaneFields),
    Cancel,
}

/// State of the add/edit dialog.
#[derive(Debug)]
pub struct PlaneForm {
    mode: FormMode,
    name: String,
    year: i32,
    manufacturer: String,
    picture: String,
    seats_class_a: u32,
    seats_class_b: u32,
    seats_class_c: u32,
    error: Option<String>,
}

impl PlaneForm {
    /// Empty form for a new plane.
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            name: String::new(),
            year: chrono::Utc::now().year(),
            manufacturer: String::new(),
            picture: String::new(),
            seats_class_a: 0,
            seats_class_b: 0,
            seats_class_c: 0,
            error: None,
        }
    }

    /// Form pre-filled from an existing record.
    pub fn edit(plane: &PlaneRecord) -> Self {
        Self {
            mode: FormMode::Edit {
                id: plane.id.unwrap_or_default(),
            },
            name: plane.name.clone(),
            year: plane.year,
            manufacturer: plane.manufacturer.clone(),
            picture: plane.image_ref.clone().unwrap_or_default(),
            seats_class_a: plane.seats_class_a,
            seats_class_b: plane.seats_class_b,
            seats_class_c: plane.seats_class_c,
            error: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Show a save failure inline and re-enable the form.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Collect the current field values as a gateway payload.
    fn fields(&self) -> PlaneFields {
        let picture = self.picture.trim();
        PlaneFields {
            name: self.name.trim().to_string(),
            year: self.year,
            manufacturer: self.manufacturer.trim().to_string(),
            image_ref: (!picture.is_empty()).then(|| picture.to_string()),
            seats_class_a: self.seats_class_a,
            seats_class_b: self.seats_class_b,
            seats_class_c: self.seats_class_c,
        }
    }

    /// Draw the dialog. `busy` disables the buttons while a save is in flight.
    pub fn show(&mut self, ctx: &egui::Context, busy: bool) -> FormAction {
        let title = match self.mode {
            FormMode::Add => "Add New Plane",
            FormMode::Edit { .. } => "Edit Plane Details",
        };

        let mut action = FormAction::None;
        let mut open = true;

        egui::Window::new(title)
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Grid::new("plane_form_fields")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Name:");
                        ui.text_edit_singleline(&mut self.name);
                        ui.end_row();

                        ui.label("Year:");
                        ui.add(egui::DragValue::new(&mut self.year).speed(1));
                        ui.end_row();

                        ui.label("Made By:");
                        ui.text_edit_singleline(&mut self.manufacturer);
                        ui.end_row();

                        ui.label("Picture:");
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut self.picture)
                                    .hint_text("URL or local path"),
                            );
                            if ui.button("Browse...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp"])
                                    .pick_file()
                                {
                                    self.picture = path.display().to_string();
                                }
                            }
                        });
                        ui.end_row();

                        ui.label("Seats (1st):");
                        ui.add(egui::DragValue::new(&mut self.seats_class_a).range(0..=1000));
                        ui.end_row();

                        ui.label("Seats (business):");
                        ui.add(egui::DragValue::new(&mut self.seats_class_b).range(0..=1000));
                        ui.end_row();

                        ui.label("Seats (economy):");
                        ui.add(egui::DragValue::new(&mut self.seats_class_c).range(0..=1000));
                        ui.end_row();
                    });

                if let Some(error) = &self.error {
                    ui.add_space(6.0);
                    ui.colored_label(egui::Color32::from_rgb(200, 70, 70), error);
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!busy, |ui| {
                        if ui.button("Save").clicked() {
                            self.error = None;
                            action = FormAction::Save(self.fields());
                        }
                        if ui.button("Cancel").clicked() {
                            action = FormAction::Cancel;
                        }
                    });
                    if busy {
                        ui.spinner();
                    }
                });
            });

        if !open {
            action = FormAction::Cancel;
        }
        action
    }
}
