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

mod card_grid;
mod config;
mod details_window;
mod photo_cache;
mod plane_form;
mod presenter;
mod stats_window;

use clap::Parser;
use log::{info, warn};
use mimalloc::MiMalloc;
use planes_api::{ClientConfig, PlaneFilter, PlaneRecord, PlanesClient};

use crate::card_grid::CardGrid;
use crate::config::AppConfig;
use crate::details_window::{DetailsAction, DetailsWindow};
use crate::photo_cache::PhotoTextureManager;
use crate::plane_form::{FormAction, FormMode, PlaneForm};
use crate::presenter::{OpFeedback, Presenter};
use crate::stats_window::StatsWindow;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(
    name = "flysmart-desktop",
    about = "Desktop client for the FlySmart plane inventory API"
)]
struct Args {
    /// API base URL, overriding FLYSMART_API and the config file
    #[arg(long)]
    api_base: Option<String>,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let args = Args::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    let base_url = config.resolve_api_base(args.api_base.as_deref());
    info!("Starting FlySmart Desktop against {base_url}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 780.0])
            .with_title("FlySmart | Plane Manager"),
        ..Default::default()
    };

    eframe::run_native(
        "FlySmart Desktop",
        options,
        Box::new(move |cc| Ok(Box::new(FlySmartApp::new(cc, &config, base_url)))),
    )
}

struct FlySmartApp {
    presenter: Presenter,
    photos: PhotoTextureManager,
    grid: CardGrid,
    filter: PlaneFilter,
    form: Option<PlaneForm>,
    details: Option<DetailsWindow>,
    stats: StatsWindow,
    error_modal: Option<String>,
    cards_per_row: usize,
    started: bool,
}

impl FlySmartApp {
    fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig, base_url: String) -> Self {
        let client = PlanesClient::new(ClientConfig {
            base_url,
            ..Default::default()
        })
        .expect("Failed to build API client");

        let mut photos = PhotoTextureManager::new();
        photos.init_placeholder(&cc.egui_ctx);

        Self {
            presenter: Presenter::new(client),
            photos,
            grid: CardGrid::new(),
            filter: PlaneFilter::default(),
            form: None,
            details: None,
            stats: StatsWindow {
                open: config.show_stats_on_startup,
            },
            error_modal: None,
            cards_per_row: config.cards_per_row,
            started: false,
        }
    }

    fn apply_feedback(&mut self, feedback: OpFeedback) {
        match feedback {
            OpFeedback::Reloaded { .. } => self.drop_stale_filters(),
            OpFeedback::ReloadFailed { message } | OpFeedback::DeleteFailed { message } => {
                self.error_modal = Some(message);
            }
            OpFeedback::Saved { .. } => {
                self.form = None;
            }
            OpFeedback::SaveFailed { message } => match self.form.as_mut() {
                Some(form) => form.set_error(message),
                None => self.error_modal = Some(message),
            },
            OpFeedback::Deleted { id } => {
                if self.details.as_ref().is_some_and(|d| d.id == id) {
                    self.details = None;
                }
            }
        }
    }

    /// A fresh snapshot can invalidate combo selections; fall back to "all".
    fn drop_stale_filters(&mut self) {
        let store = self.presenter.store();
        if let Some(maker) = &self.filter.manufacturer {
            if !store.manufacturers().contains(maker) {
                self.filter.manufacturer = None;
            }
        }
        if let Some(year) = self.filter.year {
            if !store.years().contains(&year) {
                self.filter.year = None;
            }
        }
    }

    fn draw_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Plane Manager").size(22.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_enabled_ui(!self.presenter.busy() && self.form.is_none(), |ui| {
                        if ui.button("+ Add Plane").clicked() {
                            self.form = Some(PlaneForm::add());
                        }
                    });
                    if ui.button("Statistics").clicked() {
                        self.stats.open = !self.stats.open;
                    }
                    if ui.button("Reload").clicked() {
                        self.presenter.reload(ui.ctx());
                    }
                });
            });
            ui.add_space(4.0);
            self.draw_filter_bar(ui);
            ui.add_space(6.0);
        });
    }

    fn draw_filter_bar(&mut self, ui: &mut egui::Ui) {
        let makers = self.presenter.store().manufacturers();
        let years = self.presenter.store().years();

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.filter.search)
                    .hint_text("Search by name or manufacturer...")
                    .desired_width(280.0),
            );

            let maker_label = self
                .filter
                .manufacturer
                .clone()
                .unwrap_or_else(|| "All Manufacturers".to_string());
            egui::ComboBox::from_id_salt("maker_filter")
                .selected_text(maker_label)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.filter.manufacturer.is_none(), "All Manufacturers")
                        .clicked()
                    {
                        self.filter.manufacturer = None;
                    }
                    for maker in &makers {
                        let selected = self.filter.manufacturer.as_deref() == Some(maker);
                        if ui.selectable_label(selected, maker).clicked() {
                            self.filter.manufacturer = Some(maker.clone());
                        }
                    }
                });

            let year_label = self
                .filter
                .year
                .map_or_else(|| "All Years".to_string(), |y| y.to_string());
            egui::ComboBox::from_id_salt("year_filter")
                .selected_text(year_label)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.filter.year.is_none(), "All Years")
                        .clicked()
                    {
                        self.filter.year = None;
                    }
                    for year in &years {
                        let selected = self.filter.year == Some(*year);
                        if ui.selectable_label(selected, year.to_string()).clicked() {
                            self.filter.year = Some(*year);
                        }
                    }
                });

            if ui.button("Clear").clicked() {
                self.filter = PlaneFilter::default();
            }
        });
    }

    fn draw_status_bar(&mut self, ctx: &egui::Context, shown: usize) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.presenter.busy() {
                    ui.spinner();
                }
                ui.label(self.presenter.status_line());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (api_ok, db_ok) = self.presenter.health();
                    health_indicator(ui, "DB", db_ok);
                    health_indicator(ui, "API", api_ok);
                    ui.separator();
                    ui.label(format!("{shown} of {} planes", self.presenter.store().len()));
                });
            });
        });
    }

    fn draw_cards(&mut self, ctx: &egui::Context, filtered: &[PlaneRecord]) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(id) = self
                .grid
                .show(ui, &self.photos, filtered, self.cards_per_row)
            {
                self.details = Some(DetailsWindow::new(id));
            }
        });
    }

    fn draw_dialogs(&mut self, ctx: &egui::Context, filtered: &[PlaneRecord]) {
        if let Some(form) = self.form.as_mut() {
            match form.show(ctx, self.presenter.busy()) {
                FormAction::Save(fields) => match form.mode() {
                    FormMode::Add => self.presenter.create(ctx, fields),
                    FormMode::Edit { id } => self.presenter.update(ctx, id, fields),
                },
                FormAction::Cancel => self.form = None,
                FormAction::None => {}
            }
        }

        if let Some(details) = self.details.as_mut() {
            // The record can disappear underneath an open window (delete
            // confirmed elsewhere, reload); close rather than show stale data.
            match self.presenter.store().get_by_id(details.id).cloned() {
                None => self.details = None,
                Some(plane) => {
                    match details.show(ctx, &self.photos, &plane, self.presenter.busy()) {
                        DetailsAction::Edit(_) => self.form = Some(PlaneForm::edit(&plane)),
                        DetailsAction::Delete(id) => self.presenter.delete(ctx, id),
                        DetailsAction::Close => self.details = None,
                        DetailsAction::None => {}
                    }
                }
            }
        }

        self.stats.show(ctx, filtered);

        if let Some(message) = self.error_modal.clone() {
            let mut open = true;
            let mut dismissed = false;
            egui::Window::new("Error")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if !open || dismissed {
                self.error_modal = None;
            }
        }
    }
}

impl eframe::App for FlySmartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.started {
            self.started = true;
            self.presenter.reload(ctx);
            self.presenter.probe_health(ctx);
        }

        for feedback in self.presenter.poll(ctx) {
            self.apply_feedback(feedback);
        }

        self.draw_header(ctx);

        // Derived view over the authoritative collection, recomputed every
        // frame; filter changes never mutate the collection itself.
        let filtered = self.presenter.store().filtered(&self.filter);

        self.draw_status_bar(ctx, filtered.len());
        self.draw_cards(ctx, &filtered);
        self.draw_dialogs(ctx, &filtered);
    }
}

fn health_indicator(ui: &mut egui::Ui, label: &str, state: Option<bool>) {
    let (color, symbol) = match state {
        Some(true) => (egui::Color32::from_rgb(100, 200, 100), "●"),
        Some(false) => (egui::Color32::from_rgb(220, 90, 90), "●"),
        None => (egui::Color32::from_rgb(150, 150, 150), "○"),
    };
    ui.label(egui::RichText::new(format!("{symbol} {label}")).color(color).size(11.0));
}
