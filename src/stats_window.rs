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

//! Aggregate statistics over the currently displayed planes.
//!
//! Non-modal window with two bar charts (counts by manufacturer and by
//! year). The aggregation runs against the filtered view every frame, so
//! the charts follow the filters as they change.

use egui_plot::{Bar, BarChart, Plot};
use planes_api::PlaneRecord;

/// Non-modal statistics window.
#[derive(Debug, Default)]
pub struct StatsWindow {
    pub open: bool,
}

impl StatsWindow {
    pub fn show(&mut self, ctx: &egui::Context, planes: &[PlaneRecord]) {
        if !self.open {
            return;
        }

        let by_manufacturer = count_by_manufacturer(planes);
        let by_year = count_by_year(planes);

        let mut open = self.open;
        egui::Window::new("Planes Overview")
            .open(&mut open)
            .default_size([760.0, 480.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Distribution by Manufacturer").size(14.0).strong());
                draw_manufacturer_chart(ui, &by_manufacturer);

                ui.add_space(12.0);
                ui.label(egui::RichText::new("Planes by Year of Manufacture").size(14.0).strong());
                draw_year_chart(ui, &by_year);

                ui.add_space(8.0);
                ui.separator();
                ui.label(
                    egui::RichText::new(summary_line(planes, &by_manufacturer, &by_year))
                        .size(12.0)
                        .color(egui::Color32::from_rgb(75, 110, 130)),
                );
            });
        self.open = open;
    }
}

fn draw_manufacturer_chart(ui: &mut egui::Ui, counts: &[(String, usize)]) {
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (_, count))| Bar::new(i as f64, *count as f64).width(0.6))
        .collect();

    let labels: Vec<String> = counts.iter().map(|(maker, _)| maker.clone()).collect();

    Plot::new("stats_by_manufacturer")
        .height(180.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_grid(false)
        .x_axis_formatter(move |mark, _range| {
            let index = mark.value.round() as usize;
            if (mark.value - index as f64).abs() < 0.01 {
                labels.get(index).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("Planes", bars));
        });
}

fn draw_year_chart(ui: &mut egui::Ui, counts: &[(i32, usize)]) {
    let bars: Vec<Bar> = counts
        .iter()
        .map(|(year, count)| Bar::new(f64::from(*year), *count as f64).width(0.6))
        .collect();

    Plot::new("stats_by_year")
        .height(180.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_grid(false)
        .x_axis_formatter(|mark, _range| {
            let year = mark.value.round();
            if (mark.value - year).abs() < 0.01 {
                format!("{year:.0}")
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("Planes", bars));
        });
}

fn summary_line(
    planes: &[PlaneRecord],
    by_manufacturer: &[(String, usize)],
    by_year: &[(i32, usize)],
) -> String {
    match (by_year.first(), by_year.last()) {
        (Some((first, _)), Some((last, _))) => format!(
            "{} planes from {} manufacturers, built {}-{}",
            planes.len(),
            by_manufacturer.len(),
            first,
            last
        ),
        _ => "No planes in the current view".to_string(),
    }
}

/// Plane counts per manufacturer, sorted by name.
fn count_by_manufacturer(planes: &[PlaneRecord]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for plane in planes {
        match counts.iter_mut().find(|(maker, _)| *maker == plane.manufacturer) {
            Some((_, count)) => *count += 1,
            None => counts.push((plane.manufacturer.clone(), 1)),
        }
    }
    counts.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    counts
}

/// Plane counts per manufacturing year, sorted by year.
fn count_by_year(planes: &[PlaneRecord]) -> Vec<(i32, usize)> {
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for plane in planes {
        match counts.iter_mut().find(|(year, _)| *year == plane.year) {
            Some((_, count)) => *count += 1,
            None => counts.push((plane.year, 1)),
        }
    }
    counts.sort_unstable_by_key(|(year, _)| *year);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(maker: &str, year: i32) -> PlaneRecord {
        PlaneRecord {
            id: Some(1),
            name: "test".to_string(),
            year,
            manufacturer: maker.to_string(),
            image_ref: None,
            seats_class_a: 0,
            seats_class_b: 0,
            seats_class_c: 100,
        }
    }

    #[test]
    fn test_count_by_manufacturer_sorted() {
        let planes = vec![
            plane("Boeing", 2017),
            plane("Airbus", 2016),
            plane("Boeing", 2011),
        ];
        assert_eq!(
            count_by_manufacturer(&planes),
            vec![("Airbus".to_string(), 1), ("Boeing".to_string(), 2)]
        );
    }

    #[test]
    fn test_count_by_year_sorted() {
        let planes = vec![
            plane("Boeing", 2017),
            plane("Airbus", 2016),
            plane("Boeing", 2017),
        ];
        assert_eq!(count_by_year(&planes), vec![(2016, 1), (2017, 2)]);
    }

    #[test]
    fn test_summary_line() {
        let planes = vec![plane("Boeing", 2011), plane("Airbus", 2016)];
        let makers = count_by_manufacturer(&planes);
        let years = count_by_year(&planes);
        assert_eq!(
            summary_line(&planes, &makers, &years),
            "2 planes from 2 manufacturers, built 2011-2016"
        );
        assert_eq!(
            summary_line(&[], &[], &[]),
            "No planes in the current view"
        );
    }
}
