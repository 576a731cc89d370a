use crate::chart::ChartData;
use crate::theme;
use eframe::egui;
use egui_plot::{Bar, BarChart, Legend, Plot};
use std::hash::Hash;

const SERIES_COLORS: [egui::Color32; 2] = [theme::ACCENT_COLOR, theme::SECOND_SERIES_COLOR];

/// Grouped bar chart, one group per row.
pub fn render_bar_chart(ui: &mut egui::Ui, id_salt: impl Hash, chart: &ChartData, height: f32) {
    if chart.is_empty() {
        ui.label("No numeric columns to plot.");
        return;
    }

    let charts: Vec<BarChart> = chart
        .grouped_bars()
        .into_iter()
        .enumerate()
        .map(|(index, series)| {
            let color = SERIES_COLORS
                .get(index % SERIES_COLORS.len())
                .copied()
                .unwrap_or(theme::ACCENT_COLOR);
            let bars = series
                .bars
                .iter()
                .map(|&(x, y)| Bar::new(x, y).width(series.width))
                .collect();
            let name = series.name.clone();
            BarChart::new(series.name, bars)
                .color(color)
                .element_formatter(Box::new(move |bar, _| {
                    format!("{name}\nRow {}: {}", bar.argument.round().abs(), bar.value)
                }))
        })
        .collect();

    Plot::new(id_salt)
        .legend(Legend::default())
        .height(height)
        .allow_scroll(false)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for bar_chart in charts {
                plot_ui.bar_chart(bar_chart);
            }
        });
}
