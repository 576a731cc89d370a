use eframe::egui;
use egui::{Color32, CornerRadius, Margin, RichText, Stroke};

pub const ACCENT_COLOR: Color32 = Color32::from_rgb(0, 120, 215);
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(0, 90, 158);
pub const HEADING_COLOR: Color32 = Color32::from_rgb(102, 194, 255);
pub const DOWNLOAD_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
pub const ERROR_COLOR: Color32 = Color32::from_rgb(229, 83, 75);
pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(87, 201, 112);
pub const SECOND_SERIES_COLOR: Color32 = Color32::from_rgb(255, 179, 102);

// Spacing constants
pub const SPACING_SMALL: f32 = 8.0;
pub const SPACING_LARGE: f32 = 20.0;

pub const MARGIN_CARD: f32 = 15.0;

pub fn apply_sweeper_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    // Blue buttons with white text
    visuals.widgets.inactive.weak_bg_fill = ACCENT_COLOR;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.widgets.inactive.corner_radius = CornerRadius::same(8);

    visuals.widgets.hovered.weak_bg_fill = ACCENT_HOVER;
    visuals.widgets.hovered.corner_radius = CornerRadius::same(8);

    visuals.widgets.active.weak_bg_fill = ACCENT_HOVER;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = ACCENT_COLOR.linear_multiply(0.5);

    visuals.window_corner_radius = CornerRadius::same(12);
    visuals.panel_fill = Color32::from_rgb(18, 18, 18);
    visuals.faint_bg_color = Color32::from_rgb(35, 35, 35);
    visuals.extreme_bg_color = Color32::from_rgb(24, 24, 24);

    ctx.set_visuals(visuals);
}

/// Frame drawn around each uploaded file.
pub fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(CornerRadius::same(12))
        .inner_margin(Margin::same(MARGIN_CARD as i8))
        .stroke(Stroke::new(
            1.0,
            ui.visuals().widgets.noninteractive.bg_stroke.color,
        ))
}

pub fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.add_space(SPACING_SMALL);
    ui.label(RichText::new(text).heading().color(HEADING_COLOR));
}

pub fn download_button(text: String) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).color(Color32::WHITE)).fill(DOWNLOAD_COLOR)
}
