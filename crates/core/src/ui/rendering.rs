//! Rendering helpers shared by the panels.

use crate::image_processing::DecodedImage;
use crate::theme::Theme;
use eframe::egui;

pub fn accent_color(theme: &Theme) -> egui::Color32 {
    let [r, g, b] = theme.swatch;
    egui::Color32::from_rgb(r, g, b)
}

/// Applies a theme to the whole UI.
///
/// Replaces the global visuals, so every widget picks up the new accent on
/// the next frame without per-panel handling.
pub fn apply_theme(ctx: &egui::Context, theme: &Theme) {
    let accent = accent_color(theme);
    let mut visuals = egui::Visuals::dark();

    visuals.selection.bg_fill = accent.gamma_multiply(0.55);
    visuals.selection.stroke = egui::Stroke::new(1.0, accent);
    visuals.hyperlink_color = accent;
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, accent);
    visuals.widgets.active.bg_fill = accent.gamma_multiply(0.8);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, accent);

    ctx.set_visuals(visuals);
}

/// Converts decoded pixels for texture upload.
pub fn color_image(image: &DecodedImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(image.size(), &image.pixels)
}

/// Draws an inline error with a dismiss button.
///
/// Returns `true` when the user dismissed it.
pub fn error_banner(ui: &mut egui::Ui, message: &str) -> bool {
    let mut dismissed = false;
    egui::Frame::group(ui.style())
        .fill(egui::Color32::from_rgb(60, 20, 20))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(200, 60, 60)))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(255, 170, 170)));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        dismissed = true;
                    }
                });
            });
        });
    dismissed
}

/// Primary action button filled with the theme accent.
pub fn accent_button(ui: &mut egui::Ui, theme: &Theme, enabled: bool, text: &str) -> bool {
    let button = egui::Button::new(egui::RichText::new(text).strong().color(egui::Color32::BLACK))
        .fill(accent_color(theme))
        .min_size(egui::vec2(160.0, 32.0));
    ui.add_enabled(enabled, button).clicked()
}

/// Placeholder box with the given aspect while an image is loading or missing.
pub fn placeholder(ui: &mut egui::Ui, size: egui::Vec2, spinner: bool, text: &str) {
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter()
        .rect_filled(rect, 8.0, egui::Color32::from_black_alpha(90));
    ui.painter().rect_stroke(
        rect,
        8.0,
        egui::Stroke::new(1.0, egui::Color32::from_white_alpha(25)),
        egui::StrokeKind::Inside,
    );

    let mut child = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(rect)
            .layout(egui::Layout::centered_and_justified(egui::Direction::TopDown)),
    );
    if spinner {
        child.spinner();
    } else {
        child.label(egui::RichText::new(text).color(egui::Color32::GRAY));
    }
}

/// Scales `(width, height)` to fit `max_width`, keeping the aspect.
pub fn fit_width(width: u32, height: u32, max_width: f32) -> egui::Vec2 {
    let scale = max_width / width.max(1) as f32;
    egui::vec2(max_width, height as f32 * scale)
}
