//! Settings dialog: theme swatches and the Gemini API key.
//!
//! Theme changes apply and persist immediately. The key is only written when
//! the user presses "Save & Close".

use super::app::ImagenApp;
use super::rendering::accent_color;
use crate::theme::{THEMES, Theme};
use eframe::egui;

const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";
const SWATCH_SIZE: f32 = 28.0;

impl ImagenApp {
    pub(super) fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut picked: Option<Theme> = None;
        let mut save = false;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.set_width(380.0);

                ui.label(egui::RichText::new("Theme").strong());
                ui.horizontal(|ui| {
                    for theme in THEMES {
                        if swatch(ui, theme, theme.id == self.theme.id)
                            .on_hover_text(theme.name)
                            .clicked()
                        {
                            picked = Some(*theme);
                        }
                    }
                });

                ui.add_space(12.0);
                ui.label(egui::RichText::new("Gemini API Key").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut self.api_key_draft)
                        .password(true)
                        .desired_width(f32::INFINITY)
                        .hint_text("Paste your Gemini API key"),
                );
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("Needed for Image to Prompt.")
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                    ui.hyperlink_to(egui::RichText::new("Get a key").small(), API_KEY_URL);
                });

                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    save = ui.button("Save & Close").clicked();
                });
            });

        if let Some(theme) = picked {
            self.select_theme(ctx, theme);
        }
        if save {
            self.save_api_key();
        } else if !open {
            self.show_settings = false;
        }
    }
}

fn swatch(ui: &mut egui::Ui, theme: &Theme, selected: bool) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::click());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), SWATCH_SIZE / 2.0 - 2.0, accent_color(theme));
    if selected {
        painter.circle_stroke(
            rect.center(),
            SWATCH_SIZE / 2.0,
            egui::Stroke::new(2.0, egui::Color32::WHITE),
        );
    }
    response
}
