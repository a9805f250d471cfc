use super::app::ImagenApp;
use super::rendering::{accent_button, accent_color, error_banner};
use crate::state::ImageToPromptEvent;
use eframe::egui;
use std::path::PathBuf;

const DROP_ZONE_HEIGHT: f32 = 260.0;

impl ImagenApp {
    pub(super) fn image_to_prompt_panel(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();

        if let Some(error) = self.itp.error.clone() {
            if error_banner(ui, &error) {
                self.dispatch_itp(&ctx, ImageToPromptEvent::ErrorDismissed);
            }
            ui.add_space(8.0);
        }

        self.drop_zone(ui);

        ui.add_space(8.0);
        let mut open = false;
        ui.horizontal(|ui| {
            let field = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .desired_width(360.0)
                    .hint_text("Path to a PNG, JPEG, GIF or WebP file"),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            open = ui.button("Open").clicked() || submitted;
        });
        if open && !self.path_input.trim().is_empty() {
            let path = PathBuf::from(self.path_input.trim());
            self.select_path(&ctx, &path);
        }

        ui.add_space(12.0);
        let label = if self.itp.is_loading {
            "Generating..."
        } else {
            "Generate Prompt"
        };
        if accent_button(ui, &self.theme, !self.itp.is_loading, label) {
            self.dispatch_itp(
                &ctx,
                ImageToPromptEvent::GenerateRequested {
                    has_credential: self.settings.has_api_key(),
                },
            );
        }
        if self.itp.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing image...");
            });
        }

        if !self.itp.generated_prompt.is_empty() {
            ui.add_space(16.0);
            self.generated_prompt(ui, &ctx);
        }
    }

    fn drop_zone(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let stroke = if hovering {
            egui::Stroke::new(2.0, accent_color(&self.theme))
        } else {
            egui::Stroke::new(1.0, egui::Color32::from_white_alpha(40))
        };

        egui::Frame::group(ui.style())
            .stroke(stroke)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_size(egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT));
                ui.vertical_centered(|ui| match &self.preview_texture {
                    Some(texture) => {
                        ui.add(
                            egui::Image::from_texture(texture)
                                .max_height(DROP_ZONE_HEIGHT)
                                .maintain_aspect_ratio(true),
                        );
                        if let Some(image) = &self.itp.image {
                            ui.label(egui::RichText::new(image.file_name()).small());
                        }
                    }
                    None => {
                        ui.add_space(DROP_ZONE_HEIGHT / 2.0 - 20.0);
                        ui.label(egui::RichText::new("Drag & drop an image here").strong());
                        ui.label(
                            egui::RichText::new("PNG, JPG, GIF or WebP up to 4MB")
                                .small()
                                .color(egui::Color32::GRAY),
                        );
                    }
                });
            });
    }

    fn generated_prompt(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label(egui::RichText::new("Generated prompt").strong());

        let mut text = self.itp.generated_prompt.as_str();
        ui.add(
            egui::TextEdit::multiline(&mut text)
                .desired_rows(5)
                .desired_width(f32::INFINITY),
        );

        let label = if self.recently_copied() {
            "✔ Copied!"
        } else {
            "📋 Copy"
        };
        if ui.button(label).clicked() {
            self.copy_prompt(ctx);
        }
    }
}
