use super::app::ImagenApp;
use super::rendering::{accent_button, error_banner, fit_width, placeholder};
use crate::state::{ASPECT_RATIOS, LoadStatus, TextToImageEvent};
use eframe::egui;

const MAX_IMAGE_WIDTH: f32 = 480.0;

impl ImagenApp {
    pub(super) fn text_to_image_panel(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();

        if let Some(error) = self.tti.error.clone() {
            if error_banner(ui, &error) {
                self.dispatch_tti(&ctx, TextToImageEvent::ErrorDismissed);
            }
            ui.add_space(8.0);
        }

        ui.label(egui::RichText::new("Your prompt").strong());
        let mut prompt = self.tti.prompt.clone();
        let edited = ui.add(
            egui::TextEdit::multiline(&mut prompt)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
                .hint_text("Describe the image you want to create"),
        );
        if edited.changed() {
            self.dispatch_tti(&ctx, TextToImageEvent::PromptEdited(prompt));
        }

        ui.horizontal(|ui| {
            let enhance = ui.add_enabled(!self.tti.is_enhancing, egui::Button::new("✨ Enhance"));
            if self.tti.is_enhancing {
                ui.spinner();
                ui.label("Enhancing...");
            }
            if enhance.clicked() {
                self.dispatch_tti(&ctx, TextToImageEvent::EnhanceRequested);
            }
        });

        if !self.tti.enhanced_prompt.is_empty() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("Enhanced prompt").strong());
            let mut enhanced = self.tti.enhanced_prompt.clone();
            if ui
                .add(
                    egui::TextEdit::multiline(&mut enhanced)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                self.dispatch_tti(&ctx, TextToImageEvent::EnhancedPromptEdited(enhanced));
            }

            let mut use_enhanced = self.tti.use_enhanced;
            if ui
                .checkbox(&mut use_enhanced, "Use enhanced prompt")
                .changed()
            {
                self.dispatch_tti(&ctx, TextToImageEvent::UseEnhancedToggled(use_enhanced));
            }
        }

        ui.add_space(8.0);
        let mut picked_aspect = None;
        let mut picked_model = None;
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Aspect ratio")
                .selected_text(self.tti.aspect_ratio.label)
                .show_ui(ui, |ui| {
                    for aspect in ASPECT_RATIOS {
                        if ui
                            .selectable_label(*aspect == self.tti.aspect_ratio, aspect.label)
                            .clicked()
                        {
                            picked_aspect = Some(*aspect);
                        }
                    }
                });

            ui.add_space(12.0);
            egui::ComboBox::from_label("Model")
                .selected_text(self.tti.model.as_str())
                .show_ui(ui, |ui| {
                    for model in &self.models {
                        if ui.selectable_label(*model == self.tti.model, model.as_str()).clicked() {
                            picked_model = Some(model.clone());
                        }
                    }
                });
        });
        if let Some(aspect) = picked_aspect {
            self.dispatch_tti(&ctx, TextToImageEvent::AspectRatioSelected(aspect));
        }
        if let Some(model) = picked_model {
            self.dispatch_tti(&ctx, TextToImageEvent::ModelSelected(model));
        }

        ui.add_space(12.0);
        let label = if self.tti.is_generating {
            "Generating..."
        } else {
            "Generate"
        };
        if accent_button(ui, &self.theme, !self.tti.is_generating, label) {
            self.dispatch_tti(&ctx, TextToImageEvent::GenerateRequested);
        }

        if !self.tti.images.is_empty() {
            ui.add_space(16.0);
            self.generated_images(ui, &ctx);
        }
    }

    fn generated_images(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let aspect = self.tti.aspect_ratio;
        let slot_width = ((ui.available_width() - 16.0) / 2.0).clamp(160.0, MAX_IMAGE_WIDTH);
        let size = fit_width(aspect.width, aspect.height, slot_width);

        let mut download = None;
        ui.horizontal_wrapped(|ui| {
            for (index, image) in self.tti.images.iter().enumerate() {
                ui.vertical(|ui| {
                    match (image.status, self.textures.get(index).and_then(Option::as_ref)) {
                        (LoadStatus::Loaded, Some(texture)) => {
                            ui.add(egui::Image::from_texture(texture).fit_to_exact_size(size));
                            let busy = self.downloads.is_busy(index);
                            let text = if busy { "Downloading..." } else { "⬇ Download" };
                            if ui.add_enabled(!busy, egui::Button::new(text)).clicked() {
                                download = Some(index);
                            }
                        }
                        (LoadStatus::Failed, _) => placeholder(ui, size, false, "Failed to load"),
                        _ => placeholder(ui, size, true, ""),
                    }
                });
            }
        });

        if let Some(index) = download {
            self.start_download(ctx, index);
        }
    }
}
