//! Main application window.
//!
//! `ImagenApp` owns both flow states and routes every user action through the
//! flow reducers. Commands the reducers emit are turned into background tasks
//! here, and their results come back as [`TaskEvent`]s that are fed into the
//! reducers again on the next frame.

use super::LaunchOptions;
use super::rendering::{apply_theme, color_image};
use super::state::{Downloads, Tab, TaskEvent};
use super::tasks::{TaskRunner, download_dir, download_to, fetch_and_decode};
use crate::config::Config;
use crate::error::Result;
use crate::gemini::{DescribeImage, GeminiClient};
use crate::image_processing::{ImageProcessor, ImageUpload};
use crate::pollinations::{FALLBACK_MODELS, PollinationsClient};
use crate::settings::SettingsStore;
use crate::state::text_to_image::IMAGES_PER_GENERATION;
use crate::state::{
    ImageToPromptCommand, ImageToPromptEvent, ImageToPromptState, TextToImageCommand,
    TextToImageEvent, TextToImageState,
};
use crate::theme::Theme;
use eframe::egui;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long the "Copied!" confirmation stays visible.
pub(super) const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

pub struct ImagenApp {
    pub(super) settings: SettingsStore,
    pub(super) theme: Theme,
    pollinations: Arc<PollinationsClient>,
    describer: Arc<dyn DescribeImage>,
    tasks: TaskRunner,

    pub(super) active_tab: Tab,
    pub(super) show_settings: bool,
    pub(super) api_key_draft: String,

    // Text to image
    pub(super) tti: TextToImageState,
    pub(super) models: Vec<String>,
    pub(super) textures: Vec<Option<egui::TextureHandle>>,
    /// Prompt the current images were generated from, used for file names.
    pub(super) generated_from: String,
    pub(super) downloads: Downloads,

    // Image to prompt
    pub(super) itp: ImageToPromptState,
    pub(super) preview_texture: Option<egui::TextureHandle>,
    pub(super) path_input: String,
    pub(super) copied_at: Option<Instant>,

    /// One-line status shown in the footer.
    pub(super) notice: Option<String>,
}

impl ImagenApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, options: LaunchOptions) -> Result<Self> {
        let mut settings = match &options.settings_path {
            Some(path) => SettingsStore::open(path),
            None => SettingsStore::open_default(),
        };
        if let Some(key) = &config.gemini_api_key {
            settings = settings.with_fallback_api_key(key.clone());
        }

        let theme = settings.theme();
        apply_theme(&cc.egui_ctx, &theme);

        let pollinations = Arc::new(PollinationsClient::new(&config)?);
        let describer: Arc<dyn DescribeImage> = Arc::new(GeminiClient::new(&config));
        let tasks = TaskRunner::new()?;

        tracing::info!(
            "Starting on {:?} tab with theme {} and vision model {}",
            options.initial_tab,
            theme.id,
            config.gemini_model
        );

        let mut app = Self {
            settings,
            theme,
            pollinations,
            describer,
            tasks,
            active_tab: options.initial_tab,
            show_settings: false,
            api_key_draft: String::new(),
            tti: TextToImageState::default(),
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            textures: Vec::new(),
            generated_from: String::new(),
            downloads: Downloads::default(),
            itp: ImageToPromptState::default(),
            preview_texture: None,
            path_input: String::new(),
            copied_at: None,
            notice: None,
        };

        if options.open_settings {
            app.open_settings();
        }
        app.fetch_models(&cc.egui_ctx);

        Ok(app)
    }

    fn fetch_models(&self, ctx: &egui::Context) {
        let client = self.pollinations.clone();
        self.tasks.spawn(ctx, async move {
            TaskEvent::ModelsFetched(client.fetch_image_models().await)
        });
    }

    pub(super) fn dispatch_tti(&mut self, ctx: &egui::Context, event: TextToImageEvent) {
        let (state, command) = std::mem::take(&mut self.tti).reduce(event);
        self.tti = state;
        if let Some(command) = command {
            self.run_tti_command(ctx, command);
        }
    }

    pub(super) fn dispatch_itp(&mut self, ctx: &egui::Context, event: ImageToPromptEvent) {
        let (state, command) = std::mem::take(&mut self.itp).reduce(event);
        self.itp = state;
        if let Some(command) = command {
            self.run_itp_command(ctx, command);
        }
    }

    fn run_tti_command(&mut self, ctx: &egui::Context, command: TextToImageCommand) {
        match command {
            TextToImageCommand::Enhance { prompt } => {
                let client = self.pollinations.clone();
                self.tasks.spawn(ctx, async move {
                    TaskEvent::Enhanced(client.enhance_prompt(&prompt).await)
                });
            }
            TextToImageCommand::GenerateImages {
                token,
                prompt,
                model,
                width,
                height,
            } => {
                let urls: Vec<String> = (0..IMAGES_PER_GENERATION)
                    .map(|_| self.pollinations.image_url(&prompt, &model, width, height))
                    .collect();
                tracing::info!("Generation {} with model {} at {}x{}", token, model, width, height);

                self.textures = vec![None; urls.len()];
                self.downloads.reset(token);
                self.generated_from = prompt;
                self.dispatch_tti(
                    ctx,
                    TextToImageEvent::ImagesReady {
                        token,
                        urls: urls.clone(),
                    },
                );

                for (index, url) in urls.into_iter().enumerate() {
                    let client = self.pollinations.clone();
                    self.tasks.spawn(ctx, async move {
                        TaskEvent::ImageFetched {
                            token,
                            index,
                            result: fetch_and_decode(client, url).await,
                        }
                    });
                }
            }
        }
    }

    fn run_itp_command(&mut self, ctx: &egui::Context, command: ImageToPromptCommand) {
        match command {
            ImageToPromptCommand::Describe { image } => {
                let describer = self.describer.clone();
                let api_key = self.settings.api_key().to_string();
                tracing::info!("Describing {} ({} bytes)", image.file_name(), image.size());
                self.tasks.spawn(ctx, async move {
                    TaskEvent::Described(describer.describe_image(&image, &api_key).await)
                });
            }
            ImageToPromptCommand::OpenSettings => self.open_settings(),
        }
    }

    fn process_task_events(&mut self, ctx: &egui::Context) {
        for event in self.tasks.drain() {
            match event {
                TaskEvent::Enhanced(Ok(text)) => {
                    self.dispatch_tti(ctx, TextToImageEvent::EnhanceSucceeded(text));
                }
                TaskEvent::Enhanced(Err(e)) => {
                    tracing::warn!("Enhancement failed: {}", e);
                    self.dispatch_tti(ctx, TextToImageEvent::EnhanceFailed(e.to_string()));
                }
                TaskEvent::ImageFetched {
                    token,
                    index,
                    result,
                } => {
                    if token != self.tti.generation() {
                        tracing::debug!("Ignoring image {} of stale generation {}", index, token);
                        continue;
                    }
                    match result {
                        Ok(image) => {
                            let texture = ctx.load_texture(
                                format!("generated-{}-{}", token, index),
                                color_image(&image),
                                egui::TextureOptions::LINEAR,
                            );
                            if let Some(slot) = self.textures.get_mut(index) {
                                *slot = Some(texture);
                            }
                            self.dispatch_tti(ctx, TextToImageEvent::ImageLoaded { token, index });
                        }
                        Err(e) => {
                            tracing::warn!("Image {} of generation {} failed: {}", index, token, e);
                            self.dispatch_tti(ctx, TextToImageEvent::ImageFailed { token, index });
                        }
                    }
                }
                TaskEvent::Described(Ok(prompt)) => {
                    self.dispatch_itp(ctx, ImageToPromptEvent::DescribeSucceeded(prompt));
                }
                TaskEvent::Described(Err(e)) => {
                    tracing::warn!("Description failed: {}", e);
                    self.dispatch_itp(ctx, ImageToPromptEvent::DescribeFailed(e.to_string()));
                }
                TaskEvent::ModelsFetched(Ok(models)) => {
                    if models.is_empty() {
                        tracing::warn!("Model catalogue was empty, keeping fallback list");
                    } else {
                        tracing::info!("Loaded {} image models", models.len());
                        self.models = models;
                    }
                }
                TaskEvent::ModelsFetched(Err(e)) => {
                    tracing::warn!("Could not fetch image models: {}", e);
                }
                TaskEvent::Downloaded {
                    token,
                    index,
                    result,
                } => {
                    self.downloads.finish(token, index);
                    match result {
                        Ok(path) => {
                            tracing::info!("Saved image to {}", path.display());
                            self.notice = Some(format!("Saved to {}", path.display()));
                        }
                        Err(e) => {
                            tracing::error!("Download failed: {}", e);
                            self.notice = Some(e.to_string());
                        }
                    }
                }
            }
        }
    }

    pub(super) fn start_download(&mut self, ctx: &egui::Context, index: usize) {
        let Some(image) = self.tti.images.get(index) else {
            return;
        };
        if !self.downloads.start(index) {
            return;
        }

        let client = self.pollinations.clone();
        let url = image.url.clone();
        let prompt = self.generated_from.clone();
        let dir = download_dir();
        let token = self.downloads.token();
        self.tasks.spawn(ctx, async move {
            TaskEvent::Downloaded {
                token,
                index,
                result: download_to(client, url, prompt, dir).await,
            }
        });
    }

    pub(super) fn select_path(&mut self, ctx: &egui::Context, path: &Path) {
        match ImageUpload::from_path(path) {
            Ok(upload) => self.select_upload(ctx, upload),
            Err(e) => {
                tracing::warn!("Rejected {}: {}", path.display(), e);
                self.dispatch_itp(ctx, ImageToPromptEvent::FileRejected(e.to_string()));
            }
        }
    }

    fn select_upload(&mut self, ctx: &egui::Context, upload: ImageUpload) {
        self.dispatch_itp(ctx, ImageToPromptEvent::FileSelected(upload.clone()));
        if self.itp.image.as_ref() != Some(&upload) {
            return;
        }

        self.copied_at = None;
        self.preview_texture = match ImageProcessor::decode_rgba(upload.bytes()) {
            Ok(image) => Some(ctx.load_texture(
                "upload-preview",
                color_image(&image),
                egui::TextureOptions::LINEAR,
            )),
            Err(e) => {
                tracing::warn!("No preview for {}: {}", upload.file_name(), e);
                None
            }
        };
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if self.active_tab != Tab::ImageToPrompt {
            return;
        }

        if let Some(path) = &file.path {
            self.select_path(ctx, path);
        } else if let Some(bytes) = &file.bytes {
            match ImageUpload::from_bytes(file.name.clone(), bytes.to_vec()) {
                Ok(upload) => self.select_upload(ctx, upload),
                Err(e) => self.dispatch_itp(ctx, ImageToPromptEvent::FileRejected(e.to_string())),
            }
        }
    }

    pub(super) fn copy_prompt(&mut self, ctx: &egui::Context) {
        let text = self.itp.generated_prompt.clone();
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => {
                self.copied_at = Some(Instant::now());
                ctx.request_repaint_after(COPIED_FEEDBACK);
            }
            Err(e) => {
                tracing::warn!("Clipboard write failed: {}", e);
                self.dispatch_itp(ctx, ImageToPromptEvent::ClipboardFailed);
            }
        }
    }

    pub(super) fn recently_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_FEEDBACK)
    }

    pub(super) fn open_settings(&mut self) {
        self.api_key_draft = self.settings.settings().api_key.clone();
        self.show_settings = true;
    }

    pub(super) fn select_theme(&mut self, ctx: &egui::Context, theme: Theme) {
        self.theme = theme;
        apply_theme(ctx, &theme);
        if let Err(e) = self.settings.set_theme(&theme) {
            tracing::error!("Failed to save theme: {}", e);
            self.notice = Some(format!("Could not save settings: {}", e));
        }
    }

    pub(super) fn save_api_key(&mut self) {
        let key = self.api_key_draft.trim().to_string();
        if let Err(e) = self.settings.set_api_key(key) {
            tracing::error!("Failed to save API key: {}", e);
            self.notice = Some(format!("Could not save settings: {}", e));
        }
        self.show_settings = false;
    }

    fn header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("Arafat Imagen").strong());
                ui.add_space(16.0);

                for tab in [Tab::TextToImage, Tab::ImageToPrompt] {
                    if ui
                        .selectable_label(self.active_tab == tab, tab.title())
                        .clicked()
                    {
                        self.active_tab = tab;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.open_settings();
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn footer(&mut self, ctx: &egui::Context) {
        let mut dismissed = false;
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.notice {
                Some(notice) => {
                    ui.label(egui::RichText::new(notice).small());
                    dismissed = ui.small_button("✕").clicked();
                }
                None => {
                    ui.label(
                        egui::RichText::new("Powered by Pollinations and Gemini")
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                }
            });
        });
        if dismissed {
            self.notice = None;
        }
    }
}

impl eframe::App for ImagenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_task_events(ctx);
        self.handle_dropped_files(ctx);

        self.header(ctx);
        self.footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.active_tab {
                    Tab::TextToImage => self.text_to_image_panel(ui),
                    Tab::ImageToPrompt => self.image_to_prompt_panel(ui),
                });
        });

        if self.show_settings {
            self.settings_window(ctx);
        }
    }
}
