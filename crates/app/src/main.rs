use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use imagen_core::{Imagen, LaunchOptions, Tab, config::Config, init};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "imagen")]
#[command(author, version, about = "Generate images from text and prompts from images")]
struct Args {
    /// Override the Gemini vision model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Tab to show on startup
    #[arg(long, value_enum, default_value_t = StartTab::TextToImage)]
    tab: StartTab,

    /// Use this settings file instead of the per-user one
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Open the settings dialog on startup
    #[arg(long)]
    configure: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StartTab {
    TextToImage,
    ImageToPrompt,
}

impl From<StartTab> for Tab {
    fn from(tab: StartTab) -> Self {
        match tab {
            StartTab::TextToImage => Tab::TextToImage,
            StartTab::ImageToPrompt => Tab::ImageToPrompt,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagen=info,imagen_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    init();
    let args = Args::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.gemini_model = model;
    }

    info!("Starting imagen {}", env!("CARGO_PKG_VERSION"));

    let options = LaunchOptions {
        initial_tab: args.tab.into(),
        settings_path: args.settings,
        open_settings: args.configure,
    };

    Imagen::with_config(config)
        .run(options)
        .context("Imagen window exited with an error")?;

    Ok(())
}
