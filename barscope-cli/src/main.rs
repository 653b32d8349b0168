mod axis;
mod source;
mod visualizer;

use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use barscope_audio::{
    SmootherConfig, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_FREQUENCY, DEFAULT_MIN_FREQUENCY,
};
use clap::Parser;
use crossterm::event;
use ratatui::{style::Color, DefaultTerminal};
use source::SourceMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use visualizer::Visualizer;

const FPS: u64 = 60;

#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Ctx {
    /// The bar width
    #[arg(short, long, default_value_t = 1)]
    bar_width: u16,

    /// The bar color. For a full list of possible colors: https://docs.rs/ratatui/latest/ratatui/style/enum.Color.html
    #[arg(short, long, default_value_t = Color::LightBlue)]
    color: Color,

    /// The audio source to start with. Press `Tab` to switch between them.
    #[arg(short, long, value_enum, default_value_t = SourceMode::Microphone)]
    source: SourceMode,

    /// The amount of samples which are analysed at once
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// The lowest frequency (in Hz) of the bars
    #[arg(long, default_value_t = DEFAULT_MIN_FREQUENCY)]
    min_freq: f32,

    /// The highest frequency (in Hz) of the bars
    #[arg(long, default_value_t = DEFAULT_MAX_FREQUENCY)]
    max_freq: f32,

    /// How much the raw bar values get amplified
    #[arg(long, default_value_t = SmootherConfig::default().gain)]
    gain: f32,

    /// The file where the logs are written to. Set `RUST_LOG` to control the log level.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

pub enum Action {
    None,
    Quit,
}

fn main() -> anyhow::Result<()> {
    let ctx = Ctx::parse();

    let log_file = ctx
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("barscope-cli.log"));
    init_logger(&log_file)?;

    let mut visualizer = Visualizer::new(&ctx)?;

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut visualizer);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, visualizer: &mut Visualizer) -> anyhow::Result<()> {
    loop {
        visualizer.update();

        terminal
            .draw(|frame| visualizer.draw(frame))
            .context("Render frame")?;

        if event::poll(Duration::from_millis(1000 / FPS))? {
            if let Action::Quit = visualizer.handle_event(event::read()?) {
                break;
            }
        }
    }

    Ok(())
}

fn init_logger(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Couldn't create the log file {}", path.display()))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(file)
        .without_time();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::from_env(EnvFilter::DEFAULT_ENV))
        .init();

    Ok(())
}
