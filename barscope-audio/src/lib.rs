//! # Description
//! A crate which turns blocks of audio samples into bar heights which can be drawn
//! directly by a visualizer.
//!
//! Each block goes through the same pipeline:
//!
//! 1. The [MappingTable] splits the analysed frequency band into log-spaced bars and
//!    remembers which FFT bins belong to which bar.
//! 2. The [SpectralAnalyzer] windows the block, computes its magnitude spectrum and
//!    averages the bins of each bar.
//! 3. The [BarSmoother] lets each bar rise quickly towards its new height and fall
//!    with a constant speed.
//!
//! The [VisualizationEngine] glues these together.
//!
//! ### [cpal]
//!
//! This crate also re-exports [cpal] so there's no need to add [cpal] exclusively
//! to your dependency list.
//!
//! # Example
//!
//! ```
//! use barscope_audio::{
//!     fetcher::{DummyFetcher, Fetcher},
//!     MappingConfig, SmootherConfig, VisualizationEngine,
//! };
//!
//! let mut fetcher = DummyFetcher::new();
//!
//! let mut engine = VisualizationEngine::new(SmootherConfig::default()).unwrap();
//! engine
//!     .reconfigure(MappingConfig {
//!         sample_rate: fetcher.sample_rate(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! let mut block = vec![0.; engine.block_size().unwrap()];
//!
//! loop {
//!     // get the newest samples
//!     fetcher.fetch_samples(&mut block);
//!
//!     // and convert them into bar heights within `[0, max_display]`
//!     let bars = engine.process(&block, 1.0).unwrap();
//!     assert!(bars.iter().all(|&bar| bar == 0.));
//!
//!     break;
//! }
//! ```
pub mod analyzer;
pub mod engine;
pub mod fetcher;
pub mod mapping;
pub mod smoother;

mod error;

pub use analyzer::SpectralAnalyzer;
pub use cpal;
pub use engine::VisualizationEngine;
pub use error::{ConfigError, Error};
pub use mapping::{Bar, MappingConfig, MappingTable};
pub use smoother::{BarSmoother, SmootherConfig};

use cpal::SampleRate;

type Hz = f32;

/// The lowest frequency which the bars cover by default.
pub const DEFAULT_MIN_FREQUENCY: Hz = 40.;

/// The highest frequency which the bars cover by default.
pub const DEFAULT_MAX_FREQUENCY: Hz = 16_000.;

/// The default amount of samples which are analysed at once.
/// At 44.1kHz this gives a resolution of roughly 21.5Hz per bin.
pub const DEFAULT_BLOCK_SIZE: usize = 2048;

/// The default sample rate for a fetcher.
/// Fetchers are allowed to use this for orientation.
pub const DEFAULT_SAMPLE_RATE: SampleRate = SampleRate(44_100);
