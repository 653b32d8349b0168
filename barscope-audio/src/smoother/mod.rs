//! Turns the jumpy raw bar values into bars which are pleasant to look at.
mod config;

pub use config::SmootherConfig;
use tracing::debug;

use crate::Error;

/// Holds the displayed height of each bar.
///
/// Bars rise exponentially towards a higher value and fall linearly by
/// [SmootherConfig::decay_rate] per call, so they always "drop" with the same speed.
#[derive(Debug, Clone)]
pub struct BarSmoother {
    levels: Box<[f32]>,
    config: SmootherConfig,
}

impl BarSmoother {
    /// Creates a smoother for `amount_bars` bars which all start at `0`.
    pub fn new(amount_bars: usize, config: SmootherConfig) -> Result<Self, Error> {
        config.validate()?;
        debug!("Smoother config: {:?}", config);

        Ok(Self {
            levels: vec![0.; amount_bars].into_boxed_slice(),
            config,
        })
    }

    /// Moves each bar one step towards its new raw value and returns the heights of all bars.
    ///
    /// Each returned value is within `[0, max_display]`.
    /// Returns [Error::BarCountMismatch] if `raw` doesn't contain exactly one value per bar.
    ///
    /// # Example
    /// ```
    /// use barscope_audio::{BarSmoother, SmootherConfig};
    ///
    /// let mut smoother = BarSmoother::new(2, SmootherConfig {
    ///     max_display: 100.,
    ///     gain: 1.,
    ///     decay_rate: 10.,
    ///     smoothing: 0.5,
    /// })
    /// .unwrap();
    ///
    /// // bars rise half way up...
    /// assert_eq!(smoother.advance(&[40., 1_000.], 1.).unwrap(), &[20., 50.]);
    /// // ... and fall with a constant speed
    /// assert_eq!(smoother.advance(&[0., 0.], 1.).unwrap(), &[10., 40.]);
    /// ```
    pub fn advance(&mut self, raw: &[f32], sensitivity: f32) -> Result<&[f32], Error> {
        if raw.len() != self.levels.len() {
            return Err(Error::BarCountMismatch {
                expected: self.levels.len(),
                actual: raw.len(),
            });
        }

        let SmootherConfig {
            max_display,
            gain,
            decay_rate,
            smoothing,
        } = self.config;

        for (level, &raw_val) in self.levels.iter_mut().zip(raw) {
            let target = (raw_val * gain * sensitivity).clamp(0., max_display);

            if target > *level {
                *level = (*level * smoothing + target * (1. - smoothing)).min(target);
            } else {
                *level = (*level - decay_rate).max(0.);
            }

            debug_assert!(!level.is_nan());
        }

        Ok(&self.levels)
    }

    /// Lets every bar drop down to `0` immediately.
    pub fn reset(&mut self) {
        self.levels.fill(0.);
    }

    /// Returns the current height of each bar.
    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Returns its config.
    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }
}
