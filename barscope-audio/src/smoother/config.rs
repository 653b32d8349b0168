use crate::ConfigError;

/// The config options for [crate::BarSmoother].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmootherConfig {
    /// The highest value a bar can reach. Usually the height of the area the bars are drawn in.
    pub max_display: f32,

    /// The factor which scales the raw bar values into the display range before the
    /// sensitivity gets applied.
    pub gain: f32,

    /// The amount a bar falls per call of [crate::BarSmoother::advance] if it isn't pushed up.
    pub decay_rate: f32,

    /// Control how fast the bars rise to their new height.
    /// It has to be within the range `(0, 1)`.
    ///
    /// A new height is reached by `level * smoothing + target * (1 - smoothing)`, so the smaller
    /// the value, the faster (and jumpier) the bars rise.
    pub smoothing: f32,
}

impl SmootherConfig {
    /// Checks if the current config is valid or contains any mistakes.
    ///
    /// See [`ConfigError`] to see all possible errors.
    ///
    /// # Example
    /// ```rust
    /// use barscope_audio::{ConfigError, SmootherConfig};
    ///
    /// let config = SmootherConfig {
    ///     smoothing: 1.,
    ///     ..Default::default()
    /// };
    ///
    /// assert_eq!(config.validate(), Err(ConfigError::InvalidSmoothing(1.)));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_display > 0.) {
            return Err(ConfigError::NonPositiveMaxDisplay(self.max_display));
        }

        if !(self.gain >= 0.) {
            return Err(ConfigError::NegativeGain(self.gain));
        }

        if !(self.decay_rate >= 0.) {
            return Err(ConfigError::NegativeDecayRate(self.decay_rate));
        }

        if !(0. < self.smoothing && self.smoothing < 1.) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }

        Ok(())
    }
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            max_display: 460.,
            gain: 300.,
            decay_rate: 12.,
            smoothing: 0.4,
        }
    }
}
