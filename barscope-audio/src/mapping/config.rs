use std::{num::NonZeroUsize, ops::Range};

use cpal::SampleRate;

use crate::{
    ConfigError, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_FREQUENCY, DEFAULT_MIN_FREQUENCY,
    DEFAULT_SAMPLE_RATE,
};

/// The config options for [crate::MappingTable].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingConfig {
    /// The sample rate of the samples which are going to be analysed.
    #[cfg_attr(feature = "serde", serde(with = "sample_rate"))]
    pub sample_rate: SampleRate,

    /// The amount of samples which are analysed at once.
    ///
    /// The bigger the block, the finer the frequency resolution (`sample_rate / block_size`)
    /// but the longer it takes until a new sound shows up in the bars.
    pub block_size: usize,

    /// Set the amount of bars which should be created.
    pub amount_bars: NonZeroUsize,

    /// Set the frequency range (in Hz) which the bars should cover.
    ///
    /// # Example
    /// ```rust
    /// use barscope_audio::MappingConfig;
    ///
    /// let config = MappingConfig {
    ///     // only listen to the frequencies starting from 100Hz up to 15_000Hz.
    ///     freq_range: 100. ..15_000.,
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_ok());
    /// ```
    pub freq_range: Range<f32>,
}

impl MappingConfig {
    /// Checks if the current config is valid or contains any mistakes.
    ///
    /// See [`ConfigError`] to see all possible errors.
    ///
    /// # Example
    /// ```rust
    /// use barscope_audio::{ConfigError, MappingConfig};
    ///
    /// let config = MappingConfig {
    ///     freq_range: 40. ..40.,
    ///     ..Default::default()
    /// };
    ///
    /// // the range isn't allowed to be empty!
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::EmptyFreqRange { start: 40., end: 40. })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate.0 == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        if self.block_size < 2 {
            return Err(ConfigError::BlockSizeTooSmall(self.block_size));
        }

        let Range { start, end } = self.freq_range;
        if !(start > 0.) {
            return Err(ConfigError::NonPositiveMinFreq(start));
        }

        if !(start < end) {
            return Err(ConfigError::EmptyFreqRange { start, end });
        }

        let nyquist = self.nyquist();
        if end > nyquist {
            return Err(ConfigError::MaxFreqAboveNyquist {
                max_freq: end,
                nyquist,
            });
        }

        Ok(())
    }

    /// The highest frequency which can be represented with the sample rate.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate.0 as f32 / 2.
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            amount_bars: NonZeroUsize::new(64).unwrap(),
            freq_range: DEFAULT_MIN_FREQUENCY..DEFAULT_MAX_FREQUENCY,
        }
    }
}

#[cfg(feature = "serde")]
mod sample_rate {
    use cpal::SampleRate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rate: &SampleRate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(rate.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SampleRate, D::Error> {
        u32::deserialize(deserializer).map(SampleRate)
    }
}
