/// All errors which the analysis pipeline can return.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// One of the given configs is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The given sample block doesn't have the length the pipeline was configured for.
    #[error("Expected a block of {expected} samples but got {actual} samples")]
    BlockSizeMismatch { expected: usize, actual: usize },

    /// The given raw bar values don't match the amount of bars of the smoother.
    #[error("Expected {expected} bar values but got {actual}")]
    BarCountMismatch { expected: usize, actual: usize },

    /// [VisualizationEngine::process] got called before the engine got configured successfully.
    ///
    /// [VisualizationEngine::process]: crate::VisualizationEngine::process
    #[error("The engine hasn't been configured yet")]
    NotConfigured,
}

/// All validation errors of [MappingConfig] and [SmootherConfig].
///
/// [MappingConfig]: crate::MappingConfig
/// [SmootherConfig]: crate::SmootherConfig
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("The sample rate must be greater than 0")]
    ZeroSampleRate,

    #[error("The block size must be at least 2 but you gave {0}")]
    BlockSizeTooSmall(usize),

    #[error("The lowest frequency must be greater than 0Hz but you gave {0}Hz")]
    NonPositiveMinFreq(f32),

    #[error("Frequency range can't be empty but you gave: {start}Hz..{end}Hz")]
    EmptyFreqRange { start: f32, end: f32 },

    /// The highest frequency can't be represented with the given sample rate.
    /// See: <https://en.wikipedia.org/wiki/Nyquist_frequency>
    #[error("The highest frequency ({max_freq}Hz) is above the nyquist frequency ({nyquist}Hz)")]
    MaxFreqAboveNyquist { max_freq: f32, nyquist: f32 },

    #[error("The smoothing factor must be within (0, 1) but you gave {0}")]
    InvalidSmoothing(f32),

    #[error("The decay rate can't be negative but you gave {0}")]
    NegativeDecayRate(f32),

    #[error("The gain can't be negative but you gave {0}")]
    NegativeGain(f32),

    #[error("The maximal display value must be greater than 0 but you gave {0}")]
    NonPositiveMaxDisplay(f32),
}
