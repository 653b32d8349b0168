use barscope_audio::{
    cpal::StreamError,
    fetcher::{Fetcher, SystemAudioError, SystemAudioFetcher},
};
use tracing::warn;

/// Where the samples come from.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// The default input device.
    #[value(name = "mic")]
    Microphone,

    /// What the default output device is playing.
    System,
}

impl SourceMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Microphone => Self::System,
            Self::System => Self::Microphone,
        }
    }

    /// Microphones are usually way more quiet than the system output.
    pub fn default_sensitivity(self) -> f32 {
        match self {
            Self::Microphone => 2.0,
            Self::System => 0.4,
        }
    }

    pub fn open(self) -> Result<Box<dyn Fetcher>, SystemAudioError> {
        let error_callback = |err: StreamError| warn!("Audio stream error: {}", err);

        let fetcher: Box<dyn Fetcher> = match self {
            Self::Microphone => SystemAudioFetcher::default_input(error_callback)?,
            Self::System => SystemAudioFetcher::default_output(error_callback)?,
        };

        Ok(fetcher)
    }
}

/// The state of the audio source which the status line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub mode: SourceMode,
    system_failed: bool,
}

impl Source {
    pub fn new(mode: SourceMode) -> Self {
        Self {
            mode,
            system_failed: false,
        }
    }

    /// The mode a toggle tries to switch to.
    pub fn next_mode(&self) -> SourceMode {
        self.mode.toggled()
    }

    /// The state after trying to switch to `target`.
    ///
    /// A failed switch keeps the current mode.
    pub fn switched(self, target: SourceMode, succeeded: bool) -> Self {
        if succeeded {
            return Self::new(target);
        }

        Self {
            mode: self.mode,
            system_failed: target == SourceMode::System,
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.mode, self.system_failed) {
            (SourceMode::Microphone, false) => "MIC",
            (SourceMode::Microphone, true) => "MIC (Sys Failed)",
            (SourceMode::System, _) => "SYSTEM",
        }
    }
}

/// The factor the bars are scaled with, adjustable by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity(f32);

impl Sensitivity {
    const STEP: f32 = 0.05;
    const MIN: f32 = 0.05;

    pub fn new(value: f32) -> Self {
        Self(value.max(Self::MIN))
    }

    pub fn increase(&mut self) {
        self.0 += Self::STEP;
    }

    pub fn decrease(&mut self) {
        self.0 = (self.0 - Self::STEP).max(Self::MIN);
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle() {
        assert_eq!(SourceMode::Microphone.toggled(), SourceMode::System);
        assert_eq!(SourceMode::System.toggled(), SourceMode::Microphone);
    }

    #[test]
    fn successful_switch() {
        let source = Source::new(SourceMode::Microphone);
        let source = source.switched(source.next_mode(), true);

        assert_eq!(source.mode, SourceMode::System);
        assert_eq!(source.label(), "SYSTEM");

        let source = source.switched(source.next_mode(), true);
        assert_eq!(source.label(), "MIC");
    }

    #[test]
    fn failed_switch_to_system() {
        let source = Source::new(SourceMode::Microphone);
        let source = source.switched(SourceMode::System, false);

        assert_eq!(source.mode, SourceMode::Microphone);
        assert_eq!(source.label(), "MIC (Sys Failed)");

        // the next toggle tries the system audio again
        assert_eq!(source.next_mode(), SourceMode::System);
        let source = source.switched(SourceMode::System, true);
        assert_eq!(source.label(), "SYSTEM");
    }

    #[test]
    fn failed_switch_to_microphone() {
        let source = Source::new(SourceMode::System);
        let source = source.switched(SourceMode::Microphone, false);

        assert_eq!(source, Source::new(SourceMode::System));
    }

    #[test]
    fn sensitivity_steps() {
        let mut sensitivity = Sensitivity::new(1.);

        sensitivity.increase();
        assert!((sensitivity.value() - 1.05).abs() < 1e-5);

        sensitivity.decrease();
        sensitivity.decrease();
        assert!((sensitivity.value() - 0.95).abs() < 1e-5);
    }

    #[test]
    fn sensitivity_floor() {
        let mut sensitivity = Sensitivity::new(0.1);

        for _ in 0..10 {
            sensitivity.decrease();
        }

        assert_eq!(sensitivity.value(), 0.05);
        assert_eq!(Sensitivity::new(0.).value(), 0.05);
    }
}
