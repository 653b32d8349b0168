//! Runs a sample block through the whole pipeline.
use tracing::{debug, instrument};

use crate::{BarSmoother, Error, MappingConfig, MappingTable, SmootherConfig, SpectralAnalyzer};

struct Pipeline {
    table: MappingTable,
    analyzer: SpectralAnalyzer,
    smoother: BarSmoother,
}

/// The main struct to create the bar heights of sample blocks.
///
/// The engine starts unconfigured, call [VisualizationEngine::reconfigure] once you know the
/// sample rate of your audio source and every time it changes.
pub struct VisualizationEngine {
    smoother_config: SmootherConfig,
    pipeline: Option<Pipeline>,
}

impl VisualizationEngine {
    /// Creates a new, unconfigured engine.
    pub fn new(smoother_config: SmootherConfig) -> Result<Self, Error> {
        smoother_config.validate()?;

        Ok(Self {
            smoother_config,
            pipeline: None,
        })
    }

    /// Rebuilds the mapping table and lets all bars start at `0` again.
    ///
    /// If `config` is invalid the previous configuration stays untouched.
    ///
    /// # Example
    /// ```rust
    /// use barscope_audio::{MappingConfig, SmootherConfig, VisualizationEngine};
    /// use std::num::NonZeroUsize;
    ///
    /// let mut engine = VisualizationEngine::new(SmootherConfig::default()).unwrap();
    ///
    /// engine
    ///     .reconfigure(MappingConfig {
    ///         amount_bars: NonZeroUsize::new(5).unwrap(),
    ///         ..Default::default()
    ///     })
    ///     .unwrap();
    ///
    /// let block = vec![0.; engine.block_size().unwrap()];
    /// assert_eq!(engine.process(&block, 1.).unwrap().len(), 5);
    /// ```
    #[instrument(name = "VisualizationEngine::reconfigure", skip(self))]
    pub fn reconfigure(&mut self, config: MappingConfig) -> Result<(), Error> {
        let table = MappingTable::new(config)?;
        let analyzer = SpectralAnalyzer::new(table.block_size())?;
        let smoother = BarSmoother::new(table.len(), self.smoother_config.clone())?;

        debug!("Reconfigured to {} bars", table.len());
        self.pipeline = Some(Pipeline {
            table,
            analyzer,
            smoother,
        });

        Ok(())
    }

    /// Computes the new bar heights of the given block.
    ///
    /// `samples` must be mono, within `[-1, 1]` and contain exactly [VisualizationEngine::block_size] samples.
    /// `sensitivity` scales the bars up (`> 1`) or down (`< 1`) before they are clamped to the display range.
    ///
    /// Returns [Error::NotConfigured] if [VisualizationEngine::reconfigure] never succeeded.
    /// Callers are expected to draw empty bars in that case.
    pub fn process(&mut self, samples: &[f32], sensitivity: f32) -> Result<&[f32], Error> {
        let Pipeline {
            table,
            analyzer,
            smoother,
        } = self.pipeline.as_mut().ok_or(Error::NotConfigured)?;

        let raw = analyzer.analyze(samples, table)?;
        smoother.advance(raw, sensitivity)
    }

    /// Lets every bar drop down to `0` immediately without touching the mapping.
    pub fn reset(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.smoother.reset();
        }
    }

    /// Returns the current mapping table, if the engine is configured.
    pub fn table(&self) -> Option<&MappingTable> {
        self.pipeline.as_ref().map(|pipeline| &pipeline.table)
    }

    /// Returns the amount of samples [VisualizationEngine::process] expects, if the engine is configured.
    pub fn block_size(&self) -> Option<usize> {
        self.table().map(MappingTable::block_size)
    }

    /// Returns the config of the smoother.
    pub fn smoother_config(&self) -> &SmootherConfig {
        &self.smoother_config
    }
}
