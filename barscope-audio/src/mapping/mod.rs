//! Maps the FFT bins onto log-spaced bars.
mod config;

use std::ops::Range;

pub use config::MappingConfig;
use tracing::debug;

use crate::Error;

/// The weight of the last bar. The first bar always has the weight `1`.
///
/// Typical music has way less energy in the high frequencies than in the low ones so
/// the bars on the right are lifted up to be comparable with the bars on the left.
const MAX_WEIGHT_EXPONENT: f32 = 1.;

/// Everything a bar needs to know about its place in the spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The frequency (in Hz) in the middle of the frequency range of the bar.
    pub center_freq: f32,

    /// The indices of the FFT output which contribute to this bar.
    /// It's never empty.
    pub bin_range: Range<usize>,

    /// The factor which the averaged magnitude of the bar gets multiplied with.
    pub weight: f32,
}

/// The precomputed relation between the FFT output and the bars.
///
/// A table is never modified. If anything of its [MappingConfig] changes, create a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingTable {
    bars: Box<[Bar]>,
    config: MappingConfig,
}

impl MappingTable {
    /// Computes the table for the given config.
    ///
    /// # Example
    /// ```
    /// use barscope_audio::{MappingConfig, MappingTable};
    /// use std::num::NonZeroUsize;
    ///
    /// let table = MappingTable::new(MappingConfig {
    ///     amount_bars: NonZeroUsize::new(10).unwrap(),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(table.len(), 10);
    /// ```
    pub fn new(config: MappingConfig) -> Result<Self, Error> {
        config.validate()?;

        let amount_bars = usize::from(config.amount_bars);
        let freq_resolution = config.sample_rate.0 as f32 / config.block_size as f32;
        debug!("Freq resolution: {}", freq_resolution);

        // interpolated in log space, `end / start` overflows for tiny lower bounds
        let edges = {
            let Range { start, end } = config.freq_range;
            let (log_start, log_end) = (start.ln(), end.ln());

            (0..=amount_bars)
                .map(|k| match k {
                    0 => start,
                    k if k == amount_bars => end,
                    k => (log_start + (log_end - log_start) * k as f32 / amount_bars as f32).exp(),
                })
                .collect::<Vec<f32>>()
        };
        debug!("Edges: {:?}", edges);

        let bars = edges
            .windows(2)
            .enumerate()
            .map(|(i, edge)| {
                let (low, high) = (edge[0], edge[1]);

                let start = (low / freq_resolution).floor() as usize;
                let mut end = (high / freq_resolution).floor() as usize;
                if end <= start {
                    end = start.saturating_add(1);
                }

                Bar {
                    center_freq: (low + high) / 2.,
                    bin_range: start..end,
                    weight: weight(i, amount_bars),
                }
            })
            .collect::<Box<[Bar]>>();
        debug!(
            "Bin ranges: {:?}",
            bars.iter().map(|bar| &bar.bin_range).collect::<Vec<_>>()
        );

        Ok(Self { bars, config })
    }

    /// Returns the bars ordered from the lowest to the highest frequency.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Returns the amount of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// A table has at least one bar, so this is always `false`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the amount of samples which the table expects per block.
    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Returns the amount of values which the FFT of a block produces.
    pub fn spectrum_len(&self) -> usize {
        self.config.block_size / 2 + 1
    }

    /// Returns the distance (in Hz) between two neighbouring FFT bins.
    pub fn freq_resolution(&self) -> f32 {
        self.config.sample_rate.0 as f32 / self.config.block_size as f32
    }

    /// Returns the config which the table got computed with.
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Returns the index of the bar whose center frequency is the closest one to `freq`.
    ///
    /// Useful to place labels of an axis below the bars.
    pub fn closest_bar(&self, freq: f32) -> usize {
        self.bars
            .iter()
            .map(|bar| (bar.center_freq - freq).abs())
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}

/// `10^(x)` with `x` going linearly from `0` (first bar) to [MAX_WEIGHT_EXPONENT] (last bar).
fn weight(bar_idx: usize, amount_bars: usize) -> f32 {
    if amount_bars < 2 {
        return 1.;
    }

    let x = bar_idx as f32 / (amount_bars - 1) as f32;
    10f32.powf(x * MAX_WEIGHT_EXPONENT)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use cpal::SampleRate;

    use super::*;

    fn table(
        sample_rate: u32,
        block_size: usize,
        amount_bars: usize,
        range: Range<f32>,
    ) -> MappingTable {
        MappingTable::new(MappingConfig {
            sample_rate: SampleRate(sample_rate),
            block_size,
            amount_bars: NonZeroUsize::new(amount_bars).unwrap(),
            freq_range: range,
        })
        .unwrap()
    }

    #[test]
    fn bar_invariants() {
        let configs = [
            (44_100, 2048, 64, 40. ..16_000.),
            (44_100, 2048, 232, 40. ..16_000.),
            (48_000, 1024, 30, 50. ..10_000.),
            (8_000, 256, 100, 20. ..4_000.),
            (96_000, 4096, 1, 20. ..20_000.),
            (44_100, 2, 5, 10. ..22_050.),
        ];

        for (sample_rate, block_size, amount_bars, range) in configs {
            let table = table(sample_rate, block_size, amount_bars, range);
            assert_eq!(table.len(), amount_bars);

            for bar in table.bars() {
                assert!(bar.bin_range.start < bar.bin_range.end, "{:?}", bar);
            }

            for pair in table.bars().windows(2) {
                assert!(pair[0].center_freq <= pair[1].center_freq);
                assert!(pair[0].bin_range.start <= pair[1].bin_range.start);
                assert!(pair[0].bin_range.end <= pair[1].bin_range.end);
                assert!(pair[0].weight <= pair[1].weight);
            }
        }
    }

    #[test]
    fn center_is_arithmetic_mean_of_edges() {
        let table = table(44_100, 2048, 2, 100. ..10_000.);

        // edges: 100Hz, 1_000Hz, 10_000Hz
        assert!((table.bars()[0].center_freq - 550.).abs() < 0.1);
        assert!((table.bars()[1].center_freq - 5_500.).abs() < 1.);
    }

    #[test]
    fn bin_indices_are_floored() {
        let table = table(44_100, 2048, 2, 100. ..10_000.);
        let freq_res = table.freq_resolution();

        assert_eq!(table.bars()[0].bin_range.start, (100. / freq_res) as usize);
        assert_eq!(table.bars()[1].bin_range.end, (10_000. / freq_res) as usize);
    }

    #[test]
    fn narrow_bars_read_at_least_one_bin() {
        // ~21.5Hz per bin but the lowest bars are only a few Hz wide
        let table = table(44_100, 2048, 232, 40. ..16_000.);

        let first = &table.bars()[0];
        assert_eq!(first.bin_range, 1..2);
    }

    #[test]
    fn weights_span_one_to_ten() {
        let table = table(44_100, 2048, 64, 40. ..16_000.);

        let first = table.bars().first().unwrap().weight;
        let last = table.bars().last().unwrap().weight;

        assert_eq!(first, 1.);
        assert!((last - 10.).abs() < 1e-4);
    }

    #[test]
    fn tiny_lower_bound() {
        let table = table(44_100, 2048, 4, 1e-38..16_000.);
        let last_bin = (16_000. / table.freq_resolution()) as usize;

        for bar in table.bars() {
            assert!(bar.bin_range.start < bar.bin_range.end, "{:?}", bar);
            assert!(bar.bin_range.end <= last_bin.max(1), "{:?}", bar);
            assert!(bar.center_freq.is_finite(), "{:?}", bar);
        }
        assert_eq!(table.bars()[0].bin_range, 0..1);
        assert_eq!(table.bars()[3].bin_range.end, last_bin);
    }

    #[test]
    fn single_bar_has_unit_weight() {
        let table = table(44_100, 2048, 1, 40. ..16_000.);

        assert_eq!(table.bars()[0].weight, 1.);
    }

    #[test]
    fn deterministic() {
        let a = table(44_100, 2048, 64, 40. ..16_000.);
        let b = table(44_100, 2048, 64, 40. ..16_000.);

        assert_eq!(a, b);
    }

    #[test]
    fn invalid_config() {
        let result = MappingTable::new(MappingConfig {
            freq_range: 0. ..16_000.,
            ..Default::default()
        });

        assert_eq!(
            result,
            Err(Error::Config(crate::ConfigError::NonPositiveMinFreq(0.)))
        );
    }

    #[test]
    fn closest_bar() {
        let table = table(44_100, 2048, 64, 40. ..16_000.);

        assert_eq!(table.closest_bar(0.), 0);
        assert_eq!(table.closest_bar(40.), 0);
        assert_eq!(table.closest_bar(100_000.), 63);

        let idx = table.closest_bar(1_000.);
        let bar = &table.bars()[idx];
        for other in table.bars() {
            assert!((bar.center_freq - 1_000.).abs() <= (other.center_freq - 1_000.).abs());
        }
    }
}
