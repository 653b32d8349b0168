//! Computes the raw (unsmoothed) value of each bar of a sample block.
use std::sync::Arc;

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use tracing::debug;

use crate::{ConfigError, Error, MappingTable};

/// Windows a block of samples, computes its magnitude spectrum and reduces it to one value per bar.
///
/// The analyzer only keeps scratch buffers between two calls, the result of [SpectralAnalyzer::analyze]
/// only depends on the given samples and table.
pub struct SpectralAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    hann_window: Box<[f32]>,

    fft_in: Box<[f32]>,
    fft_out: Box<[Complex32]>,
    scratch_buffer: Box<[Complex32]>,

    spectrum: Box<[f32]>,
    bar_values: Vec<f32>,

    block_size: usize,
}

impl SpectralAnalyzer {
    /// Creates an analyzer for blocks with `block_size` samples.
    pub fn new(block_size: usize) -> Result<Self, Error> {
        if block_size < 2 {
            return Err(ConfigError::BlockSizeTooSmall(block_size).into());
        }

        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(block_size);
        debug!("Planned fft of size {}", block_size);

        let hann_window = apodize::hanning_iter(block_size)
            .map(|val| val as f32)
            .collect::<Vec<f32>>()
            .into_boxed_slice();

        let fft_in = fft.make_input_vec().into_boxed_slice();
        let fft_out = fft.make_output_vec().into_boxed_slice();
        let scratch_buffer = fft.make_scratch_vec().into_boxed_slice();
        let spectrum = vec![0.; fft_out.len()].into_boxed_slice();

        Ok(Self {
            fft,
            hann_window,

            fft_in,
            fft_out,
            scratch_buffer,

            spectrum,
            bar_values: Vec::new(),

            block_size,
        })
    }

    /// Returns the value of each bar of `table` for the given samples.
    ///
    /// `samples` must contain exactly [MappingTable::block_size] mono samples within `[-1, 1]`.
    ///
    /// # Example
    /// ```
    /// use barscope_audio::{Error, MappingConfig, MappingTable, SpectralAnalyzer};
    ///
    /// let table = MappingTable::new(MappingConfig::default()).unwrap();
    /// let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();
    ///
    /// let silence = vec![0.; table.block_size()];
    /// assert!(analyzer.analyze(&silence, &table).unwrap().iter().all(|&val| val == 0.));
    ///
    /// assert_eq!(
    ///     analyzer.analyze(&[0.; 10], &table),
    ///     Err(Error::BlockSizeMismatch {
    ///         expected: table.block_size(),
    ///         actual: 10
    ///     })
    /// );
    /// ```
    pub fn analyze(&mut self, samples: &[f32], table: &MappingTable) -> Result<&[f32], Error> {
        if samples.len() != table.block_size() {
            return Err(Error::BlockSizeMismatch {
                expected: table.block_size(),
                actual: samples.len(),
            });
        }

        if self.block_size != table.block_size() {
            return Err(Error::BlockSizeMismatch {
                expected: self.block_size,
                actual: table.block_size(),
            });
        }

        self.compute_spectrum(samples);

        self.bar_values.clear();
        self.bar_values.extend(table.bars().iter().map(|bar| {
            let len = self.spectrum.len();
            let start = bar.bin_range.start;
            let end = bar.bin_range.end.min(len);

            let magnitude = if start >= len {
                0.
            } else if end <= start {
                self.spectrum[start.min(len - 1)]
            } else {
                let bins = &self.spectrum[start..end];
                bins.iter().sum::<f32>() / bins.len() as f32
            };

            magnitude * bar.weight
        }));

        Ok(&self.bar_values)
    }

    /// Returns the magnitude spectrum of the last analysed block.
    ///
    /// It has `block_size / 2 + 1` entries and only contains zeros until the first call of
    /// [SpectralAnalyzer::analyze].
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum
    }

    /// Returns the amount of samples which this analyzer expects per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn compute_spectrum(&mut self, samples: &[f32]) {
        for ((fft_in, &sample), &window) in self
            .fft_in
            .iter_mut()
            .zip(samples)
            .zip(self.hann_window.iter())
        {
            *fft_in = sample * window;
        }

        self.fft
            .process_with_scratch(
                &mut self.fft_in,
                &mut self.fft_out,
                &mut self.scratch_buffer,
            )
            .expect("Buffers are created by the planned fft");

        for (magnitude, out) in self.spectrum.iter_mut().zip(self.fft_out.iter()) {
            *magnitude = out.norm();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{f32::consts::PI, num::NonZeroUsize};

    use cpal::SampleRate;

    use super::*;
    use crate::MappingConfig;

    fn table(amount_bars: usize) -> MappingTable {
        MappingTable::new(MappingConfig {
            sample_rate: SampleRate(44_100),
            block_size: 2048,
            amount_bars: NonZeroUsize::new(amount_bars).unwrap(),
            freq_range: 40. ..16_000.,
        })
        .unwrap()
    }

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2. * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn silence() {
        for amount_bars in [1, 10, 64, 232] {
            let table = table(amount_bars);
            let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();

            let bars = analyzer.analyze(&vec![0.; 2048], &table).unwrap();
            assert_eq!(bars.len(), amount_bars);
            assert!(bars.iter().all(|&val| val == 0.));
        }
    }

    #[test]
    fn spectrum_len() {
        let table = table(64);
        let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();
        analyzer.analyze(&vec![0.; 2048], &table).unwrap();

        assert_eq!(analyzer.spectrum().len(), table.spectrum_len());
        assert_eq!(analyzer.spectrum().len(), 1025);
    }

    #[test]
    fn sine_lands_in_its_bar() {
        let table = table(64);
        let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();

        for bin in [47, 120, 400] {
            let freq = bin as f32 * table.freq_resolution();
            let samples = sine(freq, 44_100., 2048);

            let bars = analyzer.analyze(&samples, &table).unwrap();

            let expected_bar = table
                .bars()
                .iter()
                .position(|bar| bar.bin_range.contains(&bin))
                .unwrap();

            let max = bars.iter().cloned().fold(0f32, f32::max);
            assert!(max > 0.);
            assert!(
                bars[expected_bar] >= 0.9 * max,
                "bin {}: expected bar {} ({}) to be the loudest ({})",
                bin,
                expected_bar,
                bars[expected_bar],
                max
            );
        }
    }

    #[test]
    fn sine_peak_in_spectrum() {
        let table = table(64);
        let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();

        let freq = 100. * table.freq_resolution();
        analyzer
            .analyze(&sine(freq, 44_100., 2048), &table)
            .unwrap();

        let peak = analyzer
            .spectrum()
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
            .unwrap();

        assert_eq!(peak, 100);
    }

    #[test]
    fn output_is_weighted() {
        let table = table(64);
        let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();

        // a constant signal only has energy in the first bins
        let bars = analyzer.analyze(&vec![0.5; 2048], &table).unwrap().to_vec();
        let spectrum = analyzer.spectrum();

        let bar = &table.bars()[0];
        let bins = &spectrum[bar.bin_range.clone()];
        let mean = bins.iter().sum::<f32>() / bins.len() as f32;
        assert!((bars[0] - mean * bar.weight).abs() < 1e-3);
    }

    #[test]
    fn block_size_mismatch() {
        let table = table(64);
        let mut analyzer = SpectralAnalyzer::new(table.block_size()).unwrap();

        assert_eq!(
            analyzer.analyze(&vec![0.; 1024], &table),
            Err(Error::BlockSizeMismatch {
                expected: 2048,
                actual: 1024
            })
        );
    }

    #[test]
    fn analyzer_planned_for_other_block_size() {
        let table = table(64);
        let mut analyzer = SpectralAnalyzer::new(1024).unwrap();

        assert_eq!(
            analyzer.analyze(&vec![0.; 2048], &table),
            Err(Error::BlockSizeMismatch {
                expected: 1024,
                actual: 2048
            })
        );
    }

    #[test]
    fn too_small_block() {
        assert!(matches!(
            SpectralAnalyzer::new(1),
            Err(Error::Config(ConfigError::BlockSizeTooSmall(1)))
        ));
    }
}
