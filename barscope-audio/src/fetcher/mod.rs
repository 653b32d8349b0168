//! Each struct here can be used to fetch the audio data from various sources.
//! Pick the one you need to fetch from.
mod dummy;
mod system_audio;

use cpal::SampleRate;
pub use dummy::DummyFetcher;
pub use system_audio::{SystemAudio as SystemAudioFetcher, SystemAudioError};

/// Interface for all structs (fetchers) which are listed in the [fetcher module](crate::fetcher).
pub trait Fetcher {
    /// Moves the content of `buf` to the left by the amount of new (mono) samples and appends
    /// the new samples at the end.
    ///
    /// So `buf` always contains the latest `buf.len()` samples in chronological order.
    /// If no new samples arrived, `buf` stays untouched.
    fn fetch_samples(&mut self, buf: &mut [f32]);

    /// Returns the sample rate of the samples which are written into the buffer.
    fn sample_rate(&self) -> SampleRate;
}

/// Slides `newest` into the end of `buf`.
fn push_newest(buf: &mut [f32], newest: &[f32]) {
    let newest = &newest[newest.len().saturating_sub(buf.len())..];
    let amount = newest.len();

    buf.copy_within(amount.., 0);
    let buf_len = buf.len();
    buf[buf_len - amount..].copy_from_slice(newest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_less_than_buffer() {
        let mut buf = [1., 2., 3., 4.];
        push_newest(&mut buf, &[5., 6.]);

        assert_eq!(buf, [3., 4., 5., 6.]);
    }

    #[test]
    fn push_more_than_buffer() {
        let mut buf = [1., 2., 3.];
        push_newest(&mut buf, &[4., 5., 6., 7., 8.]);

        assert_eq!(buf, [6., 7., 8.]);
    }

    #[test]
    fn push_nothing() {
        let mut buf = [1., 2., 3.];
        push_newest(&mut buf, &[]);

        assert_eq!(buf, [1., 2., 3.]);
    }
}
