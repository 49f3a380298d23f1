//! Byte-domain signal analysis over captured PCM.
//!
//! Produces the two sample streams the views consume: time-domain amplitude
//! bytes and FFT frequency bytes, both in the unsigned `0..=255` range.

use rustfft::{num_complex::Complex, FftPlanner};

/// Floor of the dB window mapped to byte 0.
const MIN_DECIBELS: f32 = -100.0;
/// Ceiling of the dB window mapped to byte 255.
const MAX_DECIBELS: f32 = -30.0;

/// Stateful analyser producing byte-quantized time and frequency data.
///
/// The FFT size is twice the number of output frequency points, so each call
/// to [`Analyser::byte_frequency_data`] yields exactly `points` usable bins.
/// Frequency magnitudes are smoothed over time with an exponential moving
/// average before dB conversion, which steadies the waterfall between ticks.
pub struct Analyser {
    fft_size: usize,
    points: usize,
    smoothing: f32,
    fft_planner: FftPlanner<f32>,
    fft_buffer: Vec<Complex<f32>>,
    prev_magnitudes: Vec<f32>,
}

impl Analyser {
    /// Creates an analyser emitting `points` frequency bins per tick.
    ///
    /// `smoothing` is the weight of the previous tick's magnitudes, in
    /// `[0, 1)`. Zero disables smoothing entirely.
    pub fn new(points: usize, smoothing: f32) -> Self {
        Self {
            fft_size: points * 2,
            points,
            smoothing: smoothing.clamp(0.0, 1.0),
            fft_planner: FftPlanner::new(),
            fft_buffer: vec![Complex::new(0.0, 0.0); points * 2],
            prev_magnitudes: vec![0.0; points],
        }
    }

    /// Quantizes the most recent samples into unsigned amplitude bytes.
    ///
    /// Takes the last `out.len()` samples; silence maps to the 128 midpoint.
    /// If fewer samples are available the leading bytes stay at 128.
    pub fn byte_time_domain_data(&self, samples: &[i16], out: &mut [u8]) {
        out.fill(128);

        let count = samples.len().min(out.len());
        let recent = &samples[samples.len() - count..];
        let pad = out.len() - count;

        for (byte, &sample) in out[pad..].iter_mut().zip(recent) {
            let centered = (f32::from(sample) / 32768.0) * 128.0 + 128.0;
            *byte = centered.clamp(0.0, 255.0) as u8;
        }
    }

    /// Computes smoothed frequency magnitudes as unsigned bytes.
    ///
    /// The last `fft_size` samples are Hann-windowed and transformed; linear
    /// magnitudes are blended with the previous tick, converted to dB, and
    /// mapped linearly from the `[-100, -30]` dB window onto `0..=255`.
    /// `out` must hold exactly `points` bytes.
    pub fn byte_frequency_data(&mut self, samples: &[i16], out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.points);

        let count = samples.len().min(self.fft_size);
        let recent = &samples[samples.len() - count..];

        // Hann window against spectral leakage, zero-padded on short input
        for slot in self.fft_buffer.iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }
        for (i, &sample) in recent.iter().enumerate() {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / count as f32;
            let window = 0.5 * (1.0 - phase.cos());
            self.fft_buffer[i] = Complex::new(f32::from(sample) * window / 32768.0, 0.0);
        }

        let fft = self.fft_planner.plan_fft_forward(self.fft_size);
        fft.process(&mut self.fft_buffer);

        let db_span = MAX_DECIBELS - MIN_DECIBELS;
        for (bin, byte) in out.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[bin].norm() / self.fft_size as f32;

            // Smoothing happens on linear magnitudes, before dB conversion
            let smoothed =
                self.smoothing * self.prev_magnitudes[bin] + (1.0 - self.smoothing) * magnitude;
            self.prev_magnitudes[bin] = smoothed;

            let db = if smoothed > 1e-10 {
                20.0 * smoothed.log10()
            } else {
                MIN_DECIBELS
            };

            *byte = (255.0 * (db - MIN_DECIBELS) / db_span).clamp(0.0, 255.0) as u8;
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn points(&self) -> usize {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_domain_centers_silence_at_128() {
        let analyser = Analyser::new(4, 0.0);
        let mut out = [0u8; 8];
        analyser.byte_time_domain_data(&[0i16; 16], &mut out);
        assert!(out.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_time_domain_scales_extremes() {
        let analyser = Analyser::new(4, 0.0);
        let mut out = [0u8; 2];
        analyser.byte_time_domain_data(&[i16::MIN, i16::MAX], &mut out);
        assert_eq!(out[0], 0);
        // i16::MAX is one step short of full scale
        assert_eq!(out[1], 255);
    }

    #[test]
    fn test_time_domain_pads_short_input_with_midpoint() {
        let analyser = Analyser::new(4, 0.0);
        let mut out = [0u8; 4];
        analyser.byte_time_domain_data(&[i16::MAX], &mut out);
        assert_eq!(out[..3], [128, 128, 128]);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn test_silence_maps_to_zero_bytes() {
        let mut analyser = Analyser::new(256, 0.0);
        let mut out = [0u8; 256];
        analyser.byte_frequency_data(&[0i16; 512], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_concentrates_in_one_bin() {
        let mut analyser = Analyser::new(256, 0.0);
        let fft_size = analyser.fft_size();

        // Full-scale tone at exactly bin 32
        let samples: Vec<i16> = (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * 32.0 * i as f32 / fft_size as f32;
                (phase.sin() * 32000.0) as i16
            })
            .collect();

        let mut out = [0u8; 256];
        analyser.byte_frequency_data(&samples, &mut out);

        let peak_bin = out
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_bin, 32);
        assert!(out[32] > 128, "peak byte too low: {}", out[32]);
        // Energy far from the tone stays near the floor
        assert!(out[200] < 32);
    }

    #[test]
    fn test_smoothing_damps_a_sudden_burst() {
        let mut smoothed = Analyser::new(256, 0.9);
        let mut instant = Analyser::new(256, 0.0);
        let fft_size = smoothed.fft_size();

        let burst: Vec<i16> = (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * 32.0 * i as f32 / fft_size as f32;
                (phase.sin() * 32000.0) as i16
            })
            .collect();

        let mut a = [0u8; 256];
        let mut b = [0u8; 256];
        smoothed.byte_frequency_data(&burst, &mut a);
        instant.byte_frequency_data(&burst, &mut b);
        assert!(
            a[32] < b[32],
            "smoothed first tick {} should trail instant {}",
            a[32],
            b[32]
        );
    }

    #[test]
    fn test_fft_size_is_twice_points() {
        let analyser = Analyser::new(256, 0.1);
        assert_eq!(analyser.fft_size(), 512);
        assert_eq!(analyser.points(), 256);
    }
}
