//! Live audio capture feeding the analyser.
//!
//! Captures PCM from the system's input device into a bounded rolling buffer.
//! Unlike a recorder the capture never accumulates a full session; it keeps
//! only the most recent few seconds, enough for any analysis window.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Rolling buffer bound in seconds of audio.
const BUFFER_SECONDS: u32 = 4;

/// Captures live audio from a specified or default input device.
///
/// Multi-channel input is mixed down to mono by averaging channels. Samples
/// older than the rolling bound are dropped from the front of the buffer.
pub struct AudioCapture {
    /// Actual capture sample rate from the device
    sample_rate: u32,
    /// Most recent audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive while capturing)
    stream: Option<cpal::Stream>,
    /// Whether capture is currently paused
    is_paused: Arc<Mutex<bool>>,
    /// Device name or "default" to use the system default device
    device_name: String,
}

impl AudioCapture {
    /// Creates a capture bound to the named device.
    ///
    /// Use "default" for the system default input device; a numeric string
    /// selects a device by index.
    pub fn new(device_name: String) -> Self {
        Self {
            sample_rate: 0,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            is_paused: Arc::new(Mutex::new(false)),
            device_name,
        }
    }

    /// Opens the input device and starts streaming into the rolling buffer.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn start(&mut self) -> Result<()> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        self.sample_rate = device_sample_rate;
        let max_samples = (device_sample_rate * BUFFER_SECONDS) as usize;

        let samples_arc = Arc::clone(&self.samples);
        let pause_arc = Arc::clone(&self.is_paused);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let is_paused = *pause_arc.lock().unwrap();
                if !is_paused {
                    Self::handle_audio_callback(data, &samples_arc, num_channels, max_samples);
                }
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Handles incoming audio data from the audio callback.
    ///
    /// Mixes multi-channel audio down to mono by averaging all channels,
    /// then trims the buffer front to the rolling bound.
    fn handle_audio_callback(
        data: &[i16],
        samples_arc: &Arc<Mutex<Vec<i16>>>,
        num_channels: usize,
        max_samples: usize,
    ) {
        let mut samples = samples_arc.lock().unwrap();

        match num_channels {
            1 => {
                samples.extend_from_slice(data);
            }
            2 => {
                for chunk in data.chunks_exact(2) {
                    let left = chunk[0] as i32;
                    let right = chunk[1] as i32;
                    samples.push(((left + right) / 2) as i16);
                }
            }
            _ => {
                for chunk in data.chunks_exact(num_channels) {
                    let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                    samples.push((sum / num_channels as i32) as i16);
                }
            }
        }

        let excess = samples.len().saturating_sub(max_samples);
        if excess > 0 {
            samples.drain(..excess);
        }
    }

    /// Returns up to `count` of the most recent mono samples.
    pub fn latest(&self, count: usize) -> Vec<i16> {
        let samples = self.samples.lock().unwrap();
        let start = samples.len().saturating_sub(count);
        samples[start..].to_vec()
    }

    /// Returns the actual sample rate of the capture, 0 before `start`.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns whether capture is currently paused.
    pub fn is_paused(&self) -> bool {
        *self.is_paused.lock().unwrap()
    }

    /// Toggles between paused and capturing states.
    pub fn toggle_pause(&self) {
        let mut paused = self.is_paused.lock().unwrap();
        *paused = !*paused;
        if *paused {
            tracing::debug!("Capture paused");
        } else {
            tracing::debug!("Capture resumed");
        }
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let mut devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.swap_remove(index));
        }
        return Err(anyhow!(
            "Device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'specfall list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(samples_arc: &Arc<Mutex<Vec<i16>>>, data: &[i16], channels: usize, max: usize) {
        AudioCapture::handle_audio_callback(data, samples_arc, channels, max);
    }

    #[test]
    fn test_mono_passthrough() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        feed(&samples, &[1, 2, 3], 1, 100);
        assert_eq!(*samples.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_stereo_averages_pairs() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        feed(&samples, &[100, 200, -50, 50], 2, 100);
        assert_eq!(*samples.lock().unwrap(), vec![150, 0]);
    }

    #[test]
    fn test_multichannel_averages_all() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        feed(&samples, &[30, 60, 90], 3, 100);
        assert_eq!(*samples.lock().unwrap(), vec![60]);
    }

    #[test]
    fn test_rolling_buffer_drops_oldest() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        feed(&samples, &[1, 2, 3, 4], 1, 4);
        feed(&samples, &[5, 6], 1, 4);
        assert_eq!(*samples.lock().unwrap(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_latest_returns_tail() {
        let capture = AudioCapture::new("default".to_string());
        feed(&capture.samples, &[1, 2, 3, 4, 5], 1, 100);
        assert_eq!(capture.latest(2), vec![4, 5]);
        assert_eq!(capture.latest(10), vec![1, 2, 3, 4, 5]);
    }
}
