// ============================================================================
// SOUND.RS - Notification Sound
// ============================================================================
//
// Two backends:
// - CommandSound: hands an audio file to an external player (sox `play`),
//   detached so the countdown never waits for it.
// - ChimeSound: renders a short decaying sine tone through miniaudio,
//   no external binary or asset needed.
// ============================================================================

use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use miniaudio::{Device, DeviceConfig, DeviceType, Format};
use tracing::debug;

use crate::errors::SoundError;
use crate::shell::{quote_arg, CommandRunner};

pub trait SoundPlayer {
    /// Start playing and return without waiting for the sound to end.
    fn play(&mut self) -> Result<(), SoundError>;

    /// How long the sound lasts, when the backend knows it. A process that
    /// exits right after `play` must wait this long to hear it.
    fn duration_hint(&self) -> Option<Duration> {
        None
    }
}

// ─── External player ───────────────────────────────────────────────────────────

pub struct CommandSound<R: CommandRunner> {
    runner: R,
    play_path: String,
    volume: f32,
    file: PathBuf,
}

impl<R: CommandRunner> CommandSound<R> {
    pub fn new(runner: R, play_path: impl Into<String>, volume: f32, file: PathBuf) -> Self {
        Self {
            runner,
            play_path: play_path.into(),
            volume,
            file,
        }
    }

    fn command_line(&self) -> String {
        format!(
            "{} -q -v {} {}",
            quote_arg(&self.play_path),
            self.volume,
            quote_arg(&self.file.to_string_lossy())
        )
    }
}

impl<R: CommandRunner> SoundPlayer for CommandSound<R> {
    fn play(&mut self) -> Result<(), SoundError> {
        self.runner.spawn_detached(&self.command_line())?;
        debug!(event = "sound.command_started", file = %self.file.display());
        Ok(())
    }
}

// ─── Built-in chime ────────────────────────────────────────────────────────────

const CHIME_SAMPLE_RATE: u32 = 48000;

struct ChimeVoice {
    frame: u64,
    total_frames: u64,
    frequency: f32,
    volume: f32,
}

impl ChimeVoice {
    fn next_sample(&mut self) -> f32 {
        if self.frame >= self.total_frames {
            return 0.0;
        }
        let t = self.frame as f32 / CHIME_SAMPLE_RATE as f32;
        let progress = self.frame as f32 / self.total_frames as f32;
        let envelope = (1.0 - progress) * (1.0 - progress);
        self.frame += 1;
        (TAU * self.frequency * t).sin() * envelope * self.volume
    }
}

pub struct ChimeSound {
    voice: Arc<Mutex<ChimeVoice>>,
    device: Option<Device>,
    duration: Duration,
}

impl ChimeSound {
    pub fn new(frequency: f32, duration: Duration, volume: f32) -> Self {
        let total_frames = (duration.as_secs_f64() * CHIME_SAMPLE_RATE as f64) as u64;
        Self {
            voice: Arc::new(Mutex::new(ChimeVoice {
                // Silent until the first play()
                frame: total_frames,
                total_frames,
                frequency,
                volume: volume.clamp(0.0, 1.0),
            })),
            device: None,
            duration,
        }
    }

    fn init_device(&mut self) -> Result<(), SoundError> {
        let voice = Arc::clone(&self.voice);

        let mut config = DeviceConfig::new(DeviceType::Playback);
        config.playback_mut().set_format(Format::F32);
        config.playback_mut().set_channels(1);
        config.set_sample_rate(CHIME_SAMPLE_RATE);

        config.set_data_callback(move |_device, output, _input| {
            let frames = output.as_samples_mut::<f32>();
            match voice.lock() {
                Ok(mut voice) => {
                    for sample in frames {
                        *sample = voice.next_sample();
                    }
                }
                Err(_) => {
                    for sample in frames {
                        *sample = 0.0;
                    }
                }
            }
        });

        let device = Device::new(None, &config).map_err(|e| SoundError::Device {
            message: format!("Failed to create audio device: {:?}", e),
        })?;

        device.start().map_err(|e| SoundError::Device {
            message: format!("Failed to start audio device: {:?}", e),
        })?;

        self.device = Some(device);
        Ok(())
    }
}

impl SoundPlayer for ChimeSound {
    fn play(&mut self) -> Result<(), SoundError> {
        if let Ok(mut voice) = self.voice.lock() {
            voice.frame = 0;
        }
        if self.device.is_none() {
            self.init_device()?;
        }
        debug!(event = "sound.chime_started", duration_ms = self.duration.as_millis() as u64);
        Ok(())
    }

    fn duration_hint(&self) -> Option<Duration> {
        Some(self.duration)
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
