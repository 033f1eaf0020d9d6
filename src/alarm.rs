use tracing::{debug, info, warn};

use crate::focus::Refocus;
use crate::sound::SoundPlayer;

/// What happens when the countdown hits zero: play the sound, then pull the
/// timer window to the front. Failures are logged and never interrupt the
/// countdown.
pub struct Alarm {
    sound: Box<dyn SoundPlayer>,
    focus: Box<dyn Refocus>,
}

impl Alarm {
    pub fn new(sound: Box<dyn SoundPlayer>, focus: Box<dyn Refocus>) -> Self {
        Self { sound, focus }
    }

    pub fn ring(&mut self) {
        info!(event = "alarm.ring");

        if let Err(e) = self.sound.play() {
            warn!(event = "alarm.sound_failed", error = %e);
        }

        match self.focus.refocus() {
            Ok(true) => debug!(event = "alarm.refocused"),
            Ok(false) => debug!(event = "alarm.refocus_skipped"),
            Err(e) => warn!(event = "alarm.refocus_failed", error = %e),
        }
    }
}
