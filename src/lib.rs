pub mod alarm;
pub mod cli;
pub mod config;
pub mod countdown;
pub mod errors;
pub mod focus;
pub mod format;
pub mod logging;
pub mod preflight;
pub mod shell;
pub mod sound;
pub mod windows;

pub use alarm::Alarm;
pub use cli::{parse_args, usage, CliAction};
pub use config::{RefocusBackend, Settings, SoundBackend};
pub use countdown::{Countdown, CountdownHooks, CountdownState, RunId, TickOutcome};
pub use focus::{NoRefocus, Refocus, ToolRefocus};
pub use format::format_mmss;
pub use shell::{CommandRunner, SystemShell};
pub use sound::{ChimeSound, CommandSound, SoundPlayer};
pub use windows::{find_by_title, parse_window_list, WindowRecord, WindowTools};

/// Sound player selected by the settings.
pub fn build_sound(settings: &Settings) -> Box<dyn SoundPlayer> {
    match settings.sound_backend {
        SoundBackend::Command => Box::new(CommandSound::new(
            SystemShell::new(settings.command_timeout()),
            settings.play_path.to_string_lossy(),
            settings.sound_volume,
            settings.sound_file.clone(),
        )),
        SoundBackend::Chime => Box::new(ChimeSound::new(
            settings.chime_frequency_hz,
            settings.chime_duration(),
            settings.chime_volume,
        )),
    }
}
