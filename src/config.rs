use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundBackend {
    /// External player binary with an audio file
    Command,
    /// Built-in tone through the audio device
    Chime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefocusBackend {
    /// wmctrl + xdotool
    Tools,
    /// Raise the window through FLTK
    Toolkit,
    None,
}

/// All application settings, loaded from an optional INI file or defaults.
/// The file is only ever read.
#[derive(Debug, Clone)]
pub struct Settings {
    // ── Timer ──
    pub minutes: u64,

    // ── Window ──
    pub window_title: String,
    pub window_width: i32,
    pub window_height: i32,
    pub font_size: i32,
    pub always_on_top: bool,

    // ── Sound ──
    pub sound_backend: SoundBackend,
    pub sound_file: PathBuf,
    pub sound_volume: f32,
    pub play_path: PathBuf,
    pub chime_frequency_hz: f32,
    pub chime_duration_ms: u64,
    pub chime_volume: f32,

    // ── Refocus ──
    pub refocus_backend: RefocusBackend,
    pub wmctrl_path: PathBuf,
    pub xdotool_path: PathBuf,

    // ── External commands ──
    pub command_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            minutes: 25,

            window_title: "pom timer".to_string(),
            window_width: 200,
            window_height: 150,
            font_size: 40,
            always_on_top: true,

            sound_backend: SoundBackend::Command,
            sound_file: default_sound_file(),
            sound_volume: 0.04,
            play_path: PathBuf::from("/usr/bin/play"),
            chime_frequency_hz: 880.0,
            chime_duration_ms: 700,
            chime_volume: 0.3,

            refocus_backend: RefocusBackend::Tools,
            wmctrl_path: PathBuf::from("/usr/bin/wmctrl"),
            xdotool_path: PathBuf::from("/usr/bin/xdotool"),

            command_timeout_ms: 5000,
        }
    }
}

impl Settings {
    const FILE_NAME: &'static str = "pom-timer.ini";
    const PATH_ENV: &'static str = "POM_TIMER_CONFIG";

    /// Load from `$POM_TIMER_CONFIG` or `pom-timer.ini` in the working
    /// directory. A missing file means defaults.
    pub fn load() -> Self {
        let path = env::var_os(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME));

        if !path.exists() {
            debug!(event = "config.defaults", path = %path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(event = "config.read_failed", error = %e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(event = "config.loaded", path = %path.display());
        Ok(Self::from_ini(&content))
    }

    pub fn from_ini(content: &str) -> Self {
        let mut settings = Self::default();
        settings.parse_ini(content);
        settings
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn chime_duration(&self) -> Duration {
        Duration::from_millis(self.chime_duration_ms)
    }

    fn parse_ini(&mut self, content: &str) {
        let map = parse_ini_to_map(content);

        set_parsed(&map, "minutes", &mut self.minutes);

        if let Some(v) = map.get("window_title") {
            self.window_title = v.clone();
        }
        set_parsed(&map, "window_width", &mut self.window_width);
        set_parsed(&map, "window_height", &mut self.window_height);
        set_parsed(&map, "font_size", &mut self.font_size);
        set_parsed(&map, "always_on_top", &mut self.always_on_top);

        if let Some(v) = map.get("sound_backend") {
            match v.to_ascii_lowercase().as_str() {
                "command" => self.sound_backend = SoundBackend::Command,
                "chime" => self.sound_backend = SoundBackend::Chime,
                _ => warn!(event = "config.invalid_value", key = "sound_backend", value = %v),
            }
        }
        if let Some(v) = map.get("sound_file") {
            self.sound_file = PathBuf::from(v);
        }
        set_parsed(&map, "sound_volume", &mut self.sound_volume);
        if let Some(v) = map.get("play_path") {
            self.play_path = PathBuf::from(v);
        }
        set_parsed(&map, "chime_frequency_hz", &mut self.chime_frequency_hz);
        set_parsed(&map, "chime_duration_ms", &mut self.chime_duration_ms);
        set_parsed(&map, "chime_volume", &mut self.chime_volume);

        if let Some(v) = map.get("refocus_backend") {
            match v.to_ascii_lowercase().as_str() {
                "tools" => self.refocus_backend = RefocusBackend::Tools,
                "toolkit" => self.refocus_backend = RefocusBackend::Toolkit,
                "none" => self.refocus_backend = RefocusBackend::None,
                _ => warn!(event = "config.invalid_value", key = "refocus_backend", value = %v),
            }
        }
        if let Some(v) = map.get("wmctrl_path") {
            self.wmctrl_path = PathBuf::from(v);
        }
        if let Some(v) = map.get("xdotool_path") {
            self.xdotool_path = PathBuf::from(v);
        }

        set_parsed(&map, "command_timeout_ms", &mut self.command_timeout_ms);
    }
}

/// The alarm sound ships next to the executable.
fn default_sound_file() -> PathBuf {
    const SOUND_FILE: &str = "timer_done.mp3";
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SOUND_FILE)))
        .unwrap_or_else(|| PathBuf::from(SOUND_FILE))
}

/// Overwrite `slot` when `key` is present and parses; warn and keep the
/// default otherwise.
fn set_parsed<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str, slot: &mut T) {
    let Some(v) = map.get(key) else {
        return;
    };
    match v.parse() {
        Ok(n) => *slot = n,
        Err(_) => warn!(event = "config.invalid_value", key = key, value = %v),
    }
}

/// Parse INI content into a flat key-value map (section headers are ignored,
/// keys are globally unique in our format).
fn parse_ini_to_map(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(key.trim().to_string(), val.trim().to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let settings = Settings::default();
        assert_eq!(settings.minutes, 25);
        assert_eq!(settings.window_title, "pom timer");
        assert_eq!(settings.sound_backend, SoundBackend::Command);
        assert_eq!(settings.refocus_backend, RefocusBackend::Tools);
        assert_eq!(settings.command_timeout(), Duration::from_secs(5));
        assert!(settings.sound_file.ends_with("timer_done.mp3"));
    }

    #[test]
    fn values_override_defaults() {
        let ini = "# comment
[Timer]
minutes = 50

[Window]
window_title = focus clock
always_on_top = false

[Sound]
sound_backend = Chime
sound_file = /tmp/ding sound.wav
sound_volume = 0.5
chime_volume = 0.75

[Refocus]
refocus_backend = toolkit
command_timeout_ms = 250
";
        let settings = Settings::from_ini(ini);
        assert_eq!(settings.minutes, 50);
        assert_eq!(settings.window_title, "focus clock");
        assert!(!settings.always_on_top);
        assert_eq!(settings.sound_backend, SoundBackend::Chime);
        assert_eq!(settings.sound_file, PathBuf::from("/tmp/ding sound.wav"));
        assert_eq!(settings.sound_volume, 0.5);
        assert_eq!(settings.chime_volume, 0.75);
        assert_eq!(settings.refocus_backend, RefocusBackend::Toolkit);
        assert_eq!(settings.command_timeout(), Duration::from_millis(250));
        // Untouched keys keep their defaults
        assert_eq!(settings.window_width, 200);
        assert_eq!(settings.wmctrl_path, PathBuf::from("/usr/bin/wmctrl"));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let ini = "minutes = soon
font_size = huge
sound_backend = trumpet
refocus_backend = telepathy
";
        let settings = Settings::from_ini(ini);
        assert_eq!(settings.minutes, 25);
        assert_eq!(settings.font_size, 40);
        assert_eq!(settings.sound_backend, SoundBackend::Command);
        assert_eq!(settings.refocus_backend, RefocusBackend::Tools);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "minutes = 5").unwrap();
        writeln!(file, "xdotool_path = /opt/bin/xdotool").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.minutes, 5);
        assert_eq!(settings.xdotool_path, PathBuf::from("/opt/bin/xdotool"));
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
