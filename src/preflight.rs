use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{RefocusBackend, Settings, SoundBackend};
use crate::errors::PreflightError;

/// External binaries the configured backends will call.
pub fn required_binaries(settings: &Settings) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if settings.refocus_backend == RefocusBackend::Tools {
        paths.push(settings.wmctrl_path.clone());
        paths.push(settings.xdotool_path.clone());
    }
    if settings.sound_backend == SoundBackend::Command {
        paths.push(settings.play_path.clone());
    }
    paths
}

/// Fails on the first path that is not an existing file.
pub fn check_required<P: AsRef<Path>>(paths: &[P]) -> Result<(), PreflightError> {
    for path in paths {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PreflightError::MissingBinary {
                path: path.to_path_buf(),
            });
        }
        debug!(event = "preflight.found", path = %path.display());
    }
    Ok(())
}

/// Full startup check. A missing sound asset only warns: the timer is still
/// useful without it.
pub fn run(settings: &Settings) -> Result<(), PreflightError> {
    check_required(&required_binaries(settings))?;
    if settings.sound_backend == SoundBackend::Command && !settings.sound_file.is_file() {
        warn!(
            event = "preflight.sound_file_missing",
            path = %settings.sound_file.display()
        );
    }
    Ok(())
}
