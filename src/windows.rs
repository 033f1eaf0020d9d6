// ============================================================================
// WINDOWS.RS - Window Lookup and Activation (wmctrl / xdotool)
// ============================================================================
//
// `wmctrl -lGpx` prints one line per managed window:
//
//   0x03a00007  0 4567   10 20 300 400  firefox.Firefox  host  Some Title
//   ^id         ^desk ^pid ^x  ^y  ^w  ^h ^class         ^host ^title...
//
// The first nine whitespace-separated fields are fixed; everything after
// them is the title, rejoined with single spaces. Sticky windows report
// desktop -1.
// ============================================================================

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::WindowError;
use crate::shell::{quote_arg, CommandRunner};

/// Number of fixed fields before the title.
const FIXED_FIELDS: usize = 9;

/// One open window as reported by the window lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub id: String,
    pub desktop: i32,
    pub pid: u32,
    /// x, y, width, height
    pub geometry: [i32; 4],
    pub window_class: String,
    pub client_machine: String,
    pub title: String,
}

impl WindowRecord {
    pub fn parse_line(line: &str) -> Result<Self, WindowError> {
        let malformed = || WindowError::MalformedLine {
            line: line.to_string(),
        };

        let pieces: Vec<&str> = line.split_whitespace().collect();
        if pieces.len() < FIXED_FIELDS {
            return Err(malformed());
        }

        let mut geometry = [0i32; 4];
        for (slot, raw) in geometry.iter_mut().zip(&pieces[3..7]) {
            *slot = raw.parse().map_err(|_| malformed())?;
        }

        Ok(Self {
            id: pieces[0].to_string(),
            desktop: pieces[1].parse().map_err(|_| malformed())?,
            pid: pieces[2].parse().map_err(|_| malformed())?,
            geometry,
            window_class: pieces[7].to_string(),
            client_machine: pieces[8].to_string(),
            title: pieces[FIXED_FIELDS..].join(" "),
        })
    }

    /// The id as a number; the activation tool wants it in decimal.
    pub fn numeric_id(&self) -> Result<u64, WindowError> {
        let hex = self
            .id
            .strip_prefix("0x")
            .or_else(|| self.id.strip_prefix("0X"))
            .unwrap_or(&self.id);
        u64::from_str_radix(hex, 16).map_err(|_| WindowError::InvalidId {
            id: self.id.clone(),
        })
    }
}

/// Parse a full window-list dump. Non-ASCII characters are dropped first;
/// lines that cannot be parsed are skipped with a warning.
pub fn parse_window_list(output: &str) -> Vec<WindowRecord> {
    let ascii: String = output.chars().filter(char::is_ascii).collect();

    ascii
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match WindowRecord::parse_line(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(event = "windows.line_skipped", error = %e);
                None
            }
        })
        .collect()
}

/// First window whose title matches `pattern` (regex search, not a full
/// match). Order is whatever the window manager listed.
pub fn find_by_title<'a>(windows: &'a [WindowRecord], pattern: &Regex) -> Option<&'a WindowRecord> {
    windows.iter().find(|w| pattern.is_match(&w.title))
}

// ─── Tool bindings ─────────────────────────────────────────────────────────────

/// The window lister and activator, bound to their paths and a runner.
pub struct WindowTools<R: CommandRunner> {
    runner: R,
    wmctrl_path: String,
    xdotool_path: String,
}

impl<R: CommandRunner> WindowTools<R> {
    pub fn new(runner: R, wmctrl_path: impl Into<String>, xdotool_path: impl Into<String>) -> Self {
        Self {
            runner,
            wmctrl_path: wmctrl_path.into(),
            xdotool_path: xdotool_path.into(),
        }
    }

    pub fn list_windows(&self) -> Result<Vec<WindowRecord>, WindowError> {
        let output = self
            .runner
            .run(&format!("{} -lGpx", quote_arg(&self.wmctrl_path)))?;
        let windows = parse_window_list(&output);
        debug!(event = "windows.listed", count = windows.len());
        Ok(windows)
    }

    /// Id of the first window whose title matches, if any.
    pub fn find_by_title(&self, pattern: &Regex) -> Result<Option<WindowRecord>, WindowError> {
        let windows = self.list_windows()?;
        Ok(find_by_title(&windows, pattern).cloned())
    }

    /// Fire-and-forget: there is no confirmation that the window manager
    /// honoured the request.
    pub fn activate(&self, window: &WindowRecord) -> Result<(), WindowError> {
        let id = window.numeric_id()?;
        self.runner.spawn_detached(&format!(
            "{} windowactivate {}",
            quote_arg(&self.xdotool_path),
            id
        ))?;
        debug!(event = "windows.activate_requested", id = %window.id, numeric_id = id);
        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
