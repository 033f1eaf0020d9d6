use regex::Regex;
use tracing::debug;

use crate::errors::WindowError;
use crate::shell::CommandRunner;
use crate::windows::WindowTools;

/// Bring the timer's own window to the foreground.
pub trait Refocus {
    /// `Ok(true)` if a window was activated, `Ok(false)` if there was
    /// nothing to activate.
    fn refocus(&mut self) -> Result<bool, WindowError>;
}

/// Finds the window by title with wmctrl and activates it with xdotool (X11).
pub struct ToolRefocus<R: CommandRunner> {
    tools: WindowTools<R>,
    title_pattern: Regex,
}

impl<R: CommandRunner> ToolRefocus<R> {
    /// The title is matched literally, anywhere in the window title.
    pub fn for_title(tools: WindowTools<R>, title: &str) -> Result<Self, WindowError> {
        Ok(Self {
            tools,
            title_pattern: Regex::new(&regex::escape(title))?,
        })
    }
}

impl<R: CommandRunner> Refocus for ToolRefocus<R> {
    fn refocus(&mut self) -> Result<bool, WindowError> {
        let Some(window) = self.tools.find_by_title(&self.title_pattern)? else {
            debug!(event = "focus.window_not_found", pattern = %self.title_pattern);
            return Ok(false);
        };
        debug!(event = "focus.window_found", id = %window.id);
        self.tools.activate(&window)?;
        Ok(true)
    }
}

/// Never touches any window.
pub struct NoRefocus;

impl Refocus for NoRefocus {
    fn refocus(&mut self) -> Result<bool, WindowError> {
        Ok(false)
    }
}
