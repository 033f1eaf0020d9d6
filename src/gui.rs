use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use fltk::{
    app,
    button::Button,
    enums::{Color, Font, FrameType},
    frame::Frame,
    group::Flex,
    prelude::*,
    window::Window,
};
use tracing::{info, warn};

use pom_timer::errors::WindowError;
use pom_timer::{
    build_sound, Alarm, Countdown, CountdownHooks, NoRefocus, Refocus, RefocusBackend, RunId,
    Settings, SystemShell, TickOutcome, ToolRefocus, WindowTools,
};

/// Seconds between countdown ticks
const TICK_SECONDS: f64 = 1.0;
const BUTTON_H: i32 = 25;

// ─── Countdown wiring ──────────────────────────────────────────────────────────

/// Routes countdown output to the label and the alarm.
struct WindowHooks {
    label: Frame,
    alarm: Alarm,
}

impl CountdownHooks for WindowHooks {
    fn show(&mut self, text: &str) {
        self.label.set_label(text);
        self.label.redraw();
    }

    fn zero_reached(&mut self) {
        self.alarm.ring();
    }
}

struct TimerState {
    countdown: Countdown,
    hooks: WindowHooks,
}

/// Raises the main window through FLTK itself.
struct ToolkitRefocus {
    window: Window,
}

impl Refocus for ToolkitRefocus {
    fn refocus(&mut self) -> Result<bool, WindowError> {
        self.window.show();
        self.window
            .take_focus()
            .map_err(|e| WindowError::Toolkit {
                message: format!("{:?}", e),
            })?;
        Ok(true)
    }
}

fn build_refocus(settings: &Settings, window: &Window) -> Box<dyn Refocus> {
    match settings.refocus_backend {
        RefocusBackend::Tools => {
            let tools = WindowTools::new(
                SystemShell::new(settings.command_timeout()),
                settings.wmctrl_path.to_string_lossy(),
                settings.xdotool_path.to_string_lossy(),
            );
            match ToolRefocus::for_title(tools, &settings.window_title) {
                Ok(focus) => Box::new(focus),
                Err(e) => {
                    warn!(event = "gui.refocus_disabled", error = %e);
                    Box::new(NoRefocus)
                }
            }
        }
        RefocusBackend::Toolkit => Box::new(ToolkitRefocus {
            window: window.clone(),
        }),
        RefocusBackend::None => Box::new(NoRefocus),
    }
}

/// Re-arms itself every second until the run stops.
fn schedule_ticks(state: &Rc<RefCell<TimerState>>, run: RunId) {
    let state = state.clone();
    app::add_timeout3(TICK_SECONDS, move |handle| {
        let outcome = match state.try_borrow_mut() {
            Ok(mut st) => {
                let TimerState { countdown, hooks } = &mut *st;
                countdown.tick(run, hooks)
            }
            Err(_) => {
                warn!(event = "gui.tick_skipped", reason = "state_busy");
                TickOutcome::Continue
            }
        };
        if outcome == TickOutcome::Continue {
            app::repeat_timeout3(TICK_SECONDS, handle);
        }
    });
}

/// Top-left corner that centres a `win_w` x `win_h` window on the screen.
fn center_position(screen_w: f64, screen_h: f64, win_w: i32, win_h: i32) -> (i32, i32) {
    let x = (screen_w as i32) / 2 - win_w / 2;
    let y = (screen_h as i32) / 2 - win_h / 2;
    (x.max(0), y.max(0))
}

// ═══════════════════════════════════════════════════════════════════════════
//  WINDOW
// ═══════════════════════════════════════════════════════════════════════════

pub fn run(settings: &Settings) -> Result<()> {
    let app = app::App::default();

    let countdown = Countdown::from_minutes(settings.minutes);

    let mut win = Window::default().with_size(settings.window_width, settings.window_height);
    win.set_label(&settings.window_title);

    let mut col = Flex::default_fill().column();
    col.set_margin(5);
    col.set_pad(5);

    let mut label = Frame::default().with_label(&countdown.display());
    label.set_frame(FrameType::UpBox);
    label.set_color(Color::White);
    label.set_label_color(Color::Blue);
    label.set_label_font(Font::Helvetica);
    label.set_label_size(settings.font_size);

    let mut btn_start = Button::default().with_label("Start");
    let mut btn_reset = Button::default().with_label("Reset");
    col.fixed(&btn_start, BUTTON_H);
    col.fixed(&btn_reset, BUTTON_H);

    col.end();
    win.end();
    win.make_resizable(false);

    let (screen_w, screen_h) = app::screen_size();
    let (x, y) = center_position(screen_w, screen_h, win.w(), win.h());
    win.set_pos(x, y);

    let alarm = Alarm::new(build_sound(settings), build_refocus(settings, &win));
    let state = Rc::new(RefCell::new(TimerState {
        countdown,
        hooks: WindowHooks { label, alarm },
    }));

    // ---------------- Callbacks ----------------
    {
        let state = state.clone();
        btn_start.set_callback(move |_| {
            let run = {
                let Ok(mut st) = state.try_borrow_mut() else {
                    return;
                };
                let TimerState { countdown, hooks } = &mut *st;
                countdown.start(hooks)
            };
            if let Some(run) = run {
                schedule_ticks(&state, run);
            }
        });
    }
    {
        let state = state.clone();
        btn_reset.set_callback(move |_| {
            let Ok(mut st) = state.try_borrow_mut() else {
                return;
            };
            let TimerState { countdown, hooks } = &mut *st;
            countdown.reset(hooks);
        });
    }

    win.show();
    if settings.always_on_top {
        // Only valid once the window is mapped
        win.set_on_top();
    }

    info!(
        event = "gui.started",
        minutes = settings.minutes,
        title = %settings.window_title
    );
    app.run()
        .map_err(|e| anyhow::anyhow!("FLTK event loop failed: {:?}", e))?;
    Ok(())
}
