mod gui;

use std::env;
use std::process::ExitCode;
use std::thread;

use tracing::error;

use pom_timer::{build_sound, logging, parse_args, preflight, usage, CliAction, Settings};

fn main() -> ExitCode {
    logging::init_logging();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pom-timer");

    let action = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match action {
        CliAction::Help => {
            println!("{}", usage(program));
            ExitCode::SUCCESS
        }
        CliAction::PlaySound => match checked_settings() {
            Some(settings) => play_once(&settings),
            None => ExitCode::FAILURE,
        },
        CliAction::Run { minutes } => {
            let Some(mut settings) = checked_settings() else {
                return ExitCode::FAILURE;
            };
            if let Some(minutes) = minutes {
                settings.minutes = minutes;
            }
            match gui::run(&settings) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(event = "gui.failed", error = %e);
                    eprintln!("Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Settings with the required binaries present, or `None` after reporting
/// the missing one.
fn checked_settings() -> Option<Settings> {
    let settings = Settings::load();
    match preflight::run(&settings) {
        Ok(()) => Some(settings),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

/// Volume check: play the sound once, wait for in-process sounds to finish.
fn play_once(settings: &Settings) -> ExitCode {
    let mut sound = build_sound(settings);
    if let Err(e) = sound.play() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    if let Some(duration) = sound.duration_hint() {
        thread::sleep(duration);
    }
    ExitCode::SUCCESS
}
