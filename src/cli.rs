use crate::errors::CliError;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Print usage and quit
    Help,
    /// Play the notification sound once and quit (volume check)
    PlaySound,
    /// Open the timer window; `None` keeps the configured duration
    Run { minutes: Option<u64> },
}

/// Parse the arguments after the program name.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<CliAction, CliError> {
    let Some(first) = args.first() else {
        return Ok(CliAction::Run { minutes: None });
    };
    if let Some(extra) = args.get(1) {
        return Err(CliError::UnknownOption {
            arg: extra.as_ref().to_string(),
        });
    }

    match first.as_ref() {
        "-h" | "--help" => Ok(CliAction::Help),
        "-play" => Ok(CliAction::PlaySound),
        param => param
            .parse::<u64>()
            .map(|minutes| CliAction::Run {
                minutes: Some(minutes),
            })
            .map_err(|_| CliError::UnknownOption {
                arg: param.to_string(),
            }),
    }
}

pub fn usage(program: &str) -> String {
    format!(
        "Pomodoro Timer v{ver}

Usage: {program} [parameter]

Parameters:
-h, --help        this help
-play             play the sound and quit (for testing the volume)
<minutes>         If not specified, then the default value is 25.",
        ver = env!("CARGO_PKG_VERSION"),
    )
}
