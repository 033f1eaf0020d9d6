// ============================================================================
// SHELL.RS - External Command Execution
// ============================================================================
//
// Every collaborator of the timer (window lister, window activator, audio
// player) is an external program. Commands are written as single strings,
// split into argv the way a POSIX shell would, and then run either:
//
// - synchronously, with a bounded wait, capturing stdout + stderr
// - detached, with a reaper thread that only logs the exit status
//
// No shell is involved: pipes, globs and variables are not expanded.
// ============================================================================

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::ShellError;

/// How often a bounded wait checks whether the child has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Something that can run command lines. Implemented by [`SystemShell`] and
/// by fakes in tests.
pub trait CommandRunner {
    /// Run to completion and return stdout followed by stderr as text.
    /// The two streams are concatenated, not interleaved; callers only parse
    /// stdout, and stderr is kept for diagnostics.
    fn run(&self, command: &str) -> Result<String, ShellError>;

    /// Start the command and return immediately (fire-and-forget).
    fn spawn_detached(&self, command: &str) -> Result<(), ShellError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone)]
pub struct SystemShell {
    timeout: Duration,
}

impl SystemShell {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemShell {
    fn run(&self, command: &str) -> Result<String, ShellError> {
        let (program, mut cmd) = build_command(command)?;

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ShellError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_bounded(&mut child, self.timeout).map_err(|source| ShellError::Wait {
            program: program.clone(),
            source,
        })?;

        let Some(status) = status else {
            // Readers are left behind: a grandchild may still hold the pipes open.
            if let Err(e) = child.kill() {
                debug!(event = "shell.kill_failed", program = %program, error = %e);
            }
            let _ = child.wait();
            warn!(
                event = "shell.timed_out",
                program = %program,
                timeout_ms = self.timeout.as_millis() as u64
            );
            return Err(ShellError::TimedOut {
                program,
                timeout_ms: self.timeout.as_millis(),
            });
        };

        if !status.success() {
            warn!(
                event = "shell.nonzero_exit",
                program = %program,
                code = ?status.code()
            );
        }

        let mut merged = stdout.join().unwrap_or_default();
        merged.extend(stderr.join().unwrap_or_default());
        Ok(String::from_utf8_lossy(&merged).into_owned())
    }

    fn spawn_detached(&self, command: &str) -> Result<(), ShellError> {
        let (program, mut cmd) = build_command(command)?;

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ShellError::Spawn {
                program: program.clone(),
                source,
            })?;

        debug!(event = "shell.spawned_detached", program = %program, pid = child.id());

        thread::spawn(move || match child.wait() {
            Ok(status) if status.success() => {
                debug!(event = "shell.detached_exited", program = %program);
            }
            Ok(status) => {
                warn!(
                    event = "shell.detached_nonzero_exit",
                    program = %program,
                    code = ?status.code()
                );
            }
            Err(e) => {
                warn!(event = "shell.detached_wait_failed", program = %program, error = %e);
            }
        });

        Ok(())
    }
}

fn build_command(command: &str) -> Result<(String, Command), ShellError> {
    let argv = split_command(command)?;
    let (program, args) = argv.split_first().ok_or(ShellError::EmptyCommand)?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok((program.clone(), cmd))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// `Ok(None)` means the deadline passed with the child still running.
fn wait_bounded(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// ============================================================================
// COMMAND LINE SPLITTING
// ============================================================================
//
// Rules (a subset of POSIX shell word splitting):
// - unquoted whitespace separates words
// - '...' is taken literally
// - "..." allows \" \\ \$ and \` escapes, other backslashes are kept
// - an unquoted backslash escapes the next character
// ============================================================================

/// Split a command line into argv-style words.
pub fn split_command(command: &str) -> Result<Vec<String>, ShellError> {
    let unterminated = || ShellError::UnterminatedQuote {
        command: command.to_string(),
    };

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unterminated()),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                // A trailing backslash is kept as-is
                current.push(chars.next().unwrap_or('\\'));
            }
            ch => {
                in_word = true;
                current.push(ch);
            }
        }
    }
    if in_word {
        words.push(current);
    }

    if words.is_empty() {
        return Err(ShellError::EmptyCommand);
    }
    Ok(words)
}

/// Quote one argument so that [`split_command`] yields it back unchanged.
pub fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        split_command(s).unwrap()
    }

    #[test]
    fn test_split_plain_words() {
        assert_eq!(words("wmctrl -lGpx"), vec!["wmctrl", "-lGpx"]);
        assert_eq!(words("  play   -q  "), vec!["play", "-q"]);
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(
            words(r#"play -v 0.04 '/home/me/my sounds/done.mp3'"#),
            vec!["play", "-v", "0.04", "/home/me/my sounds/done.mp3"]
        );
        assert_eq!(words(r#"echo "a \"b\" c""#), vec!["echo", r#"a "b" c"#]);
        assert_eq!(words(r"echo a\ b"), vec!["echo", "a b"]);
        assert_eq!(words("echo ''"), vec!["echo", ""]);
        assert_eq!(words(r#"echo "x\ny""#), vec!["echo", r"x\ny"]);
    }

    #[test]
    fn test_split_errors() {
        assert!(matches!(split_command(""), Err(ShellError::EmptyCommand)));
        assert!(matches!(split_command("   "), Err(ShellError::EmptyCommand)));
        assert!(matches!(
            split_command("echo 'oops"),
            Err(ShellError::UnterminatedQuote { .. })
        ));
        assert!(matches!(
            split_command(r#"echo "oops"#),
            Err(ShellError::UnterminatedQuote { .. })
        ));
    }

    #[test]
    fn test_quote_arg_survives_split() {
        assert_eq!(quote_arg("/usr/bin/play"), "/usr/bin/play");
        for arg in ["with space", "it's", "", "$HOME"] {
            let line = format!("cmd {}", quote_arg(arg));
            assert_eq!(words(&line), vec!["cmd".to_string(), arg.to_string()]);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout_and_stderr() {
        let shell = SystemShell::new(Duration::from_secs(5));
        let out = shell.run("echo hello").unwrap();
        assert_eq!(out, "hello\n");

        // stderr comes after stdout even when written first
        let out = shell.run("sh -c 'echo err >&2; echo out'").unwrap();
        assert_eq!(out, "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_returns_output_on_nonzero_exit() {
        let shell = SystemShell::new(Duration::from_secs(5));
        let out = shell.run("sh -c 'echo partial; exit 3'").unwrap();
        assert_eq!(out, "partial\n");
    }

    #[test]
    fn test_run_missing_binary() {
        let shell = SystemShell::new(Duration::from_secs(1));
        let err = shell.run("/nonexistent/pom-timer-tool --x").unwrap_err();
        assert!(matches!(err, ShellError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_times_out() {
        let shell = SystemShell::new(Duration::from_millis(100));
        let started = Instant::now();
        let err = shell.run("sleep 5").unwrap_err();
        assert!(matches!(err, ShellError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_detached_returns_immediately() {
        let shell = SystemShell::new(Duration::from_secs(1));
        let started = Instant::now();
        shell.spawn_detached("sleep 2").unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
