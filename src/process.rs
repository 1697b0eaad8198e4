//! # External Process Execution
//!
//! Every call to `git` goes through the [`ProcessRunner`] trait so the status
//! engine and the provisioner can be exercised against scripted output in
//! tests. [`SystemRunner`] is the real implementation on top of
//! `std::process::Command`.
//!
//! An [`Invocation`] carries the argument vector, an optional working
//! directory and two switches:
//!
//! - **passthrough**: inherit stdout/stderr so the user sees progress live
//!   (clone, pull). Nothing is captured in that case.
//! - **check**: turn a nonzero exit code into [`Error::CommandFailed`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// A single external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub passthrough: bool,
    pub check: bool,
}

impl Invocation {
    /// Build an invocation from a program name followed by its arguments.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            passthrough: false,
            check: false,
        }
    }

    /// Shorthand for `git <args...>`.
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec!["git".to_string()];
        all.extend(args.into_iter().map(Into::into));
        Self::new(all)
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Let the child write straight to the terminal.
    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    /// Fail with [`Error::CommandFailed`] on a nonzero exit code.
    pub fn checked(mut self) -> Self {
        self.check = true;
        self
    }

    /// The argument vector joined with spaces, for messages.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// What a finished command left behind. Output fields are empty for
/// passthrough invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running external programs - allows scripting in tests
pub trait ProcessRunner {
    /// Run the command and report what happened, without looking at the
    /// exit code. Only failing to start the program is an error here.
    fn execute(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Run the command, honouring [`Invocation::check`].
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!("Running `{}`", invocation);
        let output = self.execute(invocation)?;
        if invocation.check && !output.success() {
            return Err(Error::CommandFailed {
                command: invocation.command_line(),
                code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

/// Runs commands on the host with `std::process::Command`.
///
/// Captured invocations are run with `LC_ALL=C`: their output gets matched
/// against git's English phrasing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let (program, rest) = invocation
            .args
            .split_first()
            .ok_or_else(|| Error::precondition("cannot run an empty command"))?;

        let mut command = Command::new(program);
        command.args(rest);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let spawn_error = |source| Error::CommandSpawn {
            command: invocation.command_line(),
            source,
        };

        if invocation.passthrough {
            let status = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_error)?;
            return Ok(CommandOutput {
                exit_code: status.code().unwrap_or(-1),
                ..CommandOutput::default()
            });
        }

        let output = command
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .map_err(spawn_error)?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted runner: responses are looked up by command line and every
    //! invocation is recorded for later assertions.

    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::io;

    type Effect = Box<dyn Fn(&Invocation)>;

    #[derive(Default)]
    pub struct ScriptedRunner {
        responses: HashMap<String, CommandOutput>,
        effects: HashMap<String, Effect>,
        unspawnable: HashSet<String>,
        pub calls: RefCell<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer `command_line` with exit code 0 and the given stdout.
        pub fn ok(mut self, command_line: &str, stdout: &str) -> Self {
            self.responses.insert(
                command_line.to_string(),
                CommandOutput {
                    stdout: stdout.to_string(),
                    ..CommandOutput::default()
                },
            );
            self
        }

        /// Answer `command_line` with the given exit code and stderr.
        pub fn fail(mut self, command_line: &str, code: i32, stderr: &str) -> Self {
            self.responses.insert(
                command_line.to_string(),
                CommandOutput {
                    stderr: stderr.to_string(),
                    exit_code: code,
                    ..CommandOutput::default()
                },
            );
            self
        }

        /// Run `effect` whenever `command_line` is executed, e.g. to create
        /// the directory a clone would have produced.
        pub fn effect(mut self, command_line: &str, effect: impl Fn(&Invocation) + 'static) -> Self {
            self.effects
                .insert(command_line.to_string(), Box::new(effect));
            self
        }

        /// Make `command_line` fail to start, as if the program were missing.
        pub fn unspawnable(mut self, command_line: &str) -> Self {
            self.unspawnable.insert(command_line.to_string());
            self
        }

        pub fn command_lines(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(Invocation::command_line)
                .collect()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn execute(&self, invocation: &Invocation) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(invocation.clone());
            if let Some(effect) = self.effects.get(&invocation.command_line()) {
                effect(invocation);
            }
            if self.unspawnable.contains(&invocation.command_line()) {
                return Err(Error::CommandSpawn {
                    command: invocation.command_line(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such program"),
                });
            }
            // Unscripted commands succeed silently.
            Ok(self
                .responses
                .get(&invocation.command_line())
                .cloned()
                .unwrap_or_default())
        }
    }
}
