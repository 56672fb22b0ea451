//! Sequential step launcher.
//!
//! Runs child processes one after another and stops at the first one that
//! does not exit successfully, the way `sh -c "a && b"` does.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{error, info, warn};

/// Exit code reported when a step could not be started.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when a step exists but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Offset added to the signal number of a step killed by a signal.
const SIGNAL_EXIT_OFFSET: i32 = 128;

/// One child process in a chain.
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub program: OsString,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, String)>,
}

impl Step {
    pub fn new(name: impl Into<String>, program: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set environment variables for the step on top of the inherited environment.
    pub fn envs<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Result of running a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    /// Exit code of the step that ended the chain, 0 if every step succeeded.
    pub exit_code: i32,
    /// Names of the steps that exited successfully, in order.
    pub completed: Vec<String>,
    /// Name of the step that ended the chain early.
    pub failed: Option<String>,
}

impl ChainOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Ordered list of steps run with `&&` semantics.
#[derive(Debug, Clone, Default)]
pub struct StepChain {
    steps: Vec<Step>,
}

impl StepChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the steps in order, waiting for each before starting the next.
    ///
    /// Stdio is inherited. Steps after the first failure are never spawned.
    pub async fn run(&self) -> ChainOutcome {
        let mut completed = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            info!(step = %step.name, "Starting step");

            let exit_code = match Command::new(&step.program)
                .args(&step.args)
                .envs(step.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .status()
                .await
            {
                Ok(status) => exit_code(status),
                Err(e) => {
                    error!(
                        step = %step.name,
                        program = %step.program.to_string_lossy(),
                        error = %e,
                        "Failed to start step"
                    );
                    spawn_error_code(e.kind())
                }
            };

            if exit_code != 0 {
                warn!(
                    step = %step.name,
                    exit_code,
                    skipped = self.steps.len() - completed.len() - 1,
                    "Step failed, skipping remaining steps"
                );
                return ChainOutcome {
                    exit_code,
                    completed,
                    failed: Some(step.name.clone()),
                };
            }

            info!(step = %step.name, "Step finished");
            completed.push(step.name.clone());
        }

        ChainOutcome {
            exit_code: 0,
            completed,
            failed: None,
        }
    }
}

/// Exit code of a finished step, as a POSIX shell would report it.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return SIGNAL_EXIT_OFFSET + signal;
        }
    }

    1
}

fn spawn_error_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
        _ => EXIT_NOT_FOUND,
    }
}
