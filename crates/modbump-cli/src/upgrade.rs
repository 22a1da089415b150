use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum UpgradeCommandError {
    #[error("failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` failed: {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Rewrites one dependency in the manifest to its latest release.
pub(crate) trait DependencyUpgrader {
    fn upgrade(&mut self, module_path: &str) -> Result<(), UpgradeCommandError>;
}

/// Runs `go get -u <path>@latest` with the terminal's stdout and stderr.
#[derive(Debug, Clone)]
pub(crate) struct GoGetUpgrader {
    go_binary: OsString,
    working_dir: Option<PathBuf>,
}

impl GoGetUpgrader {
    pub(crate) fn new(go_binary: impl Into<OsString>, working_dir: Option<PathBuf>) -> Self {
        Self {
            go_binary: go_binary.into(),
            working_dir,
        }
    }

    fn command_for(&self, module_path: &str) -> Command {
        let mut command = Command::new(&self.go_binary);
        command
            .args(go_get_args(module_path))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }

    fn display_command(&self, module_path: &str) -> String {
        let mut rendered = self.go_binary.to_string_lossy().into_owned();
        for arg in go_get_args(module_path) {
            rendered.push(' ');
            rendered.push_str(&arg);
        }
        rendered
    }
}

impl DependencyUpgrader for GoGetUpgrader {
    fn upgrade(&mut self, module_path: &str) -> Result<(), UpgradeCommandError> {
        let rendered = self.display_command(module_path);
        tracing::debug!(command = %rendered, "running upgrade command");

        let status = self
            .command_for(module_path)
            .status()
            .map_err(|source| UpgradeCommandError::Spawn {
                command: rendered.clone(),
                source,
            })?;
        if !status.success() {
            return Err(UpgradeCommandError::Failed {
                command: rendered,
                status,
            });
        }
        Ok(())
    }
}

pub(crate) fn go_get_args(module_path: &str) -> [String; 3] {
    [
        "get".to_string(),
        "-u".to_string(),
        format!("{module_path}@latest"),
    ]
}
