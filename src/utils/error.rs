use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Interpreter not found on PATH: {command}")]
    InterpreterNotFound { command: String },

    #[error("Command failed ({step}): {program} exited with code {code}")]
    CommandFailed {
        step: String,
        program: String,
        code: i32,
    },

    #[error("Failed to spawn {program}: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Environment,
    Process,
    Io,
    Configuration,
}

impl LauncherError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LauncherError::InterpreterNotFound { .. } => ErrorCategory::Environment,
            LauncherError::CommandFailed { .. } | LauncherError::SpawnError { .. } => {
                ErrorCategory::Process
            }
            LauncherError::IoError(_) => ErrorCategory::Io,
            LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 行程退出碼：缺少直譯器固定為 1，子命令失敗則沿用其退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::InterpreterNotFound { .. } => 1,
            // 0 would hide the failure from the calling shell
            LauncherError::CommandFailed { code, .. } if *code != 0 => *code,
            LauncherError::CommandFailed { .. } => 1,
            LauncherError::SpawnError { .. } | LauncherError::IoError(_) => 1,
            LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => 2,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LauncherError::InterpreterNotFound { command } => format!(
                "Install Python 3 (https://www.python.org/downloads/) and make sure '{}' is on PATH",
                command
            ),
            LauncherError::CommandFailed { step, .. } => format!(
                "Check the output above for the cause of the '{}' failure and run the launcher again",
                step
            ),
            LauncherError::SpawnError { program, .. } => {
                format!("Check that '{}' exists and is executable", program)
            }
            LauncherError::IoError(_) => {
                "Check file permissions in the project directory".to_string()
            }
            LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => {
                "Fix launcher.toml (or remove it to use the defaults)".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LauncherError::InterpreterNotFound { command } => {
                format!("{} is not installed", command)
            }
            LauncherError::CommandFailed { step, code, .. } => {
                format!("Step '{}' failed (exit code {})", step, code)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
