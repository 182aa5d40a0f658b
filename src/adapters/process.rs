use crate::domain::model::Invocation;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{LauncherError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// 以 tokio 子行程執行命令，stdio 直接繼承終端機
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        match which::which(program) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("which({}) failed: {}", program, e);
                None
            }
        }
    }

    async fn run(&self, invocation: &Invocation) -> Result<i32> {
        tracing::debug!(
            step = %invocation.step,
            cwd = %invocation.cwd.display(),
            "Running: {}",
            invocation.display_line()
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in &invocation.envs {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| LauncherError::SpawnError {
            program: invocation.program.display().to_string(),
            source,
        })?;

        let status = if invocation.foreground {
            wait_foreground(&mut child).await?
        } else {
            child.wait().await?
        };

        let code = exit_code(status);
        tracing::debug!(step = %invocation.step, "Exited with code {}", code);
        Ok(code)
    }
}

/// Ctrl+C 也會送到子行程；這裡只等它自己結束，好把退出碼傳回去
async fn wait_foreground(child: &mut Child) -> Result<ExitStatus> {
    loop {
        tokio::select! {
            status = child.wait() => return Ok(status?),
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::info!("Interrupt received, waiting for the application to exit");
                }
                Err(e) => {
                    tracing::warn!("Cannot listen for Ctrl+C: {}", e);
                    return Ok(child.wait().await?);
                }
            },
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        // same convention as the shell: 128 + signal number
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
