use crate::config::LauncherSettings;
use crate::core::plan::LaunchPlan;
use crate::domain::model::{Invocation, LaunchReport, Step};
use crate::domain::ports::{CommandRunner, Console, PortProbe};
use crate::utils::error::{LauncherError, Result};
use crate::utils::messages::Message;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 依序執行各步驟；任何一步失敗就停止 (等同 `set -e`)
pub struct Launcher<R: CommandRunner, C: Console, P: PortProbe> {
    plan: LaunchPlan,
    runner: R,
    console: C,
    probe: P,
}

impl<R: CommandRunner, C: Console, P: PortProbe> Launcher<R, C, P> {
    pub fn new(settings: LauncherSettings, runner: R, console: C, probe: P) -> Self {
        Self::with_inherited_path(settings, std::env::var_os("PATH"), runner, console, probe)
    }

    pub fn with_inherited_path(
        settings: LauncherSettings,
        inherited_path: Option<OsString>,
        runner: R,
        console: C,
        probe: P,
    ) -> Self {
        Self {
            plan: LaunchPlan::new(settings, inherited_path),
            runner,
            console,
            probe,
        }
    }

    /// dry-run：只查 PATH，不執行任何命令
    pub fn describe_plan(&self) -> Vec<String> {
        let interpreter = self.runner.locate(&self.plan.settings().interpreter);
        self.plan.describe(interpreter.as_deref())
    }

    /// 回傳報告；`exit_code` 是應用程式本身的退出碼
    pub async fn run(&self) -> Result<LaunchReport> {
        let mut report = LaunchReport::default();
        self.say(Message::Banner);

        let result = self.run_steps(&mut report).await;

        if let Err(e) = &result {
            match e {
                // already reported by the step itself
                LauncherError::InterpreterNotFound { .. } | LauncherError::CommandFailed { .. } => {}
                other => self.console.error(&format!("❌ {}", other.user_friendly_message())),
            }
        }

        if self.plan.settings().pause_on_exit {
            if result.is_ok() {
                report.record(Step::PauseTerminal);
            }
            self.console
                .pause(&Message::PressEnter.render(self.plan.settings().locale));
        }

        result.map(|()| report)
    }

    async fn run_steps(&self, report: &mut LaunchReport) -> Result<()> {
        let interpreter = self.check_interpreter(report)?;
        self.create_environment(&interpreter, report).await?;
        self.activate_environment(report);
        self.install_dependencies(report).await?;
        self.ensure_data_dir(report)?;
        self.preflight_port(report);
        self.launch_application(report).await
    }

    fn check_interpreter(&self, report: &mut LaunchReport) -> Result<PathBuf> {
        let settings = self.plan.settings();
        report.record(Step::CheckInterpreter);
        self.say(Message::CheckingInterpreter {
            command: &settings.interpreter,
        });

        match self.runner.locate(&settings.interpreter) {
            Some(path) => {
                tracing::debug!("Interpreter resolved to {}", path.display());
                self.say(Message::InterpreterFound { path: &path });
                report.interpreter = Some(path.clone());
                Ok(path)
            }
            None => {
                self.shout(Message::InterpreterMissing {
                    command: &settings.interpreter,
                });
                self.shout(Message::InstallHint {
                    platform: settings.platform,
                });
                Err(LauncherError::InterpreterNotFound {
                    command: settings.interpreter.clone(),
                })
            }
        }
    }

    /// 目錄已存在就沿用，不檢查內容
    async fn create_environment(
        &self,
        interpreter: &Path,
        report: &mut LaunchReport,
    ) -> Result<()> {
        let venv = &self.plan.layout().venv;
        if venv.exists() {
            self.say(Message::EnvironmentExists { dir: &venv.root });
            return Ok(());
        }

        self.say(Message::CreatingEnvironment { dir: &venv.root });
        self.execute(self.plan.create_environment(interpreter), report)
            .await?;
        report.environment_created = true;
        Ok(())
    }

    fn activate_environment(&self, report: &mut LaunchReport) {
        report.record(Step::ActivateEnvironment);
        self.say(Message::Activating {
            dir: &self.plan.layout().venv.root,
        });
    }

    async fn install_dependencies(&self, report: &mut LaunchReport) -> Result<()> {
        if self.plan.settings().upgrade_pip {
            self.say(Message::UpgradingPip);
            self.execute(self.plan.upgrade_package_manager(), report)
                .await?;
        }

        self.say(Message::InstallingDependencies {
            manifest: &self.plan.layout().requirements,
        });
        self.execute(self.plan.install_dependencies(), report).await
    }

    fn ensure_data_dir(&self, report: &mut LaunchReport) -> Result<()> {
        report.record(Step::EnsureDataDir);
        let dir = &self.plan.layout().data_dir;

        if dir.is_dir() {
            self.say(Message::DataDirExists { dir });
        } else {
            std::fs::create_dir_all(dir)?;
            report.data_dir_created = true;
            self.say(Message::CreatingDataDir { dir });
        }
        Ok(())
    }

    /// 只警告，不中止啟動
    fn preflight_port(&self, report: &mut LaunchReport) {
        let settings = self.plan.settings();
        if !settings.port_check {
            return;
        }

        if self.probe.is_in_use(settings.port) {
            tracing::warn!("Port {} is already in use", settings.port);
            report.port_in_use = true;
            self.shout(Message::PortInUse {
                port: settings.port,
            });
            self.shout(Message::PortInUseHints {
                port: settings.port,
            });
        }
    }

    async fn launch_application(&self, report: &mut LaunchReport) -> Result<()> {
        let settings = self.plan.settings();
        let url = settings.access_url();

        self.say(Message::Starting);
        self.say(Message::OpenBrowser { url: &url });
        self.say(Message::StopHint);

        let invocation = self.plan.launch_application();
        report.record(invocation.step);
        let code = self.runner.run(&invocation).await?;

        tracing::info!("Application exited with code {}", code);
        self.say(Message::ApplicationExited { code });
        report.exit_code = code;
        Ok(())
    }

    /// 非零退出碼視為失敗並中止後續步驟
    async fn execute(&self, invocation: Invocation, report: &mut LaunchReport) -> Result<()> {
        report.record(invocation.step);
        let code = self.runner.run(&invocation).await?;

        if code != 0 {
            tracing::error!("{} failed: {}", invocation.step, invocation.display_line());
            self.shout(Message::StepFailed {
                step: invocation.step.name(),
                code,
            });
            return Err(LauncherError::CommandFailed {
                step: invocation.step.name().to_string(),
                program: invocation.program.display().to_string(),
                code,
            });
        }
        Ok(())
    }

    fn say(&self, message: Message<'_>) {
        self.console
            .status(&message.render(self.plan.settings().locale));
    }

    fn shout(&self, message: Message<'_>) {
        self.console
            .error(&message.render(self.plan.settings().locale));
    }
}
