use crate::config::LauncherSettings;
use crate::domain::model::{Invocation, ProjectLayout, Step};
use std::ffi::OsString;
use std::path::Path;

/// 各步驟要執行的命令；啟動器與 dry-run 共用同一份定義
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    settings: LauncherSettings,
    layout: ProjectLayout,
    activation_env: Vec<(OsString, OsString)>,
}

impl LaunchPlan {
    pub fn new(settings: LauncherSettings, inherited_path: Option<OsString>) -> Self {
        let layout = settings.layout();
        let activation_env = layout.venv.activation_env(inherited_path);
        Self {
            settings,
            layout,
            activation_env,
        }
    }

    pub fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// `python3 -m venv venv`，在專案目錄下以相對路徑建立
    pub fn create_environment(&self, interpreter: &Path) -> Invocation {
        Invocation::new(Step::CreateEnvironment, interpreter, &self.layout.root)
            .arg("-m")
            .arg("venv")
            .arg(&self.settings.venv_dir)
    }

    pub fn upgrade_package_manager(&self) -> Invocation {
        self.venv_python(Step::UpgradePackageManager)
            .arg("-m")
            .arg("pip")
            .arg("install")
            .arg("--upgrade")
            .arg("pip")
            .arg("-q")
    }

    pub fn install_dependencies(&self) -> Invocation {
        self.venv_python(Step::InstallDependencies)
            .arg("-m")
            .arg("pip")
            .arg("install")
            .arg("-r")
            .arg(&self.settings.requirements)
            .arg("-q")
    }

    /// 應用程式從 PORT 環境變數讀取監聽埠
    pub fn launch_application(&self) -> Invocation {
        self.venv_python(Step::LaunchApplication)
            .arg(&self.settings.entry_point)
            .env("PORT", self.settings.port.to_string())
            .foreground()
    }

    fn venv_python(&self, step: Step) -> Invocation {
        Invocation::new(step, self.layout.venv.python(), &self.layout.root)
            .envs(&self.activation_env)
    }

    /// dry-run 輸出，不碰檔案系統以外的任何東西
    pub fn describe(&self, interpreter: Option<&Path>) -> Vec<String> {
        let settings = &self.settings;
        let mut lines = vec![
            format!("Project directory: {}", self.layout.root.display()),
            match interpreter {
                Some(path) => format!("Interpreter: {} ({})", settings.interpreter, path.display()),
                None => format!("Interpreter: {} (not found on PATH)", settings.interpreter),
            },
        ];

        let interpreter_path = interpreter
            .map(Path::to_path_buf)
            .unwrap_or_else(|| settings.interpreter.clone().into());
        let create = self.create_environment(&interpreter_path);
        if self.layout.venv.exists() {
            lines.push(format!("[{}] skipped, {} exists", create.step, settings.venv_dir));
        } else {
            lines.push(format!("[{}] {}", create.step, create.display_line()));
        }

        lines.push(format!(
            "[{}] VIRTUAL_ENV={}",
            Step::ActivateEnvironment,
            self.layout.venv.root.display()
        ));

        if settings.upgrade_pip {
            let upgrade = self.upgrade_package_manager();
            lines.push(format!("[{}] {}", upgrade.step, upgrade.display_line()));
        }

        let install = self.install_dependencies();
        lines.push(format!("[{}] {}", install.step, install.display_line()));

        let data_state = if self.layout.data_dir.is_dir() {
            "exists"
        } else {
            "will be created"
        };
        lines.push(format!(
            "[{}] {} ({})",
            Step::EnsureDataDir,
            settings.data_dir,
            data_state
        ));

        let launch = self.launch_application();
        lines.push(format!(
            "[{}] PORT={} {}",
            launch.step,
            settings.port,
            launch.display_line()
        ));

        if settings.pause_on_exit {
            lines.push(format!("[{}] wait for Enter", Step::PauseTerminal));
        }

        lines.push(format!("URL: {}", settings.access_url()));
        lines
    }
}
