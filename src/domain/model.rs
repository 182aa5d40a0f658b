use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// 對應原本的兩支啟動腳本：POSIX shell 與 Windows batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn default_interpreter(&self) -> &'static str {
        match self {
            Platform::Unix => "python3",
            Platform::Windows => "python",
        }
    }

    /// venv 內放執行檔的子目錄
    pub fn scripts_dir(&self) -> &'static str {
        match self {
            Platform::Unix => "bin",
            Platform::Windows => "Scripts",
        }
    }

    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Unix => "",
            Platform::Windows => ".exe",
        }
    }

    pub fn path_separator(&self) -> &'static str {
        match self {
            Platform::Unix => ":",
            Platform::Windows => ";",
        }
    }

    /// batch 版本在程式結束後會 pause
    pub fn pauses_after_exit(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    CheckInterpreter,
    CreateEnvironment,
    ActivateEnvironment,
    UpgradePackageManager,
    InstallDependencies,
    EnsureDataDir,
    LaunchApplication,
    PauseTerminal,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::CheckInterpreter => "check-interpreter",
            Step::CreateEnvironment => "create-environment",
            Step::ActivateEnvironment => "activate-environment",
            Step::UpgradePackageManager => "upgrade-package-manager",
            Step::InstallDependencies => "install-dependencies",
            Step::EnsureDataDir => "ensure-data-dir",
            Step::LaunchApplication => "launch-application",
            Step::PauseTerminal => "pause-terminal",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一次外部命令呼叫
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: Step,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub envs: Vec<(OsString, OsString)>,
    pub cwd: PathBuf,
    /// true = 前景交棒：繼承 stdio 並阻塞到子行程結束
    pub foreground: bool,
}

impl Invocation {
    pub fn new(step: Step, program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            step,
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: cwd.into(),
            foreground: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn envs(mut self, envs: &[(OsString, OsString)]) -> Self {
        self.envs.extend_from_slice(envs);
        self
    }

    pub fn foreground(mut self) -> Self {
        self.foreground = true;
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.envs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 給日誌與 dry-run 用的單行表示
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// venv 目錄內的路徑解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvLayout {
    pub root: PathBuf,
    pub platform: Platform,
}

impl VenvLayout {
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(self.platform.scripts_dir())
    }

    pub fn python(&self) -> PathBuf {
        self.scripts_dir()
            .join(format!("python{}", self.platform.exe_suffix()))
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// 相當於 `source venv/bin/activate`：VIRTUAL_ENV 加上 PATH 前綴
    pub fn activation_env(&self, inherited_path: Option<OsString>) -> Vec<(OsString, OsString)> {
        let mut path = self.scripts_dir().into_os_string();
        if let Some(rest) = inherited_path.filter(|p| !p.is_empty()) {
            path.push(self.platform.path_separator());
            path.push(rest);
        }

        vec![
            (OsString::from("VIRTUAL_ENV"), self.root.clone().into_os_string()),
            (OsString::from("PATH"), path),
        ]
    }
}

/// 專案目錄下各檔案的絕對位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub venv: VenvLayout,
    pub requirements: PathBuf,
    pub entry_point: PathBuf,
    pub data_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(
        root: &Path,
        platform: Platform,
        venv_dir: &str,
        requirements: &str,
        entry_point: &str,
        data_dir: &str,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            venv: VenvLayout::new(root.join(venv_dir), platform),
            requirements: root.join(requirements),
            entry_point: root.join(entry_point),
            data_dir: root.join(data_dir),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchReport {
    pub steps: Vec<Step>,
    pub interpreter: Option<PathBuf>,
    pub environment_created: bool,
    pub data_dir_created: bool,
    pub port_in_use: bool,
    pub exit_code: i32,
}

impl LaunchReport {
    pub fn record(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn last_step(&self) -> Option<Step> {
        self.steps.last().copied()
    }
}
