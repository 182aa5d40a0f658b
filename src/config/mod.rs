pub mod toml_config;

use crate::domain::model::{Platform, ProjectLayout};
use crate::utils::error::Result;
use crate::utils::messages::Locale;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};
use toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};

pub const DEFAULT_VENV_DIR: &str = "venv";
pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";
pub const DEFAULT_ENTRY_POINT: &str = "app.py";
pub const DEFAULT_DATA_DIR: &str = "link_extractor_data";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "link-extractor-launcher")]
#[command(about = "Prepare the Python environment and start Link Extractor")]
pub struct CliArgs {
    /// Directory containing app.py and requirements.txt
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Path to launcher.toml (defaults to <project-dir>/launcher.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would run without executing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub const ALLOWED: [&'static str; 2] = ["compact", "json"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// 合併預設值與 launcher.toml 之後的最終設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    pub project_dir: PathBuf,
    pub platform: Platform,
    pub interpreter: String,
    pub venv_dir: String,
    pub requirements: String,
    pub upgrade_pip: bool,
    pub entry_point: String,
    pub data_dir: String,
    pub host: String,
    pub port: u16,
    pub locale: Locale,
    pub pause_on_exit: bool,
    pub port_check: bool,
    pub log_format: LogFormat,
}

impl LauncherSettings {
    /// 沒有任何設定檔時的固定行為，等同該平台的啟動腳本
    pub fn defaults(project_dir: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            project_dir: project_dir.into(),
            platform,
            interpreter: platform.default_interpreter().to_string(),
            venv_dir: DEFAULT_VENV_DIR.to_string(),
            requirements: DEFAULT_REQUIREMENTS.to_string(),
            upgrade_pip: true,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            data_dir: DEFAULT_DATA_DIR.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            locale: Locale::default(),
            pause_on_exit: platform.pauses_after_exit(),
            port_check: true,
            log_format: LogFormat::default(),
        }
    }

    pub fn apply_file(mut self, file: &TomlConfig) -> Result<Self> {
        file.validate()?;

        if let Some(command) = file.interpreter_command() {
            self.interpreter = command.to_string();
        }
        if let Some(dir) = file.venv_dir() {
            self.venv_dir = dir.to_string();
        }
        if let Some(requirements) = file.requirements() {
            self.requirements = requirements.to_string();
        }
        if let Some(upgrade) = file.upgrade_pip() {
            self.upgrade_pip = upgrade;
        }
        if let Some(entry_point) = file.entry_point() {
            self.entry_point = entry_point.to_string();
        }
        if let Some(dir) = file.data_dir() {
            self.data_dir = dir.to_string();
        }
        if let Some(host) = file.host() {
            self.host = host.to_string();
        }
        if let Some(port) = file.port() {
            self.port = port;
        }
        if let Some(locale) = file.locale() {
            self.locale = locale;
        }
        if let Some(pause) = file.pause_on_exit() {
            self.pause_on_exit = pause;
        }
        if let Some(check) = file.port_check() {
            self.port_check = check;
        }
        if let Some(format) = file.log_format() {
            self.log_format = format;
        }

        Ok(self)
    }

    pub fn access_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(
            &self.project_dir,
            self.platform,
            &self.venv_dir,
            &self.requirements,
            &self.entry_point,
            &self.data_dir,
        )
    }
}

impl Validate for LauncherSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("interpreter.command", &self.interpreter)?;
        validation::validate_path("environment.venv_dir", &self.venv_dir)?;
        validation::validate_path("environment.requirements", &self.requirements)?;
        validation::validate_path("app.entry_point", &self.entry_point)?;
        validation::validate_path("app.data_dir", &self.data_dir)?;
        validation::validate_range("app.port", self.port, 1, u16::MAX)?;
        validation::validate_url("app.url", &self.access_url())?;
        Ok(())
    }
}

/// 找設定檔：明確指定的路徑優先，否則看專案目錄下有沒有 launcher.toml
pub fn resolve_config_path(project_dir: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        }
    }
}

pub fn load_settings(
    project_dir: &Path,
    explicit_config: Option<&Path>,
    platform: Platform,
) -> Result<LauncherSettings> {
    // 子行程以專案目錄為 cwd，之後的路徑都必須是絕對路徑
    let project_dir = std::path::absolute(project_dir)?;
    let mut settings = LauncherSettings::defaults(&project_dir, platform);

    if let Some(path) = resolve_config_path(&project_dir, explicit_config) {
        tracing::debug!("Loading launcher config from {}", path.display());
        let file = TomlConfig::from_file(&path)?;
        settings = settings.apply_file(&file)?;
    }

    settings.validate()?;
    Ok(settings)
}
