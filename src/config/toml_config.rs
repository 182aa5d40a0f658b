use crate::config::LogFormat;
use crate::utils::error::{LauncherError, Result};
use crate::utils::messages::Locale;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "launcher.toml";

/// `launcher.toml`：每個區段與欄位都是選填
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub interpreter: Option<InterpreterConfig>,
    pub environment: Option<EnvironmentConfig>,
    pub app: Option<AppConfig>,
    pub console: Option<ConsoleConfig>,
    pub preflight: Option<PreflightConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterpreterConfig {
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub venv_dir: Option<String>,
    pub requirements: Option<String>,
    pub upgrade_pip: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub entry_point: Option<String>,
    pub data_dir: Option<String>,
    pub host: Option<String>,
    pub port: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    pub locale: Option<String>,
    pub pause_on_exit: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreflightConfig {
    pub port_check: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            LauncherError::ConfigValidationError {
                field: path.as_ref().display().to_string(),
                message: format!("Cannot read config file: {}", e),
            }
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LauncherError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PORT})；未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LauncherError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn interpreter_command(&self) -> Option<&str> {
        self.interpreter.as_ref()?.command.as_deref()
    }

    pub fn venv_dir(&self) -> Option<&str> {
        self.environment.as_ref()?.venv_dir.as_deref()
    }

    pub fn requirements(&self) -> Option<&str> {
        self.environment.as_ref()?.requirements.as_deref()
    }

    pub fn upgrade_pip(&self) -> Option<bool> {
        self.environment.as_ref()?.upgrade_pip
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.app.as_ref()?.entry_point.as_deref()
    }

    pub fn data_dir(&self) -> Option<&str> {
        self.app.as_ref()?.data_dir.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.app.as_ref()?.host.as_deref()
    }

    /// 只在 validate 之後呼叫；超出範圍的值視為未設定
    pub fn port(&self) -> Option<u16> {
        self.app
            .as_ref()?
            .port
            .and_then(|p| u16::try_from(p).ok())
    }

    pub fn locale(&self) -> Option<Locale> {
        Locale::parse(self.console.as_ref()?.locale.as_deref()?)
    }

    pub fn pause_on_exit(&self) -> Option<bool> {
        self.console.as_ref()?.pause_on_exit
    }

    pub fn port_check(&self) -> Option<bool> {
        self.preflight.as_ref()?.port_check
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        LogFormat::parse(self.logging.as_ref()?.format.as_deref()?)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(command) = self.interpreter_command() {
            validation::validate_non_empty_string("interpreter.command", command)?;
        }

        let paths = [
            ("environment.venv_dir", self.venv_dir()),
            ("environment.requirements", self.requirements()),
            ("app.entry_point", self.entry_point()),
            ("app.data_dir", self.data_dir()),
        ];
        for (field, value) in paths {
            if let Some(path) = value {
                validation::validate_path(field, path)?;
            }
        }

        if let Some(host) = self.host() {
            validation::validate_non_empty_string("app.host", host)?;
        }

        if let Some(port) = self.app.as_ref().and_then(|a| a.port) {
            validation::validate_range("app.port", port, 1, u16::MAX as u32)?;
        }

        if let Some(locale) = self.console.as_ref().and_then(|c| c.locale.as_deref()) {
            let normalized = locale.trim().to_ascii_lowercase();
            validation::validate_one_of("console.locale", &normalized, &Locale::ALLOWED)?;
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            let normalized = format.trim().to_ascii_lowercase();
            validation::validate_one_of("logging.format", &normalized, &LogFormat::ALLOWED)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[interpreter]
command = "python3.12"

[environment]
venv_dir = ".venv"
requirements = "requirements-dev.txt"
upgrade_pip = false

[app]
entry_point = "server.py"
data_dir = "data"
host = "127.0.0.1"
port = 9000

[console]
locale = "en"
pause_on_exit = true

[preflight]
port_check = false

[logging]
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.interpreter_command(), Some("python3.12"));
        assert_eq!(config.venv_dir(), Some(".venv"));
        assert_eq!(config.requirements(), Some("requirements-dev.txt"));
        assert_eq!(config.upgrade_pip(), Some(false));
        assert_eq!(config.entry_point(), Some("server.py"));
        assert_eq!(config.data_dir(), Some("data"));
        assert_eq!(config.host(), Some("127.0.0.1"));
        assert_eq!(config.port(), Some(9000));
        assert_eq!(config.locale(), Some(Locale::En));
        assert_eq!(config.pause_on_exit(), Some(true));
        assert_eq!(config.port_check(), Some(false));
        assert_eq!(config.log_format(), Some(LogFormat::Json));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.port(), None);
        assert_eq!(config.venv_dir(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LAUNCHER_TEST_DATA_DIR", "shared_data");

        let toml_content = r#"
[app]
data_dir = "${LAUNCHER_TEST_DATA_DIR}"
entry_point = "${LAUNCHER_TEST_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), Some("shared_data"));
        assert_eq!(config.entry_point(), Some("${LAUNCHER_TEST_UNSET_VARIABLE}"));

        std::env::remove_var("LAUNCHER_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_port = TomlConfig::from_toml_str("[app]\nport = 70000\n").unwrap();
        assert!(bad_port.validate().is_err());

        let bad_locale = TomlConfig::from_toml_str("[console]\nlocale = \"fr\"\n").unwrap();
        assert!(bad_locale.validate().is_err());

        let empty_command = TomlConfig::from_toml_str("[interpreter]\ncommand = \"  \"\n").unwrap();
        assert!(empty_command.validate().is_err());
    }

    #[test]
    fn test_locale_and_format_are_case_insensitive() {
        let config =
            TomlConfig::from_toml_str("[console]\nlocale = \"EN\"\n[logging]\nformat = \" Json \"\n")
                .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.locale(), Some(Locale::En));
        assert_eq!(config.log_format(), Some(LogFormat::Json));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = TomlConfig::from_toml_str("[app]\nprot = 8080\n");
        assert!(matches!(
            result,
            Err(LauncherError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[app]\nport = 8081\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.port(), Some(8081));
    }
}
