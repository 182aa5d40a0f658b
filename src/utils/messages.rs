//! Operator-facing status lines.
//!
//! 每一行都帶狀態圖示；文字依 `Locale` 切換，預設日文。

use std::fmt;
use std::path::Path;

use crate::domain::model::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    pub const ALLOWED: [&'static str; 2] = ["ja", "en"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ja" => Some(Locale::Ja),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Ja => write!(f, "ja"),
            Locale::En => write!(f, "en"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message<'a> {
    Banner,
    CheckingInterpreter { command: &'a str },
    InterpreterFound { path: &'a Path },
    InterpreterMissing { command: &'a str },
    InstallHint { platform: Platform },
    CreatingEnvironment { dir: &'a Path },
    EnvironmentExists { dir: &'a Path },
    Activating { dir: &'a Path },
    UpgradingPip,
    InstallingDependencies { manifest: &'a Path },
    CreatingDataDir { dir: &'a Path },
    DataDirExists { dir: &'a Path },
    PortInUse { port: u16 },
    PortInUseHints { port: u16 },
    Starting,
    OpenBrowser { url: &'a str },
    StopHint,
    ApplicationExited { code: i32 },
    StepFailed { step: &'a str, code: i32 },
    PressEnter,
}

impl Message<'_> {
    pub fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::Ja => self.render_ja(),
            Locale::En => self.render_en(),
        }
    }

    fn render_ja(&self) -> String {
        match self {
            Message::Banner => "🔗 Link Extractor セットアップ".to_string(),
            Message::CheckingInterpreter { command } => {
                format!("🔍 {} を確認しています...", command)
            }
            Message::InterpreterFound { path } => {
                format!("✅ Python が見つかりました: {}", path.display())
            }
            Message::InterpreterMissing { command } => {
                format!("❌ {} がインストールされていません。", command)
            }
            Message::InstallHint { platform } => match platform {
                Platform::Unix => "💡 Python 3 をインストールしてください: https://www.python.org/downloads/\n   macOS: brew install python3 / Ubuntu: sudo apt install python3 python3-venv".to_string(),
                Platform::Windows => "💡 https://www.python.org/downloads/ から Python をインストールしてください\n   インストール時に \"Add Python to PATH\" にチェックを入れてください".to_string(),
            },
            Message::CreatingEnvironment { dir } => {
                format!("📦 仮想環境を作成しています: {}", dir.display())
            }
            Message::EnvironmentExists { dir } => {
                format!("✅ 仮想環境は作成済みです: {}", dir.display())
            }
            Message::Activating { dir } => {
                format!("🔧 仮想環境を有効化しています: {}", dir.display())
            }
            Message::UpgradingPip => "⬆️  pip をアップグレードしています...".to_string(),
            Message::InstallingDependencies { manifest } => {
                format!("📥 依存パッケージをインストールしています: {}", manifest.display())
            }
            Message::CreatingDataDir { dir } => {
                format!("📁 データディレクトリを作成しました: {}", dir.display())
            }
            Message::DataDirExists { dir } => {
                format!("📁 データディレクトリ: {}", dir.display())
            }
            Message::PortInUse { port } => {
                format!("⚠️  ポート {} は既に使用されています。", port)
            }
            Message::PortInUseHints { port } => format!(
                "   解決方法:\n   1. launcher.toml の [app] port で別のポートを指定\n   2. macOSの場合: システム設定 > 一般 > AirDrop & Handoff > AirPlay Receiver をオフ\n   3. 使用中プロセス確認: lsof -i :{}",
                port
            ),
            Message::Starting => "🚀 Link Extractor を起動しています...".to_string(),
            Message::OpenBrowser { url } => {
                format!("🌐 ブラウザで {} を開いてください", url)
            }
            Message::StopHint => "   停止するには Ctrl+C を押してください".to_string(),
            Message::ApplicationExited { code } => {
                format!("👋 アプリケーションが終了しました (終了コード {})", code)
            }
            Message::StepFailed { step, code } => {
                format!("❌ {} に失敗しました (終了コード {})", step, code)
            }
            Message::PressEnter => "Enter キーを押すと終了します...".to_string(),
        }
    }

    fn render_en(&self) -> String {
        match self {
            Message::Banner => "🔗 Link Extractor setup".to_string(),
            Message::CheckingInterpreter { command } => format!("🔍 Checking for {}...", command),
            Message::InterpreterFound { path } => {
                format!("✅ Python found: {}", path.display())
            }
            Message::InterpreterMissing { command } => {
                format!("❌ {} is not installed.", command)
            }
            Message::InstallHint { platform } => match platform {
                Platform::Unix => "💡 Install Python 3: https://www.python.org/downloads/\n   macOS: brew install python3 / Ubuntu: sudo apt install python3 python3-venv".to_string(),
                Platform::Windows => "💡 Install Python from https://www.python.org/downloads/\n   Tick \"Add Python to PATH\" during installation".to_string(),
            },
            Message::CreatingEnvironment { dir } => {
                format!("📦 Creating virtual environment: {}", dir.display())
            }
            Message::EnvironmentExists { dir } => {
                format!("✅ Virtual environment already exists: {}", dir.display())
            }
            Message::Activating { dir } => {
                format!("🔧 Activating virtual environment: {}", dir.display())
            }
            Message::UpgradingPip => "⬆️  Upgrading pip...".to_string(),
            Message::InstallingDependencies { manifest } => {
                format!("📥 Installing dependencies from {}", manifest.display())
            }
            Message::CreatingDataDir { dir } => {
                format!("📁 Created data directory: {}", dir.display())
            }
            Message::DataDirExists { dir } => format!("📁 Data directory: {}", dir.display()),
            Message::PortInUse { port } => format!("⚠️  Port {} is already in use.", port),
            Message::PortInUseHints { port } => format!(
                "   How to fix:\n   1. Pick another port with [app] port in launcher.toml\n   2. On macOS: System Settings > General > AirDrop & Handoff > turn off AirPlay Receiver\n   3. Find the process using it: lsof -i :{}",
                port
            ),
            Message::Starting => "🚀 Starting Link Extractor...".to_string(),
            Message::OpenBrowser { url } => format!("🌐 Open {} in your browser", url),
            Message::StopHint => "   Press Ctrl+C to stop".to_string(),
            Message::ApplicationExited { code } => {
                format!("👋 Application exited (exit code {})", code)
            }
            Message::StepFailed { step, code } => {
                format!("❌ {} failed (exit code {})", step, code)
            }
            Message::PressEnter => "Press Enter to continue...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("ja"), Some(Locale::Ja));
        assert_eq!(Locale::parse(" EN "), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
    }

    #[test]
    fn test_open_browser_message_contains_url() {
        let url = "http://localhost:8080";
        for locale in [Locale::Ja, Locale::En] {
            let line = Message::OpenBrowser { url }.render(locale);
            assert!(line.contains(url));
            assert!(line.starts_with('🌐'));
        }
    }

    #[test]
    fn test_install_hint_points_to_python_org() {
        for platform in [Platform::Unix, Platform::Windows] {
            let hint = Message::InstallHint { platform }.render(Locale::Ja);
            assert!(hint.contains("https://www.python.org/downloads/"));
        }
    }

    #[test]
    fn test_port_hints_mention_port() {
        let hints = Message::PortInUseHints { port: 8080 }.render(Locale::En);
        assert!(hints.contains("lsof -i :8080"));
    }
}
