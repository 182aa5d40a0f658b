use anyhow::Result;
use async_trait::async_trait;
use link_extractor_launcher::core::{CommandRunner, Console, Invocation, Platform, PortProbe, Step};
use link_extractor_launcher::{Launcher, LauncherError, LauncherSettings};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Status(String),
    Error(String),
    Run(Invocation),
    Pause,
}

type EventLog = Arc<Mutex<Vec<Event>>>;

struct FakeRunner {
    events: EventLog,
    interpreter: Option<PathBuf>,
    exit_codes: HashMap<Step, i32>,
}

impl FakeRunner {
    fn new(events: &EventLog) -> Self {
        Self {
            events: events.clone(),
            interpreter: Some(PathBuf::from("/usr/bin/python3")),
            exit_codes: HashMap::new(),
        }
    }

    fn without_interpreter(mut self) -> Self {
        self.interpreter = None;
        self
    }

    fn exiting(mut self, step: Step, code: i32) -> Self {
        self.exit_codes.insert(step, code);
        self
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    fn locate(&self, _program: &str) -> Option<PathBuf> {
        self.interpreter.clone()
    }

    async fn run(&self, invocation: &Invocation) -> link_extractor_launcher::Result<i32> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Run(invocation.clone()));

        let code = self.exit_codes.get(&invocation.step).copied().unwrap_or(0);
        // `python -m venv <dir>` leaves the directory behind
        if invocation.step == Step::CreateEnvironment && code == 0 {
            let dir = invocation.cwd.join(invocation.args.last().unwrap());
            std::fs::create_dir_all(dir)?;
        }
        Ok(code)
    }
}

struct FakeConsole {
    events: EventLog,
}

impl Console for FakeConsole {
    fn status(&self, line: &str) {
        self.events.lock().unwrap().push(Event::Status(line.to_string()));
    }

    fn error(&self, line: &str) {
        self.events.lock().unwrap().push(Event::Error(line.to_string()));
    }

    fn pause(&self, _prompt: &str) {
        self.events.lock().unwrap().push(Event::Pause);
    }
}

struct FakeProbe {
    busy: bool,
}

impl PortProbe for FakeProbe {
    fn is_in_use(&self, _port: u16) -> bool {
        self.busy
    }
}

fn launcher(
    project: &Path,
    platform: Platform,
    runner: FakeRunner,
    events: &EventLog,
) -> Launcher<FakeRunner, FakeConsole, FakeProbe> {
    launcher_with(
        LauncherSettings::defaults(project, platform),
        runner,
        events,
        false,
    )
}

fn launcher_with(
    settings: LauncherSettings,
    runner: FakeRunner,
    events: &EventLog,
    port_busy: bool,
) -> Launcher<FakeRunner, FakeConsole, FakeProbe> {
    Launcher::with_inherited_path(
        settings,
        Some(OsString::from("/usr/bin")),
        runner,
        FakeConsole {
            events: events.clone(),
        },
        FakeProbe { busy: port_busy },
    )
}

fn runs(events: &EventLog) -> Vec<Invocation> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            Event::Run(inv) => Some(inv.clone()),
            _ => None,
        })
        .collect()
}

fn run_steps(events: &EventLog) -> Vec<Step> {
    runs(events).into_iter().map(|inv| inv.step).collect()
}

#[tokio::test]
async fn test_first_run_prepares_environment_and_launches_last() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let runner = FakeRunner::new(&events);

    let report = launcher(project.path(), Platform::Unix, runner, &events)
        .run()
        .await?;

    assert_eq!(
        run_steps(&events),
        vec![
            Step::CreateEnvironment,
            Step::UpgradePackageManager,
            Step::InstallDependencies,
            Step::LaunchApplication,
        ]
    );
    assert_eq!(report.last_step(), Some(Step::LaunchApplication));
    assert!(report.environment_created);
    assert!(report.data_dir_created);
    assert_eq!(report.exit_code, 0);
    assert!(project.path().join("venv").is_dir());
    assert!(project.path().join("link_extractor_data").is_dir());

    // nothing but status output after the hand-off on the POSIX variant
    let log = events.lock().unwrap();
    let launch_index = log
        .iter()
        .rposition(|e| matches!(e, Event::Run(inv) if inv.step == Step::LaunchApplication))
        .unwrap();
    assert!(log[launch_index + 1..]
        .iter()
        .all(|e| matches!(e, Event::Status(_))));

    Ok(())
}

#[tokio::test]
async fn test_second_run_reuses_environment() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();

    launcher(project.path(), Platform::Unix, FakeRunner::new(&events), &events)
        .run()
        .await?;
    events.lock().unwrap().clear();

    let report = launcher(project.path(), Platform::Unix, FakeRunner::new(&events), &events)
        .run()
        .await?;

    assert!(!report.environment_created);
    assert!(!report.data_dir_created);
    assert!(!run_steps(&events).contains(&Step::CreateEnvironment));
    assert_eq!(
        run_steps(&events),
        vec![
            Step::UpgradePackageManager,
            Step::InstallDependencies,
            Step::LaunchApplication,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_interpreter_exits_before_any_step() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let runner = FakeRunner::new(&events).without_interpreter();

    let err = launcher(project.path(), Platform::Unix, runner, &events)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::InterpreterNotFound { ref command } if command == "python3"));
    assert_eq!(err.exit_code(), 1);
    assert!(runs(&events).is_empty());
    assert!(!project.path().join("venv").exists());
    assert!(!project.path().join("link_extractor_data").exists());

    let log = events.lock().unwrap();
    assert!(log
        .iter()
        .any(|e| matches!(e, Event::Error(line) if line.contains("python3"))));
    assert!(log
        .iter()
        .any(|e| matches!(e, Event::Error(line) if line.contains("https://www.python.org/downloads/"))));
    assert!(!log.contains(&Event::Pause));
    Ok(())
}

#[tokio::test]
async fn test_dependency_install_is_quiet_and_reads_requirements_txt() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();

    launcher(project.path(), Platform::Unix, FakeRunner::new(&events), &events)
        .run()
        .await?;

    let install = runs(&events)
        .into_iter()
        .find(|inv| inv.step == Step::InstallDependencies)
        .unwrap();

    assert!(install.has_arg("-q"));
    let r_index = install.args.iter().position(|a| a == "-r").unwrap();
    assert_eq!(install.args[r_index + 1], OsString::from("requirements.txt"));
    assert_eq!(install.program, project.path().join("venv").join("bin").join("python"));
    assert_eq!(
        install.env_value("VIRTUAL_ENV"),
        Some(&project.path().join("venv").into_os_string())
    );

    let upgrade = runs(&events)
        .into_iter()
        .find(|inv| inv.step == Step::UpgradePackageManager)
        .unwrap();
    assert!(upgrade.has_arg("-q"));
    assert!(upgrade.has_arg("--upgrade"));
    Ok(())
}

#[tokio::test]
async fn test_failed_step_stops_the_flow() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let runner = FakeRunner::new(&events).exiting(Step::UpgradePackageManager, 2);

    let err = launcher(project.path(), Platform::Unix, runner, &events)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert_eq!(
        run_steps(&events),
        vec![Step::CreateEnvironment, Step::UpgradePackageManager]
    );
    assert!(!project.path().join("link_extractor_data").exists());
    Ok(())
}

#[tokio::test]
async fn test_application_exit_code_is_reported() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let runner = FakeRunner::new(&events).exiting(Step::LaunchApplication, 5);

    let report = launcher(project.path(), Platform::Unix, runner, &events)
        .run()
        .await?;

    assert_eq!(report.exit_code, 5);
    Ok(())
}

#[tokio::test]
async fn test_windows_variant_pauses_after_application() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();

    let report = launcher(project.path(), Platform::Windows, FakeRunner::new(&events), &events)
        .run()
        .await?;

    assert_eq!(
        &report.steps[report.steps.len() - 2..],
        &[Step::LaunchApplication, Step::PauseTerminal]
    );

    {
        let log = events.lock().unwrap();
        assert_eq!(log.last(), Some(&Event::Pause));
        let last_run = log
            .iter()
            .rev()
            .find_map(|e| match e {
                Event::Run(inv) => Some(inv.step),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_run, Step::LaunchApplication);
    }

    let create = runs(&events)
        .into_iter()
        .find(|inv| inv.step == Step::CreateEnvironment)
        .unwrap();
    assert_eq!(create.program, PathBuf::from("/usr/bin/python3"));
    let launch = runs(&events).pop().unwrap();
    assert_eq!(
        launch.program,
        project.path().join("venv").join("Scripts").join("python.exe")
    );
    Ok(())
}

#[tokio::test]
async fn test_windows_variant_pauses_when_interpreter_is_missing() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let runner = FakeRunner::new(&events).without_interpreter();

    let err = launcher(project.path(), Platform::Windows, runner, &events)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::InterpreterNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(runs(&events).is_empty());

    let log = events.lock().unwrap();
    assert!(log
        .iter()
        .any(|e| matches!(e, Event::Error(line) if line.contains("python"))));
    assert_eq!(log.last(), Some(&Event::Pause));
    Ok(())
}

#[tokio::test]
async fn test_windows_variant_pauses_after_failed_step() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let runner = FakeRunner::new(&events).exiting(Step::UpgradePackageManager, 2);

    let err = launcher(project.path(), Platform::Windows, runner, &events)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::CommandFailed { code: 2, .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(
        run_steps(&events),
        vec![Step::CreateEnvironment, Step::UpgradePackageManager]
    );
    assert_eq!(events.lock().unwrap().last(), Some(&Event::Pause));
    Ok(())
}

#[tokio::test]
async fn test_pause_on_exit_applies_on_unix() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let mut settings = LauncherSettings::defaults(project.path(), Platform::Unix);
    settings.pause_on_exit = true;

    let report = launcher_with(settings, FakeRunner::new(&events), &events, false)
        .run()
        .await?;

    assert_eq!(report.last_step(), Some(Step::PauseTerminal));
    assert_eq!(events.lock().unwrap().last(), Some(&Event::Pause));
    Ok(())
}

#[tokio::test]
async fn test_url_is_printed_before_launch() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();

    launcher(project.path(), Platform::Unix, FakeRunner::new(&events), &events)
        .run()
        .await?;

    let log = events.lock().unwrap();
    let url_index = log
        .iter()
        .position(|e| matches!(e, Event::Status(line) if line.contains("http://localhost:8080")))
        .unwrap();
    let launch_index = log
        .iter()
        .position(|e| matches!(e, Event::Run(inv) if inv.step == Step::LaunchApplication))
        .unwrap();
    assert!(url_index < launch_index);

    if let Event::Run(launch) = &log[launch_index] {
        assert!(launch.foreground);
        assert_eq!(launch.args, vec![OsString::from("app.py")]);
        assert_eq!(launch.env_value("PORT"), Some(&OsString::from("8080")));
    }
    Ok(())
}

#[tokio::test]
async fn test_existing_data_dir_is_kept() -> Result<()> {
    let project = TempDir::new()?;
    let data_dir = project.path().join("link_extractor_data");
    std::fs::create_dir_all(&data_dir)?;
    std::fs::write(data_dir.join("history.json"), "[]")?;

    let events = EventLog::default();
    let report = launcher(project.path(), Platform::Unix, FakeRunner::new(&events), &events)
        .run()
        .await?;

    assert!(!report.data_dir_created);
    assert_eq!(std::fs::read_to_string(data_dir.join("history.json"))?, "[]");
    Ok(())
}

#[tokio::test]
async fn test_busy_port_warns_but_still_launches() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let settings = LauncherSettings::defaults(project.path(), Platform::Unix);

    let report = launcher_with(settings, FakeRunner::new(&events), &events, true)
        .run()
        .await?;

    assert!(report.port_in_use);
    assert_eq!(report.last_step(), Some(Step::LaunchApplication));
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, Event::Error(line) if line.contains("lsof -i :8080"))));
    Ok(())
}

#[tokio::test]
async fn test_port_check_can_be_disabled() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let mut settings = LauncherSettings::defaults(project.path(), Platform::Unix);
    settings.port_check = false;

    let report = launcher_with(settings, FakeRunner::new(&events), &events, true)
        .run()
        .await?;

    assert!(!report.port_in_use);
    Ok(())
}

#[tokio::test]
async fn test_skipping_pip_upgrade() -> Result<()> {
    let project = TempDir::new()?;
    let events = EventLog::default();
    let mut settings = LauncherSettings::defaults(project.path(), Platform::Unix);
    settings.upgrade_pip = false;

    launcher_with(settings, FakeRunner::new(&events), &events, false)
        .run()
        .await?;

    assert!(!run_steps(&events).contains(&Step::UpgradePackageManager));
    Ok(())
}

#[test]
fn test_dry_run_touches_nothing() {
    let project = TempDir::new().unwrap();
    let events = EventLog::default();
    let runner = FakeRunner::new(&events).without_interpreter();

    let lines = launcher(project.path(), Platform::Unix, runner, &events).describe_plan();

    assert!(lines.iter().any(|l| l.contains("not found on PATH")));
    assert!(lines.iter().any(|l| l.contains("-m venv venv")));
    assert!(events.lock().unwrap().is_empty());
    assert!(!project.path().join("venv").exists());
    assert!(!project.path().join("link_extractor_data").exists());
}
