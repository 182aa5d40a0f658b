use clap::Parser;
use link_extractor_launcher::domain::model::Platform;
use link_extractor_launcher::utils::logger;
use link_extractor_launcher::{
    load_settings, CliArgs, Launcher, StdConsole, SystemRunner, TcpPortProbe,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let platform = Platform::current();

    // 設定檔要先讀，日誌格式由它決定
    let settings = match load_settings(&args.project_dir, args.config.as_deref(), platform) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    logger::init_cli_logger(args.verbose, settings.log_format);
    tracing::debug!("Launcher settings: {:?}", settings);

    let launcher = Launcher::new(
        settings,
        SystemRunner::new(),
        StdConsole::new(),
        TcpPortProbe::new(),
    );

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be executed");
        for line in launcher.describe_plan() {
            println!("{}", line);
        }
        return;
    }

    match launcher.run().await {
        Ok(report) => {
            tracing::info!(
                "Launcher finished: steps={:?}, venv_created={}, data_dir_created={}",
                report.steps,
                report.environment_created,
                report.data_dir_created
            );
            std::process::exit(report.exit_code);
        }
        Err(e) => {
            tracing::error!(
                "❌ Launch failed: {} (Category: {:?})",
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
