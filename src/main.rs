use clap::Parser;
use std::sync::Arc;
use uni_enroll::utils::error::ErrorSeverity;
use uni_enroll::utils::{logger, validation::Validate};
use uni_enroll::{web, AppConfig, Cli, Command, EnrollmentService, RosterFile, SqliteStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 載入配置 (未指定檔案時使用預設值)
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => Ok(AppConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(&config.logging, cli.verbose);

    tracing::info!("Starting uni-enroll");
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, config).await {
        tracing::error!(
            "❌ uni-enroll failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(command: Command, mut config: AppConfig) -> uni_enroll::Result<()> {
    match command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                tracing::info!("🔧 Bind address overridden to: {}", bind);
                config.server.bind = bind;
            }
            let addr = config.bind_addr()?;

            let store = SqliteStore::open(&config.database).await?;
            let service = Arc::new(EnrollmentService::new(store));
            web::serve(service, addr).await
        }
        Command::Migrate => {
            SqliteStore::open(&config.database).await?;
            println!("✅ Database {} is ready", config.database.url);
            Ok(())
        }
        Command::Seed { roster } => {
            tracing::info!("📁 Loading roster from: {}", roster);
            let roster = RosterFile::from_file(&roster)?;
            roster.validate()?;

            let store = SqliteStore::open(&config.database).await?;
            let summary = roster.load_into(&store).await?;

            println!(
                "✅ Seeded {} courses, {} students, {} lecturers",
                summary.courses, summary.students, summary.lecturers
            );
            Ok(())
        }
    }
}
