use clap::Parser;
use spotify_history_etl::config::toml_config::MonitoringConfig;
use spotify_history_etl::domain::ports::ConfigProvider;
use spotify_history_etl::utils::{logger, validation::Validate};
use spotify_history_etl::{
    CliConfig, EtlEngine, HistoryPipeline, LoadOutcome, LocalStorage, PostgresSink, RunReport,
    TomlConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; variables may come from the real environment.
    dotenv::dotenv().ok();

    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting spotify-history-etl");

    match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let mut config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };
            if cli.monitor {
                let preview_rows = config.monitoring.as_ref().and_then(|m| m.preview_rows);
                config.monitoring = Some(MonitoringConfig {
                    enabled: true,
                    preview_rows,
                });
            }
            run(config).await
        }
        None => run(cli).await,
    }
}

async fn run<C: ConfigProvider + Validate>(config: C) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let database = config.database().resolve()?;
    let table = config.target_table().to_string();
    let monitor_enabled = config.monitor();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.input_dir());
    let sink = PostgresSink::new(&database, config.target_table(), config.batch_rows());
    let pipeline = HistoryPipeline::new(storage, sink, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => print_report(&report, &table),
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?})",
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_report(report: &RunReport, table: &str) {
    println!(
        "📄 Files: {} matched, {} loaded, {} skipped",
        report.files_matched,
        report.files_loaded,
        report.files_skipped.len()
    );
    for skipped in &report.files_skipped {
        println!("   ⚠️  {}: {}", skipped.path, skipped.reason);
    }

    match &report.outcome {
        LoadOutcome::NoData => println!("No JSON files were loaded."),
        LoadOutcome::Inserted(rows) => println!(
            "✅ Inserted {} of {} rows into {}",
            rows, report.rows_combined, table
        ),
        LoadOutcome::Failed(reason) => {
            println!("❌ Nothing was written to {}: {}", table, reason)
        }
    }
}
