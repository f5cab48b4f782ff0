use anyhow::Context;
use clap::Parser;
use curriculum_etl::utils::error::{EtlError, ErrorSeverity};
use curriculum_etl::utils::{logger, validation::Validate};
use curriculum_etl::{CliConfig, CurriculumConfig, CurriculumPipeline, EtlEngine, HttpSource, LocalStorage};

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Curriculum ETL failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting curriculum-etl CLI");
    if cli.verbose {
        tracing::debug!("CLI arguments: {:?}", cli);
    }

    let config: CurriculumConfig = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };
    tracing::debug!(
        "Crawling {} programs from {} into {}",
        config.programs.len(),
        config.base_url,
        config.output_path
    );

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = HttpSource::from_config(&config).context("failed to set up the HTTP client")?;
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = CurriculumPipeline::new(storage, source, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Curriculum ETL completed successfully!");
            println!("✅ Curriculum written to: {}", output_path);
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}
