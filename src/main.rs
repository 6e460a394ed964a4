use clap::Parser;
use mg_dashboard::app::dashboard::DashboardSection;
use mg_dashboard::config::{CliConfig, Command, MlAction};
use mg_dashboard::core::format::format_pkr;
use mg_dashboard::domain::model::TimeFilter;
use mg_dashboard::domain::ports::{AnalyticsApi, ConfigProvider};
use mg_dashboard::utils::error::DashboardError;
use mg_dashboard::utils::{logger, validation::Validate};
use mg_dashboard::{BackendClient, CsvExporter, DashboardExporter, DashboardView, LocalFileSaver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting mg-dashboard CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Command::Sections = config.command {
        for section in DashboardSection::ALL {
            println!("{:<26} {}", section.name(), section.description());
        }
        return Ok(());
    }

    // 驗證配置
    if let Err(e) = config.load_file().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤種類決定退出碼
        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), DashboardError> {
    let client = BackendClient::from_config(config)?;

    match &config.command {
        Command::Export(args) => {
            let request = args.to_request()?;
            let saver = LocalFileSaver::new(config.output_path());
            let exporter =
                DashboardExporter::new(CsvExporter::new(saver)).with_defaults(config.export_options()?);
            let view = DashboardView::new(client, exporter);

            let saved = view.export_section(&request).await?;
            tracing::info!("✅ Export completed: {} file(s)", saved.len());
            println!("✅ Export completed successfully!");
            for location in saved {
                println!("📁 Output saved to: {}", location);
            }
        }
        Command::Overview { filter } => {
            let saver = LocalFileSaver::new(config.output_path());
            let view = DashboardView::new(client, DashboardExporter::new(CsvExporter::new(saver)));
            let snapshot = view.load_overview(TimeFilter::parse(filter)).await;

            println!(
                "📊 {} ({} to {}, {} days)",
                snapshot.range.label,
                snapshot.range.start,
                snapshot.range.end,
                snapshot.range.days()
            );
            match &snapshot.customer_metrics {
                Some(metrics) => println!(
                    "   Revenue {} | Orders {} | Customers {} | AOV {}",
                    format_pkr(metrics.total_revenue),
                    metrics.total_orders,
                    metrics.total_customers,
                    format_pkr(metrics.avg_order_value),
                ),
                None => println!("   Customer metrics unavailable"),
            }
            println!("   Top products: {}", snapshot.top_products.len());
            println!("   Revenue trend points: {}", snapshot.revenue_trend.len());
            println!("   Cities: {} | Provinces: {}", snapshot.geographic.len(), snapshot.provinces.len());
            println!("   RFM segments: {}", snapshot.rfm_segments.len());
        }
        Command::Ml { action } => {
            let status = match action {
                MlAction::Status => client.training_status().await?,
                MlAction::Train => client.train_model().await?,
                MlAction::Precompute => client.precompute_recommendations().await?,
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Variant { user_id } => {
            let variant = client.ab_variant(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&variant)?);
        }
        Command::Sections => {}
    }

    Ok(())
}
