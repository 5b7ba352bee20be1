use clap::Parser;
use stat_feeds::app::server;
use stat_feeds::config::Command;
use stat_feeds::core::Query;
use stat_feeds::utils::error::{ErrorSeverity, EtlError};
use stat_feeds::utils::{logger, validation::Validate};
use stat_feeds::{AppContext, CliConfig, HandlerSet, SourcesConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting stat-feeds");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let handlers = match build_handlers(&cli) {
        Ok(handlers) => handlers,
        Err(e) => exit_with(&e),
    };

    match cli.command {
        Command::Serve { bind } => {
            server::serve(bind, handlers).await?;
        }
        Command::Fetch {
            endpoint,
            base,
            currencies,
        } => {
            let mut query = Query::new();
            if let Some(base) = base {
                query.insert("base".to_string(), base);
            }
            if let Some(currencies) = currencies {
                query.insert("currencies".to_string(), currencies);
            }

            let response = handlers.get(endpoint).handle(&query).await;

            println!("HTTP {}", response.status);
            if let Some(cache_control) = &response.cache_control {
                println!("Cache-Control: {}", cache_control);
            }
            let pretty = serde_json::from_str::<serde_json::Value>(&response.body)
                .and_then(|v| serde_json::to_string_pretty(&v))
                .unwrap_or_else(|_| response.body.clone());
            println!("{}", pretty);

            if !response.is_success() {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

fn build_handlers(cli: &CliConfig) -> stat_feeds::Result<HandlerSet> {
    let sources = SourcesConfig::load(cli.config.as_deref())?;
    sources.validate()?;
    HandlerSet::new(AppContext::new(sources)?)
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
