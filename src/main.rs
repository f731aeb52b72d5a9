use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

use site_audit::audit::{AuditConfig, AuditRequest, AuditRunner, Category};
use site_audit::config::{resolve_delay_scale, AuditServiceConfig, CliArgs, Command};
use site_audit::log_capture::{LogLevel, LogSource};
use site_audit::report::{render_report, ConsoleProgress};
use site_audit::server;
use site_audit::settings::{load_settings, PersistentSettings};
use site_audit::state::AuditServiceState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Keep the guard alive so buffered file logs flush on exit.
    let _log_guard = init_tracing(args.log_file.as_deref());

    let settings = match &args.settings {
        Some(path) => load_settings(path),
        None => PersistentSettings::default(),
    };
    let delay_scale = resolve_delay_scale(args.delay_scale, &settings);

    match args.command {
        Command::Serve { port, bind } => {
            let config = AuditServiceConfig::new(port, bind, delay_scale, args.settings.clone())
                .with_delay_scale_override(args.delay_scale);
            serve(config, settings).await
        }
        Command::Run {
            url,
            enhanced,
            device,
            depth,
            location,
            skip,
            json,
        } => {
            let request = if enhanced {
                let mut config = AuditConfig {
                    url,
                    ..settings.default_config()
                };
                if let Some(device) = device {
                    config.device = device;
                }
                if let Some(depth) = depth {
                    config.depth = depth;
                }
                if let Some(location) = location {
                    config.location = location;
                }
                for category in skip {
                    config.audit_types.set(category, false);
                }
                AuditRequest::enhanced(config)
            } else {
                if !skip.is_empty() {
                    anyhow::bail!("--skip requires --enhanced");
                }
                AuditRequest::basic(url)
            };
            run_once(request, delay_scale, json).await
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "site_audit=info,tower_http=info".into());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .map(|n| n.to_owned())
                .unwrap_or_else(|| "site-audit.log".into());
            let appender = tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

async fn serve(config: AuditServiceConfig, settings: PersistentSettings) -> anyhow::Result<()> {
    info!("Starting site-audit v{}", env!("CARGO_PKG_VERSION"));
    info!("Delay scale: {}", config.delay_scale);

    let addr = config.bind_addr();
    let state = Arc::new(AuditServiceState::new(config, settings));

    state
        .logs
        .emit(
            LogSource::Service,
            LogLevel::Info,
            format!("Audit service starting on {}", addr),
        )
        .await;

    let router = server::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Audit service listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    info!("Audit service shutting down");
    Ok(())
}

async fn shutdown_signal(state: Arc<AuditServiceState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
    state
        .logs
        .emit(
            LogSource::Service,
            LogLevel::Info,
            "Shutdown signal received",
        )
        .await;
}

async fn run_once(request: AuditRequest, delay_scale: f64, json: bool) -> anyhow::Result<()> {
    if let Some(config) = request.config() {
        let enabled: Vec<&str> = Category::ALL
            .iter()
            .filter(|c| config.audit_types.is_enabled(**c))
            .map(|c| c.label())
            .collect();
        info!(
            "Enhanced audit: device={}, depth={} ({}), location={}, categories=[{}]",
            config.device,
            config.depth,
            config.depth.page_hint(),
            config.location,
            enabled.join(", ")
        );
    }

    let runner = AuditRunner::new(delay_scale);
    let mut progress = ConsoleProgress::default();
    let result = runner.run(request, &mut progress).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result));
    }
    Ok(())
}
