use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use care_leads::api::{AppState, api_routes};
use care_leads::chat::ChatProxy;
use care_leads::config::{AppConfig, EmailTransport};
use care_leads::email::{EmailDispatcher, HttpMailer, Mailer, Recipients, Sender, SmtpMailer};
use care_leads::leads::RegistrationPipeline;
use care_leads::report::{DailyReporter, spawn_report_scheduler};
use care_leads::store::{LibSqlBackend, RegistrationStore};

/// Set up stderr logging plus an optional daily-rolling log file.
/// The returned guard must live as long as the process.
fn init_tracing(log_dir: Option<&str>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "care-leads.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let _log_guard = init_tracing(config.log_dir.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Care Leads starting");

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn RegistrationStore> = Arc::new(
        LibSqlBackend::new_local(Path::new(&config.db_path))
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path))?,
    );

    // ── Email ────────────────────────────────────────────────────────────
    let timeout = config.outbound_timeout;
    let mailer: Arc<dyn Mailer> = match config.email.transport {
        EmailTransport::Http => {
            if config.email.api_key.expose_secret().is_empty() {
                tracing::warn!("EMAIL_API_KEY not set; outgoing email will fail");
            }
            Arc::new(HttpMailer::new(
                config.email.api_url.clone(),
                config.email.api_key.clone(),
                Sender {
                    name: config.email.from_name.clone(),
                    address: config.email.from_address.clone(),
                },
                timeout,
            )?)
        }
        EmailTransport::Smtp => Arc::new(SmtpMailer::new(&config.email, timeout)),
    };
    tracing::info!(
        transport = mailer.name(),
        notify = config.email.notify_recipients.len(),
        report = config.email.report_recipients.len(),
        "Email dispatcher ready"
    );
    let dispatcher = Arc::new(EmailDispatcher::new(
        mailer,
        Recipients::from(&config.email),
    ));

    // ── Chat ─────────────────────────────────────────────────────────────
    if config.chat.api_key.expose_secret().is_empty() {
        tracing::warn!("CHAT_API_KEY not set; chat will always return the fallback reply");
    }
    let chat = Arc::new(ChatProxy::new(&config.chat, timeout)?);

    // ── Pipeline + reports ───────────────────────────────────────────────
    let pipeline = Arc::new(RegistrationPipeline::new(
        Arc::clone(&store),
        Arc::clone(&dispatcher),
        timeout,
    ));
    let reporter = Arc::new(DailyReporter::new(
        Arc::clone(&store),
        Arc::clone(&dispatcher),
        timeout,
    ));

    if config.report.enabled {
        let _report_handle = spawn_report_scheduler(Arc::clone(&reporter), config.report.cron.clone())?;
        tracing::info!(cron = %config.report.cron, "Daily report scheduler started");
    } else {
        tracing::info!("Daily report scheduler disabled");
    }

    // ── HTTP server ──────────────────────────────────────────────────────
    if config.report.trigger_token.expose_secret().is_empty() {
        tracing::info!("REPORT_TRIGGER_TOKEN not set; HTTP report trigger disabled");
    }
    let app = api_routes(AppState {
        pipeline,
        chat,
        reporter,
        report_token: config.report.trigger_token.clone(),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
