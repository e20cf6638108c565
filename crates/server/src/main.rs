use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tales_core::{
    config_path, load_config, load_directory, validate_config, Assembler, CaptureGenerator,
    FfmpegEncoder, HttpSpeechGenerator, Orchestrator,
};
use tales_server::{api::create_router, render::PageRenderer, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = config_path();
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    let renderer = PageRenderer::from_config(&config.render_server)
        .await
        .context("Failed to load page template")?;

    // Generation back-ends and encoder
    let speech =
        HttpSpeechGenerator::new(config.speech.clone()).context("Failed to create speech client")?;
    let capture =
        CaptureGenerator::new(config.capture.clone()).context("Failed to create capture client")?;
    info!("Speech endpoint: {}", config.speech.endpoint);
    info!("Capture program: {:?}", config.capture.program);
    let assembler = Assembler::new(FfmpegEncoder::new(config.encoder.clone()));

    let (orchestrator, mut reports) = Orchestrator::spawn(
        config.orchestrator.clone(),
        &config.staging,
        Arc::new(speech),
        Arc::new(capture),
        assembler,
        &config.encoder.output_extension,
    );
    let orchestrator = Arc::new(orchestrator);

    // Render server (must be up before the first capture)
    let state = Arc::new(
        AppState::new()
            .with_renderer(renderer)
            .with_orchestrator(Arc::clone(&orchestrator)),
    );
    let app = create_router(state);
    let addr = SocketAddr::new(config.render_server.host, config.render_server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind render server to {}", addr))?;
    info!("Render server listening on {}", addr);

    let (server_stop_tx, server_stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = server_stop_rx.await;
            })
            .await
    });

    // Content
    let trees = load_directory(&config.content.input_dir)
        .await
        .with_context(|| format!("Failed to load content from {:?}", config.content.input_dir))?;
    let expected = trees.len();

    let (input_tx, input_rx) = mpsc::channel(config.orchestrator.input_queue_capacity);
    let runner = tokio::spawn(Arc::clone(&orchestrator).run(input_rx));
    let feeder = tokio::spawn(async move {
        for tree in trees {
            if input_tx.send(tree).await.is_err() {
                break;
            }
        }
    });

    // Collect one report per tree, or stop early on a signal
    let mut placed = 0usize;
    let mut received = 0usize;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    while received < expected {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            report = reports.recv() => match report {
                Some(report) => {
                    received += 1;
                    match &report.artifact {
                        Some(path) => {
                            placed += 1;
                            info!(
                                root = %report.root_id,
                                path = %path.display(),
                                omitted = report.failed.len(),
                                elapsed_ms = report.duration().num_milliseconds(),
                                "Tale finished"
                            );
                        }
                        None => warn!(
                            root = %report.root_id,
                            failed = report.failed.len(),
                            "Tale produced no output"
                        ),
                    }
                }
                None => break,
            },
        }
    }

    feeder.abort();
    orchestrator.shutdown().await;
    if let Err(e) = runner.await {
        error!("Input runner panicked: {}", e);
    }

    let _ = server_stop_tx.send(());
    server
        .await
        .context("Render server task panicked")?
        .context("Render server error")?;

    info!(
        placed,
        failed = received - placed,
        skipped = expected - received,
        "Shutting down"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
