use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use stitchgrid::api::ApiDoc;
use stitchgrid::models::{AppConfig, ParamsPatch, SessionId};
use stitchgrid::server;
use stitchgrid::services::Session;

#[derive(Parser)]
#[command(name = "stitchgrid")]
#[command(about = "Stitchgrid - turn photos into knitting and crochet charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Render a chart from an image file directly to a PNG file
    Render {
        /// Source image (PNG, JPEG, GIF, BMP or WebP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Chart width in stitches
        #[arg(short, long)]
        width: Option<u32>,

        /// Maximum number of colors
        #[arg(short, long)]
        colors: Option<u32>,

        /// Merge similar colors after generation (0-100)
        #[arg(short, long)]
        simplify: Option<u8>,

        /// Stitches per reference length
        #[arg(long)]
        gauge_stitches: Option<f32>,

        /// Rows per reference length
        #[arg(long)]
        gauge_rows: Option<f32>,

        /// Leave out grid lines and axis numbers
        #[arg(long)]
        no_grid: bool,

        /// Scale the output image
        #[arg(short, long)]
        zoom: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            input,
            output,
            width,
            colors,
            simplify,
            gauge_stitches,
            gauge_rows,
            no_grid,
            zoom,
        }) => run_render_command(
            &input,
            &output,
            ParamsPatch {
                grid_width_cells: width,
                max_colors: colors,
                gauge_stitches,
                gauge_rows,
                zoom,
                show_grid: no_grid.then_some(false),
                ..Default::default()
            },
            simplify,
        ),
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Render a chart directly to a PNG file (no server needed)
fn run_render_command(
    input: &PathBuf,
    output: &PathBuf,
    patch: ParamsPatch,
    simplify: Option<u8>,
) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stitchgrid=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::load();
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut session = Session::new(
        SessionId::generate(),
        config.generation.clone(),
        config.display.clone(),
    );
    session.apply_params(&patch);
    session.load_image(&bytes)?;
    let summary = session.generate()?;

    if let Some(intensity) = simplify {
        let outcome = session.editor().simplify(intensity.min(100))?;
        tracing::debug!(intensity, changed = outcome.is_changed(), "Simplified palette");
    }
    let colors = session.palette_report().len();

    let png_bytes = session.render_png()?;
    std::fs::write(output, &png_bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Rendered {} ({}x{} stitches, {} colors, {} bytes)",
        output.display(),
        summary.width,
        summary.height,
        colors,
        png_bytes.len()
    );

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let data_dir = std::env::var("DATA_DIR").ok();

    // Header
    println!("Stitchgrid v{VERSION}");
    println!("Photo to knitting and crochet chart converter\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  DATA_DIR    = {}",
        data_dir.as_deref().unwrap_or("(not set, sessions kept in memory)")
    );

    if let Some(path) = config_file {
        let exists = PathBuf::from(&path).exists();
        println!(
            "\nConfig:  {path}{}",
            if exists { "" } else { " (file not found)" }
        );
    }

    // Commands section
    println!("\nCommands:");
    println!("  stitchgrid serve    Start the HTTP server");
    println!("  stitchgrid render   Render a chart from an image to a PNG file");
    println!("\nRun 'stitchgrid --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stitchgrid=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load();
    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        data_dir = ?config.data_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "memory".to_string()),
        max_colors = config.generation.max_colors,
        grid_width = config.display.grid_width_cells,
        "Configuration loaded"
    );

    // Create application state using shared server module
    let state = server::create_app_state(config).await?;

    // Build router: start with shared API routes, add production-only routes
    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Stitchgrid server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
