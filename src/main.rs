use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get, http};
use anyhow::Context;
use clap::{Parser, Subcommand};

mod api;
mod config;
mod docs;
mod error;
mod model;
mod pipeline;
mod report;
mod routes;
mod utils;

use config::Config;

use crate::docs::ApiDoc;
use crate::report::store::OutputStore;
use crate::utils::dataset_cache::DatasetCache;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[derive(Parser)]
#[command(name = "attendance", version, about = "Biometric attendance reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Reconcile one batch from files and publish the report
    Process {
        /// Binary employee roster exported by the device
        #[arg(short = 'e', long)]
        employee_file: PathBuf,
        /// Tab-separated punch log
        #[arg(short = 'a', long)]
        attendance_file: PathBuf,
        /// Output directory, overrides OUTPUT_DIR
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
    },
}

#[get("/")]
async fn index() -> impl Responder {
    "Attendance reconciliation service. See /swagger-ui/ for the API."
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config),
        Command::Process {
            employee_file,
            attendance_file,
            output_dir,
        } => {
            let store = OutputStore::new(output_dir.unwrap_or_else(|| config.output_dir.clone()));
            let batch = pipeline::run_batch_files(&employee_file, &attendance_file, config.top_n)
                .context("attendance batch rejected")?;
            let artifact = store.publish(&batch).context("failed to publish report")?;

            let overview = &batch.summary.overview;
            println!("Report: {}", artifact.workbook.display());
            println!("Dataset: {}", artifact.dataset.display());
            println!(
                "{} employees, {} records, {} late, attendance rate {:.1}%",
                overview.total_employees,
                overview.total_records,
                overview.late_records,
                overview.attendance_rate * 100.0
            );
            Ok(())
        }
    }
}

fn serve(config: Config) -> anyhow::Result<()> {
    actix_web::rt::System::new().block_on(run_server(config))
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!(addr = %config.server_addr, output = %config.output_dir.display(), "Server starting...");

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("cannot create output directory {}", config.output_dir.display()))?;

    let cache = DatasetCache::new(OutputStore::new(&config.output_dir), config.top_n);
    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .expose_headers(vec![http::header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(cors)
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(cache.clone()))
            .service(index)
            // API routes with per-route rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("cannot bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
