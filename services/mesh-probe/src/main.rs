//! Mesh probe.
//!
//! Builds a grid, runs it through the tessellator worker pool and prints
//! mesh statistics as JSON. Useful for sizing worker threads against real
//! model grids.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use field_common::Grid;
use futures::future::try_join_all;
use projection::LambertConformal;
use serde::Serialize;
use tessellator::{TessellationRequest, TessellatorConfig, TessellatorWorker};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GridPreset {
    /// Regular lat/lon grid over `--bbox`.
    Regular,
    /// HRRR CONUS Lambert conformal grid, thinned by `--stride`.
    Hrrr,
}

#[derive(Parser, Debug)]
#[command(name = "mesh-probe")]
#[command(about = "Tessellate a grid and report mesh statistics")]
struct Args {
    /// Grid to tessellate
    #[arg(long, value_enum, default_value = "regular", env = "PROBE_GRID")]
    grid: GridPreset,

    /// Nodes along i for regular grids
    #[arg(long, default_value = "361", env = "PROBE_NI")]
    ni: usize,

    /// Nodes along j for regular grids
    #[arg(long, default_value = "181", env = "PROBE_NJ")]
    nj: usize,

    /// Bounding box for regular grids: min_lon,min_lat,max_lon,max_lat
    #[arg(long, default_value = "-180,-85,180,85", allow_hyphen_values = true)]
    bbox: String,

    /// Keep every n-th node of the HRRR grid
    #[arg(long, default_value = "1")]
    stride: usize,

    /// Concurrent requests to submit
    #[arg(long, default_value = "1")]
    repeat: usize,

    /// Worker threads (overrides TESSELLATOR_THREADS)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Serialize)]
struct MeshReport {
    grid: String,
    ni: usize,
    nj: usize,
    requests: usize,
    worker_threads: usize,
    vertex_count: usize,
    mesh_bytes: usize,
    min_cell_area: f32,
    max_cell_area: f32,
    total_cell_area: f64,
    elapsed_ms: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = TessellatorConfig::from_env();
    if let Some(threads) = args.threads {
        config.worker_threads = threads;
    }

    let grid = build_grid(&args)?;
    info!(
        grid = ?args.grid,
        ni = grid.ni(),
        nj = grid.nj(),
        threads = config.worker_threads,
        "Starting mesh probe"
    );

    let (handle, worker) = TessellatorWorker::spawn(&config)?;

    let start = Instant::now();
    let requests = (0..args.repeat.max(1)).map(|_| {
        let handle = handle.clone();
        let request = TessellationRequest::for_grid(&grid);
        async move { handle.tessellate(request).await }
    });
    let meshes = try_join_all(requests)
        .await
        .context("tessellation failed")?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mesh = meshes.first().context("no mesh returned")?;

    let (cells_i, cells_j) = (grid.ni() - 1, grid.nj().saturating_sub(1));
    let areas: Vec<f32> = (0..cells_i)
        .flat_map(|i| (0..cells_j).filter_map(move |j| mesh.cell_area(i, j)))
        .collect();
    let min_cell_area = areas.iter().copied().fold(f32::INFINITY, f32::min);
    let max_cell_area = areas.iter().copied().fold(0.0f32, f32::max);

    let report = MeshReport {
        grid: format!("{:?}", args.grid).to_lowercase(),
        ni: grid.ni(),
        nj: grid.nj(),
        requests: meshes.len(),
        worker_threads: worker.thread_count(),
        vertex_count: mesh.vertex_count(),
        mesh_bytes: mesh.byte_size(),
        min_cell_area: if min_cell_area.is_finite() { min_cell_area } else { 0.0 },
        max_cell_area,
        total_cell_area: areas.iter().map(|a| f64::from(*a)).sum(),
        elapsed_ms,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    drop(handle);
    tokio::task::spawn_blocking(move || worker.join()).await?;
    info!("Mesh probe complete");

    Ok(())
}

fn build_grid(args: &Args) -> Result<Grid> {
    let grid = match args.grid {
        GridPreset::Regular => {
            let (min_lon, min_lat, max_lon, max_lat) = parse_bbox(&args.bbox)?;
            Grid::plate_carree(args.ni, args.nj, min_lon, min_lat, max_lon, max_lat)?
        }
        GridPreset::Hrrr => {
            if args.stride == 0 {
                bail!("stride must be > 0");
            }
            Grid::lambert_conformal(&LambertConformal::hrrr().thinned(args.stride))?
        }
    };
    Ok(grid)
}

fn parse_bbox(s: &str) -> Result<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid bbox '{}'", s))?;

    match parts.as_slice() {
        [min_lon, min_lat, max_lon, max_lat] => Ok((*min_lon, *min_lat, *max_lon, *max_lat)),
        _ => bail!("bbox needs 4 values, got {}", parts.len()),
    }
}
