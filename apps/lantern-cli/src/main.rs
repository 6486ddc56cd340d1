use anyhow::Context;
use clap::{Parser, Subcommand};
use lantern_assets::import_gltf;
use lantern_kernel::{FrameDriver, SceneConfig};
use lantern_render::DebugTextRenderer;
use lantern_tools::{FrameStats, ModelSummary, SceneInspector};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lantern-cli", about = "Headless tools for the lantern viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version
    Info,
    /// Run the frame driver without a window and print the final scene
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Scene config file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Model to drop into the scene, overriding the config
        #[arg(short, long)]
        asset: Option<PathBuf>,
        /// Print the scene every N frames (0 prints only the last frame)
        #[arg(long, default_value = "0")]
        print_every: u64,
        /// Seconds to wait for the asset before simulating
        #[arg(long, default_value = "30")]
        load_timeout: u64,
    },
    /// Import a glTF/GLB file and print what it contains
    Inspect {
        /// Path to the model
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lantern-cli v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Simulate {
            frames,
            dt,
            config,
            asset,
            print_every,
            load_timeout,
        } => {
            let mut scene_config = match config {
                Some(path) => SceneConfig::load(&path)?,
                None => SceneConfig::default(),
            };
            if asset.is_some() {
                scene_config.asset_path = asset;
            }
            simulate(
                scene_config,
                frames,
                dt,
                print_every,
                Duration::from_secs(load_timeout),
            )?;
        }
        Commands::Inspect { path } => {
            let model =
                import_gltf(&path).with_context(|| format!("importing {}", path.display()))?;
            println!("{}", ModelSummary::of(&model));
            for mesh in &model.meshes {
                println!(
                    "  - {} vertices={} triangles={} color={:?}",
                    mesh.name,
                    mesh.positions.len(),
                    mesh.triangle_count(),
                    mesh.base_color
                );
            }
        }
    }

    Ok(())
}

fn simulate(
    config: SceneConfig,
    frames: u64,
    dt: f32,
    print_every: u64,
    load_timeout: Duration,
) -> anyhow::Result<()> {
    let mut driver = FrameDriver::new(config);
    let mut renderer = DebugTextRenderer::new();
    driver.start()?;

    // Zero-length frames let the load land before any time passes.
    let deadline = Instant::now() + load_timeout;
    while driver.session().is_some_and(|s| s.pending_loads() > 0) {
        if Instant::now() >= deadline {
            tracing::warn!("asset still loading after {load_timeout:?}; simulating without it");
            break;
        }
        driver.frame_with_delta(0.0, &mut renderer)?;
        std::thread::sleep(Duration::from_millis(5));
    }

    let mut stats = FrameStats::new();
    let mut last = String::new();
    for i in 1..=frames {
        let started = Instant::now();
        last = driver.frame_with_delta(dt, &mut renderer)?;
        stats.record(started.elapsed().as_secs_f32());
        if print_every > 0 && i % print_every == 0 {
            print!("{last}");
        }
    }
    if print_every == 0 {
        print!("{last}");
    }

    let session = driver.session().context("driver stopped running")?;
    println!("{}", SceneInspector::summary(session));
    for object in SceneInspector::list_objects(session) {
        println!("  {object}");
    }
    println!("Step cost: {stats}");
    Ok(())
}
