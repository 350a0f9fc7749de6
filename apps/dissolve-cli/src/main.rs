use clap::{Parser, Subcommand};
use dissolve_grid::{DissolveConfig, GridController, ordering};
use dissolve_input::{InputFrame, Key};
use dissolve_render::{DebugTextRenderer, RenderView, Renderer};
use dissolve_scene::{Scene, SceneEvent};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dissolve-cli", about = "Headless driver for the dissolve grid")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print the center-out tile order with distances
    Order {
        #[arg(long, default_value = "5")]
        width: u32,
        #[arg(long, default_value = "5")]
        height: u32,
        /// Print the edge-in order instead
        #[arg(long)]
        reverse: bool,
    },
    /// Write the default configuration (.yaml, .yml or .json)
    InitConfig { path: PathBuf },
    /// Simulate frames at a fixed rate with scripted key presses
    Run {
        /// Configuration file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Seed for random orderings
        #[arg(long)]
        seed: Option<u64>,
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: u32,
        /// Number of frames to simulate
        #[arg(long, default_value = "300")]
        frames: u64,
        /// Key press as FRAME:KEY, e.g. 0:Digit1 (repeatable)
        #[arg(short, long = "press", value_parser = parse_press)]
        press: Vec<(u64, Key)>,
        /// Print the grid every N frames (0 = only at the end)
        #[arg(long, default_value = "0")]
        every: u64,
    },
}

fn parse_press(s: &str) -> Result<(u64, Key), String> {
    let (frame, key) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:KEY, got {s}"))?;
    let frame = frame
        .parse::<u64>()
        .map_err(|e| format!("bad frame {frame}: {e}"))?;
    let key = key.parse::<Key>().map_err(|e| e.to_string())?;
    Ok((frame, key))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("dissolve-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", dissolve_scene::crate_info());
            println!("input: {}", dissolve_input::crate_info());
            println!("grid: {}", dissolve_grid::crate_info());
            println!("render: {}", dissolve_render::crate_info());
        }
        Commands::Order {
            width,
            height,
            reverse,
        } => {
            let mut sorted = ordering::sorted_by_distance(width, height);
            if reverse {
                sorted.reverse();
            }
            println!(
                "{} order for {width}x{height}:",
                if reverse { "Edge-in" } else { "Center-out" }
            );
            for (i, t) in sorted.iter().enumerate() {
                println!("{i:>4}  {}  d={:.3}", t.coord, t.distance);
            }
        }
        Commands::InitConfig { path } => {
            DissolveConfig::default().save(&path)?;
            println!("Wrote default config to {}", path.display());
        }
        Commands::Run {
            config,
            width,
            height,
            seed,
            fps,
            frames,
            press,
            every,
        } => {
            anyhow::ensure!(fps > 0, "fps must be positive");

            let mut config = match config {
                Some(path) => DissolveConfig::load(&path)?,
                None => DissolveConfig::default(),
            };
            if let Some(w) = width {
                config.width = w;
            }
            if let Some(h) = height {
                config.height = h;
            }
            if seed.is_some() {
                config.seed = seed;
            }

            let mut script: BTreeMap<u64, InputFrame> = BTreeMap::new();
            for (frame, key) in press {
                script.entry(frame).or_default().press(key);
            }

            let mut scene = Scene::new();
            let mut controller = GridController::new(&mut scene, config)?;
            let renderer = DebugTextRenderer::new();
            let view = RenderView::new(controller.root());
            let dt = 1.0 / fps as f32;
            tracing::debug!(fps, frames, presses = script.len(), "starting simulation");

            println!(
                "Simulating {frames} frames at {fps} fps on a {}x{} grid",
                controller.config().width,
                controller.config().height
            );

            let mut material_writes = 0usize;
            for frame in 0..frames {
                let input = script.remove(&frame).unwrap_or_default();
                if let Some(action) = controller.update(&mut scene, &input, dt) {
                    println!("frame {frame}: started {action}");
                }
                material_writes += scene
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, SceneEvent::MaterialFloatSet { .. }))
                    .count();
                if every > 0 && frame % every == 0 {
                    println!("--- frame {frame} ---");
                    print!("{}", renderer.render(&scene, &view));
                }
            }

            println!("--- final ---");
            print!("{}", renderer.render(&scene, &view));
            println!(
                "State: {:?}, epoch: {}, active tasks: {}, material writes: {}",
                controller.state(),
                controller
                    .epoch()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "none".into()),
                controller.active_tasks(),
                material_writes
            );
        }
    }

    Ok(())
}
