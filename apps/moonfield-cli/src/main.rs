use clap::{Args, Parser, Subcommand};
use moonfield_render::{DebugTextRenderer, Renderer, SummaryRenderer};
use moonfield_runner::{AppContext, SceneConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moonfield-cli", about = "CLI tool for the moonfield scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SceneArgs {
    /// Scene configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the texture files
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Seed for star placement
    #[arg(short, long)]
    seed: Option<u64>,
    /// Logical viewport size
    #[arg(long, default_value = "1280")]
    width: u32,
    #[arg(long, default_value = "720")]
    height: u32,
}

impl SceneArgs {
    fn scene_config(&self) -> anyhow::Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        if let Some(root) = &self.assets {
            config.assets.root = root.clone();
        }
        if self.seed.is_some() {
            config.stars.seed = self.seed;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build the scene and print what one frame would draw
    Inspect {
        #[command(flatten)]
        scene: SceneArgs,
        /// Emit a JSON summary instead of text
        #[arg(long)]
        json: bool,
        /// How long to wait for textures before rendering
        #[arg(long, default_value = "2000")]
        wait_ms: u64,
    },
    /// Run the frame loop headless
    Simulate {
        #[command(flatten)]
        scene: SceneArgs,
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Simulated time between frames
        #[arg(long, default_value = "16")]
        dt_ms: u64,
        /// Rotate a fixed step per frame instead of per elapsed time
        #[arg(long)]
        per_frame: bool,
    },
    /// Decode the configured texture files and report each one
    Assets {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Print the effective configuration as YAML
    Config {
        #[command(flatten)]
        scene: SceneArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("moonfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", moonfield_scene::crate_info());
            println!("input: {}", moonfield_input::crate_info());
            println!("assets: {}", moonfield_assets::crate_info());
            println!("render: {}", moonfield_render::crate_info());
            println!("runner: {}", moonfield_runner::crate_info());
        }
        Commands::Inspect {
            scene,
            json,
            wait_ms,
        } => {
            let mut ctx = AppContext::new(scene.scene_config()?, scene.width, scene.height, 1.0)?;
            if !ctx.wait_for_loads(Duration::from_millis(wait_ms)) {
                tracing::warn!(pending = ctx.pending_loads(), "textures still loading");
            }
            if json {
                let summary = SummaryRenderer.render(ctx.scene(), ctx.camera());
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", DebugTextRenderer::new().render(ctx.scene(), ctx.camera()));
                println!("Star seed: {}", ctx.star_seed());
            }
        }
        Commands::Simulate {
            scene,
            frames,
            dt_ms,
            per_frame,
        } => {
            let mut config = scene.scene_config()?;
            if per_frame {
                config.animation.time_scaled = false;
            }
            let mut ctx = AppContext::new(config, scene.width, scene.height, 1.0)?;
            let dt = Duration::from_millis(dt_ms);
            let mut loads = 0;
            for _ in 0..frames {
                let report = ctx.tick(dt);
                loads += report.loads_applied;
                // Give in-flight decodes a chance to land between frames.
                std::thread::sleep(Duration::from_millis(1).min(dt));
            }
            loads += ctx.apply_completed_loads();

            let torus = ctx
                .scene()
                .get(ctx.torus())
                .map(|obj| obj.transform.rotation)
                .unwrap_or_default();
            let diag = ctx.diagnostics();
            println!("Frames: {}", ctx.frame_count());
            println!(
                "Torus rotation: x={:.4} y={:.4} z={:.4}",
                torus.x, torus.y, torus.z
            );
            let cam = ctx.camera().position;
            println!("Camera: x={:.3} y={:.3} z={:.3}", cam.x, cam.y, cam.z);
            println!("Textures applied: {loads}, pending: {}", ctx.pending_loads());
            println!(
                "Diagnostic reload: loaded={} failed={}",
                diag.loaded, diag.failed
            );
        }
        Commands::Assets { scene } => {
            let config = scene.scene_config()?;
            let mut failures = 0;
            for path in config.assets.files() {
                match moonfield_assets::decode_texture(&path) {
                    Ok(image) => {
                        println!("OK   {} {}x{}", path.display(), image.width, image.height)
                    }
                    Err(err) => {
                        failures += 1;
                        println!("FAIL {err}");
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} texture(s) failed to decode");
            }
        }
        Commands::Config { scene } => {
            let config = scene.scene_config()?;
            config.validate()?;
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
