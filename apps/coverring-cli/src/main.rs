use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use coverring_assets::CoverCatalog;
use coverring_input::{Action, KeyBindings};
use coverring_kernel::{PageScope, RowAnimator, RowBounds, SceneBuilder, SceneConfig};
use coverring_render::{DebugTextRenderer, HeadCamera, Renderer};
use coverring_tools::SceneInspector;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coverring-cli", about = "Headless tools for the cover ring")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    scene: SceneArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Scene configuration: a YAML file plus command-line overrides.
#[derive(Args)]
struct SceneArgs {
    /// YAML scene configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the total number of covers
    #[arg(long, global = true)]
    total: Option<usize>,

    /// Override the number of covers per row
    #[arg(long, global = true)]
    per_row: Option<usize>,

    /// Page only the row under the cursor instead of the whole ring
    #[arg(long, global = true)]
    scoped_paging: bool,

    /// Fail on pages past the first or last row instead of ignoring them
    #[arg(long, global = true)]
    strict_rows: bool,
}

impl SceneArgs {
    fn load(&self) -> anyhow::Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(total) = self.total {
            config.layout.total_objects = total;
        }
        if let Some(per_row) = self.per_row {
            config.layout.per_row = per_row;
        }
        if self.scoped_paging {
            config.animator.page_scope = PageScope::CurrentRow;
        }
        if self.strict_rows {
            config.animator.row_bounds = RowBounds::Reject;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the initial ring layout
    Layout {
        /// List every cover, not just one line per row
        #[arg(long)]
        covers: bool,
        /// Emit the covers as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a key sequence against the ring without a window
    Simulate {
        /// Keys to press, in order (e.g. "wwad")
        #[arg(short, long, default_value = "")]
        keys: String,
        /// Animation ticks to run after each key
        #[arg(short, long, default_value = "30")]
        frames: usize,
    },
    /// List covers missing from the covers directory
    CheckCovers {
        /// Directory holding `{year}_{month}.jpg` files
        #[arg(long, default_value = "./covers")]
        covers_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.scene.load()?;

    match cli.command {
        Commands::Info => {
            println!("coverring-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "kernel: rows={} covers={}",
                config.layout.row_count(),
                config.layout.total_objects
            );
            println!("render: {}", coverring_render::crate_info());
            println!("input: {}", coverring_input::crate_info());
            println!("tools: {}", coverring_tools::crate_info());
            println!("keys: {}", KeyBindings::default().help());
        }
        Commands::Layout { covers, json } => {
            let scene = SceneBuilder::build(&config.layout);
            if json {
                let covers = SceneInspector::list_covers(&scene);
                println!("{}", serde_json::to_string_pretty(&covers)?);
            } else {
                let renderer = if covers {
                    DebugTextRenderer::with_covers()
                } else {
                    DebugTextRenderer::new()
                };
                let camera = HeadCamera::at_eye_height(config.layout.eye_height);
                print!("{}", renderer.render(&scene, &camera));
            }
        }
        Commands::Simulate { keys, frames } => {
            let mut scene = SceneBuilder::build(&config.layout);
            let mut animator = RowAnimator::new(config.animator.clone());
            let bindings = KeyBindings::default();

            println!("start: {}", SceneInspector::summary(&scene, &animator));
            for key in keys.chars() {
                let action = bindings.action_for(key);
                match action.row_command() {
                    Some(command) => {
                        if let Err(e) = animator.apply(&mut scene, command) {
                            println!("{key}: {action:?} failed: {e}");
                            continue;
                        }
                    }
                    None if action == Action::Noop => {
                        println!("{key}: unbound");
                        continue;
                    }
                    None => {
                        println!("{key}: {action:?} has no effect without a window");
                        continue;
                    }
                }

                let ticks = (0..frames)
                    .take_while(|_| animator.execute(&mut scene))
                    .count();
                println!(
                    "{key}: {action:?} ({ticks} ticks) {}",
                    SceneInspector::summary(&scene, &animator)
                );
            }

            let camera = HeadCamera::at_eye_height(config.layout.eye_height);
            print!("{}", DebugTextRenderer::new().render(&scene, &camera));
        }
        Commands::CheckCovers { covers_dir } => {
            let scene = SceneBuilder::build(&config.layout);
            let catalog = CoverCatalog::new(&covers_dir);
            let missing = catalog.missing(scene.covers().map(|cover| cover.key));
            for key in &missing {
                println!("missing: {}", catalog.path_for(*key).display());
            }
            println!(
                "{} of {} covers found in {}",
                scene.cover_count() - missing.len(),
                scene.cover_count(),
                covers_dir.display()
            );
        }
    }

    Ok(())
}
