use clap::{Parser, Subcommand};
use pagewire::dom::{MemoryDocument, PageSpec};
use pagewire::simulate::{Script, simulate};
use pagewire::{config, output, snapshot};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Page and config inputs shared by every page-driven command.
#[derive(clap::Args, Clone)]
struct PageArgs {
    /// Page description (TOML or JSON list of elements)
    #[arg(long)]
    page: PathBuf,

    /// Config file (defaults apply when absent)
    #[arg(long, default_value = config::CONFIG_FILE)]
    config: PathBuf,
}

#[derive(Parser)]
#[command(name = "pagewire")]
#[command(about = "Replay page behaviors (hero carousel, modals) against a page description")]
#[command(long_about = "\
Replay page behaviors (hero carousel, modals) against a page description

The page is a flat list of elements in document order:

  [[elements]]
  id = \"card-1\"
  classes = [\"stack-card\"]      # carousel card
  label = \"Live revenue\"

  [[elements]]
  id = \"contact\"
  classes = [\"modal\"]           # modal overlay

A script is a list of steps run on a virtual clock:

  [[steps]]
  advance = { ms = 4000 }        # timers fire
  [[steps]]
  open = { id = \"contact\" }     # open_modal
  [[steps]]
  key = { key = \"Escape\" }      # global key press

Set RUST_LOG=debug to trace every transition.
Run 'pagewire gen-config' to generate a documented pagewire.toml.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a script and print the page state after every step
    Simulate {
        #[command(flatten)]
        page: PageArgs,
        /// Script of steps to replay
        #[arg(long)]
        script: PathBuf,
        /// Print step reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write an HTML snapshot of the page (after an optional script)
    Render {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        script: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate a page and config and show what the behaviors attach to
    Check {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Print a stock pagewire.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate { page, script, json } => {
            let (spec, config) = load_inputs(&page)?;
            let script = Script::load(&script)?;
            let sim = simulate(&spec, &script, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sim.reports)?);
            } else {
                output::print_simulation(&sim);
            }
        }
        Command::Render { page, script, out } => {
            let (spec, config) = load_inputs(&page)?;
            let script = match script {
                Some(path) => Script::load(&path)?,
                None => Script::default(),
            };
            let sim = simulate(&spec, &script, &config)?;
            let title = spec.title.as_deref().unwrap_or("pagewire snapshot");
            let html = snapshot::render_snapshot(&sim.document, title).into_string();
            match out {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    println!("==> Snapshot written to {}", path.display());
                }
                None => println!("{}", html),
            }
        }
        Command::Check { page } => {
            let (spec, config) = load_inputs(&page)?;
            let doc = MemoryDocument::from_spec(&spec)?;
            output::print_check(&doc, &config);
            println!("==> Page is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the page description and the merged, validated config.
fn load_inputs(
    args: &PageArgs,
) -> Result<(PageSpec, config::BehaviorConfig), Box<dyn std::error::Error>> {
    let spec = PageSpec::load(&args.page)?;
    let config = config::load_config_file(Path::new(&args.config))?;
    Ok((spec, config))
}
