use clap::{Parser, Subcommand};
use pwa_assets::compositor::RustCompositor;
use pwa_assets::entry::ResolveOptions;
use pwa_assets::generate::{DiskStore, GenerateOptions};
use pwa_assets::instructions::InstructionSet;
use pwa_assets::options::Defaults;
use pwa_assets::preset::Preset;
use pwa_assets::{config, generate, instructions, manifest, output};
use rayon::prelude::*;
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pwa-assets")]
#[command(about = "Generate PWA icons, splash screens, and their markup")]
#[command(long_about = "\
Generate PWA icons, splash screens, and their markup

Takes one or more source images and a declarative preset, and produces the
platform asset families a PWA needs — favicon, transparent and maskable
manifest icons, the Apple touch icon, Apple splash screens (light and dark,
portrait and landscape), and Windows tiles — plus the <link> markup and
web-manifest icon entries that reference them.

Resolution is cheap and side-effect-free: 'resolve', 'links', and 'manifest'
never encode a pixel. Only 'generate' invokes the compositor, and it skips
any asset whose file already exists unless --force is given.

Run 'pwa-assets gen-config' to generate a documented pwa-assets.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Preset config file (default: pwa-assets.toml, when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for generated assets
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    /// Override the configured base path (URL prefix, must end with '/')
    #[arg(long, global = true)]
    base_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve sources into an instruction summary without generating
    Resolve { images: Vec<PathBuf> },
    /// Print the HTML head links for the resolved assets
    Links { images: Vec<PathBuf> },
    /// Print the web-manifest icons array for the resolved assets
    Manifest { images: Vec<PathBuf> },
    /// Generate all assets into the output directory
    Generate {
        images: Vec<PathBuf>,
        /// Regenerate assets that already exist
        #[arg(long)]
        force: bool,
        /// Keep generating other assets when one fails
        #[arg(long)]
        keep_going: bool,
    },
    /// Print a stock pwa-assets.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    // An explicitly named config file must exist; the default path is
    // optional and falls back to stock defaults.
    let config_path = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            path.clone()
        }
        None => PathBuf::from("pwa-assets.toml"),
    };
    let mut cfg = config::load_config(&config_path)?;
    if let Some(base_path) = cli.base_path.clone() {
        cfg.base_path = base_path;
        cfg.validate()?;
    }
    init_thread_pool(&cfg.processing);

    let preset = Preset::from_config(&cfg);
    let resolve_options = ResolveOptions::from_config(&cfg);
    let defaults = Defaults::default();

    match cli.command {
        Command::Resolve { images } => {
            let sets = resolve_all(&images, &preset, &resolve_options, &defaults)?;
            for set in &sets {
                output::print_resolve_summary(set);
            }
        }
        Command::Links { images } => {
            let sets = resolve_all(&images, &preset, &resolve_options, &defaults)?;
            for set in &sets {
                for link in set.head_links() {
                    println!("{link}");
                }
            }
        }
        Command::Manifest { images } => {
            let sets = resolve_all(&images, &preset, &resolve_options, &defaults)?;
            for set in &sets {
                println!("{}", manifest::manifest_icons_json(set)?);
            }
        }
        Command::Generate {
            images,
            force,
            keep_going,
        } => {
            let sets = resolve_all(&images, &preset, &resolve_options, &defaults)?;
            let mut generate_options = GenerateOptions::from_config(&cfg);
            if force {
                generate_options.overwrite = true;
            }
            if keep_going {
                generate_options.on_error = generate::OnError::Continue;
            }

            let compositor = RustCompositor::new();
            for set in &sets {
                println!("==> {}", set.source.display());
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        println!("{}", output::format_generate_event(&event));
                    }
                });
                let report = generate::generate(
                    set,
                    &compositor,
                    &DiskStore,
                    &cli.output,
                    &generate_options,
                    Some(tx),
                );
                printer.join().unwrap();
                output::print_report(&report?);
            }
            println!("==> Assets in {}", cli.output.display());
        }
        Command::GenConfig => unreachable!("handled above"),
    }

    Ok(())
}

/// Fail fast on missing inputs, then resolve every source image in parallel.
fn resolve_all(
    images: &[PathBuf],
    preset: &Preset,
    options: &ResolveOptions,
    defaults: &Defaults,
) -> Result<Vec<InstructionSet>, Box<dyn std::error::Error>> {
    if images.is_empty() {
        return Err("no source images given".into());
    }
    for image in images {
        if !image.exists() {
            return Err(format!("source image not found: {}", image.display()).into());
        }
    }
    let sets = images
        .par_iter()
        .map(|image| instructions::resolve(image, preset, options, defaults))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sets)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let workers = config::effective_workers(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .ok();
}
