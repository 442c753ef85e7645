//! memoview CLI
//!
//! Run the rendering demos against the memoized view graph and watch which
//! nodes re-render on every pass.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod demos;

use config::MemoviewConfig;
use demos::{DemoKind, DemoOptions};

#[derive(Parser)]
#[command(name = "memoview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Memoized view graph demos", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./memoview.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parent counter with an unrelated child
    Counter(DemoArgs),

    /// Form fields with validation callbacks
    Form(DemoArgs),

    /// Shopping cart with a keyed product list
    Cart(DemoArgs),

    /// Modal mounted behind a toggle wrapper
    Toggle(DemoArgs),

    /// Counters that delegate rendering to a callback
    RenderProp(DemoArgs),

    /// Run a demo naive and memoized and compare render totals
    Compare {
        /// Demo to compare
        #[arg(value_enum)]
        demo: DemoKind,

        /// Scripted interactions after the initial pass
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct DemoArgs {
    /// Hand out fresh values and callbacks every pass
    #[arg(long)]
    naive: bool,

    /// Scripted interactions after the initial pass
    #[arg(short, long)]
    steps: Option<usize>,

    /// Print every node of each frame, not only recomputed ones
    #[arg(long)]
    all: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Counter(args) => cmd_demo(DemoKind::Counter, &args, &config),
        Commands::Form(args) => cmd_demo(DemoKind::Form, &args, &config),
        Commands::Cart(args) => cmd_demo(DemoKind::Cart, &args, &config),
        Commands::Toggle(args) => cmd_demo(DemoKind::Toggle, &args, &config),
        Commands::RenderProp(args) => cmd_demo(DemoKind::RenderProp, &args, &config),
        Commands::Compare { demo, steps } => cmd_compare(demo, steps, &config),
        Commands::Config => cmd_config(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<MemoviewConfig> {
    match path {
        Some(path) => MemoviewConfig::load(path),
        None => MemoviewConfig::load_from_dir(Path::new(".")),
    }
}

fn cmd_demo(kind: DemoKind, args: &DemoArgs, config: &MemoviewConfig) -> Result<()> {
    let options = DemoOptions {
        steps: args.steps.unwrap_or(config.demo.steps),
        naive: args.naive || config.demo.naive,
        scheduler: config.scheduler(&kind.to_string()),
        print_frames: args.all,
    };

    demos::run(kind, &options)?;
    Ok(())
}

fn cmd_compare(kind: DemoKind, steps: Option<usize>, config: &MemoviewConfig) -> Result<()> {
    let mut options = DemoOptions {
        steps: steps.unwrap_or(config.demo.steps),
        naive: true,
        scheduler: config.scheduler(&kind.to_string()),
        print_frames: false,
    };
    let naive = demos::run(kind, &options)?;

    options.naive = false;
    let memoized = demos::run(kind, &options)?;

    println!();
    println!("{:<10} {:>8} {:>8}", "", "renders", "reused");
    println!("{:<10} {:>8} {:>8}", "naive", naive.total_renders, naive.reused);
    println!(
        "{:<10} {:>8} {:>8}",
        "memoized", memoized.total_renders, memoized.reused
    );

    let saved = naive.total_renders.saturating_sub(memoized.total_renders);
    info!(
        "{} demo: memoization skipped {} of {} renders over {} passes",
        kind, saved, naive.total_renders, naive.passes
    );

    Ok(())
}

fn cmd_config(config: &MemoviewConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
