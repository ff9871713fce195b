use std::io::Write;

use clap::{Parser, Subcommand};
use ymdash::{ReplContext, commands, logging, readline};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let ctx = ReplContext::new();

    if let Err(err) = commands::load(&ctx, None, None).await {
        tracing::warn!(error = %err, "Initial dataset load failed");
    }

    while let Some(line) = readline()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "YouthMappers activity dashboard shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reload the activity dataset and the chapter manifest
    Load {
        #[arg(short, long)]
        weekly: Option<String>,
        #[arg(short, long)]
        manifest: Option<String>,
    },
    /// Restrict to dates (YYYY-MM-DD), both inclusive
    Range { start: String, end: String },
    ClearRange,
    /// Replace the chapter selection; no IDs selects all chapters
    Chapters { ids: Vec<String> },
    Toggle { id: String },
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(short, long)]
        select_all: bool,
    },
    /// Click the timeline at pixel `x`
    Click { x: f64 },
    /// Drag across the timeline between two pixel positions
    Drag { from: f64, to: f64 },
    /// Send a key (ArrowLeft, ArrowRight, ArrowUp, ArrowDown, Escape)
    Key { name: String },
    Resize { width: f64, height: f64 },
    /// Print the timeline's draw commands
    Frame,
    Filter,
    Buckets,
    Stats,
    Layers {
        #[arg(short, long)]
        zoom: Option<f64>,
    },
    /// Click a map control (bbox, globe, style)
    Control { name: String },
    Reset,
    Config {
        #[arg(short, long)]
        save: bool,
    },
    Exit,
}

async fn respond(line: &str, ctx: &ReplContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "ymdash".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Load { weekly, manifest }) => commands::load(ctx, weekly, manifest).await?,
        Some(Commands::Range { start, end }) => commands::set_range(ctx, &start, &end).await?,
        Some(Commands::ClearRange) => commands::clear_range(ctx).await,
        Some(Commands::Chapters { ids }) => commands::set_chapters(ctx, &ids).await,
        Some(Commands::Toggle { id }) => commands::toggle_chapter(ctx, &id).await?,
        Some(Commands::Search { query, select_all }) => {
            commands::search(ctx, &query, select_all).await
        }
        Some(Commands::Click { x }) => commands::click(ctx, x).await,
        Some(Commands::Drag { from, to }) => commands::drag(ctx, from, to).await,
        Some(Commands::Key { name }) => commands::key(ctx, &name).await?,
        Some(Commands::Resize { width, height }) => commands::resize(ctx, width, height).await,
        Some(Commands::Frame) => commands::show_frame(ctx).await?,
        Some(Commands::Filter) => commands::show_filter(ctx).await?,
        Some(Commands::Buckets) => commands::show_buckets(ctx).await,
        Some(Commands::Stats) => commands::show_stats(ctx).await,
        Some(Commands::Layers { zoom }) => commands::show_layers(ctx, zoom).await,
        Some(Commands::Control { name }) => commands::click_control(ctx, &name).await?,
        Some(Commands::Reset) => commands::reset(ctx).await,
        Some(Commands::Config { save }) => commands::show_config(ctx, save).await?,
        Some(Commands::Exit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
