// src/main.rs
//
// manaprint command line.
//
// 1. LOGGING (RUST_LOG, default info)
// 2. CONFIGURATION (MANAPRINT_* environment)
// 3. APPLICATION STATE (only for commands that need the network)
// 4. COMMAND DISPATCH

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;

use manaprint::application::commands::{explain_mechanics, generate_document, list_documents};
use manaprint::application::dto::{GenerationRequestDto, GenerationResultDto};
use manaprint::application::state::AppState;
use manaprint::config::AppConfig;
use manaprint::infrastructure::DocumentStore;
use manaprint::services::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "manaprint", version, about = "Turn a card list into a printable PDF deck book")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the PDF for a card list
    Generate {
        /// Name of the list; also the output file name
        #[arg(long)]
        name: String,
        /// Card list file, one "<quantity> <name>" per line ("-" reads stdin)
        #[arg(long, default_value = "-")]
        input: String,
        /// suggestions, cards or both
        #[arg(long, default_value = "both")]
        mode: String,
        /// Land exclusion: none, basic or all
        #[arg(long, default_value = "none")]
        lands: String,
        /// Printing inclusion: include or exclude
        #[arg(long, default_value = "include")]
        printings: String,
        /// paged or continuous
        #[arg(long, default_value = "paged")]
        layout: String,
        /// Use this advice text instead of asking the advice service
        #[arg(long)]
        advice_file: Option<PathBuf>,
    },
    /// Explain the mechanics found in each card's rules text
    Mechanics {
        #[arg(long, default_value = "-")]
        input: String,
    },
    /// List the documents generated so far
    Lists,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Generate {
            name,
            input,
            mode,
            lands,
            printings,
            layout,
            advice_file,
        } => {
            let advice = match advice_file {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("reading advice from {}", path.display()))?,
                ),
                None => None,
            };
            let request = GenerationRequestDto {
                list_name: name,
                card_list: read_input(&input)?,
                mode,
                lands,
                printings,
                layout,
                advice,
            };
            let state = Arc::new(AppState::initialize(config).await?);
            run_generate(state, request).await
        }
        Command::Mechanics { input } => {
            let card_list = read_input(&input)?;
            let state = AppState::initialize(config).await?;
            for report in explain_mechanics(&state, &card_list).await? {
                println!("{}", report.card);
                println!("  {}", report.oracle);
                for line in &report.mechanics {
                    println!("  - {}", line);
                }
            }
            Ok(())
        }
        Command::Lists => {
            let store = DocumentStore::new(&config.documents_dir);
            for document in list_documents(&store)? {
                println!("{}\t{}", document.name, document.path);
            }
            Ok(())
        }
    }
}

/// Runs the job in the background; Ctrl-C cancels at the next card boundary.
async fn run_generate(state: Arc<AppState>, request: GenerationRequestDto) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut progress = state.subscribe_progress();

    let mut job = {
        let state = state.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { generate_document(&state, request, cancel).await })
    };

    let result = loop {
        tokio::select! {
            finished = &mut job => break finished.context("render job panicked")??,
            tick = progress.recv() => match tick {
                Ok(tick) => eprintln!(
                    "[{:>3}%] {} ({}/{})",
                    tick.percent, tick.card_name, tick.completed, tick.total
                ),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => {}
            },
            _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                eprintln!("Cancelling after the current card...");
                cancel.cancel();
            }
        }
    };

    match result {
        GenerationResultDto::Completed(report) => {
            println!("Saved {} ({} pages)", report.output_path, report.pages);
            println!("Total cards: {}", report.total_cards);
            println!("Total price: {:.2} €", report.total_price);
            println!("Average price: {:.2} €", report.avg_price);
            println!("Average mana value: {:.2}", report.avg_cmc);
            println!("Deck colors: {}", report.colors);
            if !report.skipped.is_empty() {
                println!("Not found: {}", report.skipped.join(", "));
            }
            if !report.excluded.is_empty() {
                println!("Excluded lands: {}", report.excluded.join(", "));
            }
        }
        GenerationResultDto::Cancelled { pages_rendered } => {
            println!("Cancelled after {} card page(s); nothing was saved", pages_rendered);
        }
    }
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading card list from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(Path::new(input)).with_context(|| format!("reading card list from {}", input))
}
