use std::path::PathBuf;

use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the board document (.bbd)
    #[arg(short, long)]
    board: PathBuf,

    /// Maximum number of ticks to run (default: 1000)
    #[arg(short, long, default_value = "1000")]
    ticks: u64,

    /// Enable per-tick execution tracing
    #[arg(long)]
    trace: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    info!("Starting BreadBoard Simulator");
    info!("Loading board: {:?}", args.board);
    let report = breadboard_loader::load(&args.board)?;
    if report.non_perfect {
        info!("Board loaded with one or more dropped components or cables");
    }

    let mut board = report.board;
    board.initialise()?;

    info!("Running for up to {} ticks...", args.ticks);
    let mut error = None;
    for tick in 0..args.ticks {
        if let Err(e) = board.tick(1) {
            info!("Simulation error at tick {}: {}", tick, e);
            error = Some(e);
            break;
        }
    }

    info!("Total instructions executed: {}", board.total_ops());

    match error {
        Some(e) => {
            println!("{e}");
            std::process::exit(1);
        }
        None => {
            println!("Executed {} instruction(s)", board.total_ops());
            Ok(())
        }
    }
}
