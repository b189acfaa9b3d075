#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::Duration;

use clap::{Parser, Subcommand};
use handoff::{HandoffConfig, commands};
use handoff_env::StandardEnv;

/// Bounded queue handoff demos
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Producers and consumers sharing one bounded queue
    Pipeline {
        #[arg(long)]
        producers: Option<usize>,

        #[arg(long)]
        consumers: Option<usize>,

        /// Queue capacity, 0 for rendezvous handoff
        #[arg(long)]
        capacity: Option<usize>,

        /// Items sent by each producer
        #[arg(long)]
        items: Option<usize>,
    },
    /// Square numbers on a worker pool (one job panics on purpose)
    Pool {
        #[arg(long)]
        workers: Option<usize>,

        #[arg(long)]
        capacity: Option<usize>,

        #[arg(long, default_value_t = 20)]
        jobs: u64,
    },
    /// Receive from two queues at once until both are closed
    Select {
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Increment one shared counter from many threads
    Counter {
        #[arg(long, default_value_t = 100)]
        tasks: usize,
    },
    /// Returned errors, declared errors, recovered panics and deferred calls
    Recover,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    handoff_logging::init(None)?;

    let args = Args::parse();
    let config = HandoffConfig::from_env(&StandardEnv::new())?;

    match args.cmd {
        Commands::Pipeline {
            producers,
            consumers,
            capacity,
            items,
        } => {
            let report = commands::pipeline(
                producers.unwrap_or(config.producers),
                consumers.unwrap_or(config.consumers),
                capacity.unwrap_or(config.capacity),
                items.unwrap_or(config.items),
            )?;

            for (consumer, items) in report.received.iter().enumerate() {
                let items = items
                    .iter()
                    .map(|item| format!("p{}#{}", item.producer, item.seq))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("consumer {consumer}: {items}");
            }
            println!(
                "total={} exactly_once={} fifo_per_producer={}",
                report.total(),
                report.is_exactly_once(),
                report.is_fifo_per_producer()
            );
        }
        Commands::Pool {
            workers,
            capacity,
            jobs,
        } => {
            let outputs = commands::squares(
                workers.unwrap_or(config.workers),
                capacity.unwrap_or(config.capacity),
                jobs,
            )?;

            for output in outputs {
                match output.result {
                    Ok(square) => println!("job {} on {}: {square}", output.index, output.worker),
                    Err(e) => println!("job {} on {}: {e}", output.index, output.worker),
                }
            }
        }
        Commands::Select { timeout_ms } => {
            let timeout = timeout_ms.map_or(config.timeout, Duration::from_millis);
            let summary = commands::select_messages(timeout, u64::try_from(config.items)?);

            for (index, message) in &summary.received {
                println!("queue {index}: {message:?}");
            }
            println!("timeouts: {}", summary.timeouts);
        }
        Commands::Counter { tasks } => {
            println!("counter: {}", commands::count(tasks));
        }
        Commands::Recover => {
            for line in commands::recover_demo() {
                println!("{line}");
            }
        }
    }

    Ok(())
}
