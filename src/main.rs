//! Trip Settlement CLI
//!
//! Command-line interface for settling shared trip expenses.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- trips.csv > report.csv
//! cargo run -- --strategy sync trips.csv > report.csv
//! cargo run -- --format json trips.json > report.json
//! cargo run -- --strategy async --max-concurrent 8 trips.csv > report.csv
//! cargo run -- --epsilon 0.005 --empty-custom-split skip --share-check trust trips.csv
//! ```
//!
//! The program reads trip records from the input file, settles every trip
//! through the selected processing strategy, and writes balances and
//! settlement payments to stdout. Logs go to stderr (`RUST_LOG` controls the
//! level).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid options, file not found, unreadable input, etc.)

use std::process;
use tracing::error;
use trip_settlement_engine::cli;
use trip_settlement_engine::strategy;

fn main() {
    let args = cli::parse_args();
    cli::init_logging();

    let engine_config = match args.to_engine_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, batch_config, engine_config, args.format)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!("{}", e);
        process::exit(1);
    }
}
