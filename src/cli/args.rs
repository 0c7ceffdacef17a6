use crate::core::{EmptySharesPolicy, EngineConfig, ShareCheck};
use crate::io::ReportFormat;
use crate::strategy::BatchConfig;
use crate::types::TripError;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Compute who owes whom after a shared trip
#[derive(Parser, Debug)]
#[command(name = "trip-settle")]
#[command(about = "Compute trip balances and the payments that settle them", long_about = None)]
pub struct CliArgs {
    /// Input file path containing trip records (CSV) or whole trips (JSON)
    #[arg(value_name = "INPUT", help = "Path to the input .csv or .json file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for synchronous or 'async' for asynchronous"
    )]
    pub strategy: StrategyType,

    /// Number of records per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of records per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of trips settled concurrently (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of trips settled concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Report output format
    #[arg(long = "format", value_name = "FORMAT", default_value = "csv")]
    pub format: ReportFormat,

    /// Balances within this distance of zero count as settled
    #[arg(
        long = "epsilon",
        value_name = "AMOUNT",
        default_value = "0.01",
        allow_negative_numbers = true
    )]
    pub epsilon: Decimal,

    /// How to treat a custom split without any shares
    #[arg(long = "empty-custom-split", value_name = "POLICY", default_value = "fallback")]
    pub empty_custom_split: EmptySharesPolicy,

    /// Whether explicit shares are checked against the expense amount
    #[arg(long = "share-check", value_name = "MODE", default_value = "warn")]
    pub share_check: ShareCheck,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Values that were not given fall back to the BatchConfig defaults.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create an EngineConfig from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the epsilon is negative.
    pub fn to_engine_config(&self) -> Result<EngineConfig, TripError> {
        EngineConfig::new(self.epsilon, self.empty_custom_split, self.share_check)
    }
}
