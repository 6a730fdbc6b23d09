use anyhow::bail;
use clap::Parser;
use splitfold::{ReduceConfig, WorkerCount};

/// Runtime configuration for the `splitfold-bench` binary.
///
/// Every value can be passed as a CLI flag or through the environment (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "splitfold-bench",
    version,
    about = "Times a parallel sum against a sequential fold"
)]
pub struct CliArgs {
    /// Number of elements in the input vector.
    ///
    /// Environment variable: `BENCH_ELEMENTS`
    #[arg(long, env = "BENCH_ELEMENTS", default_value_t = 1_000_000)]
    pub elements: usize,

    /// Value every element is set to.
    ///
    /// Environment variable: `BENCH_VALUE`
    #[arg(long, env = "BENCH_VALUE", default_value_t = 2)]
    pub value: i64,

    /// Initial value of the reduction.
    ///
    /// Environment variable: `BENCH_INIT`
    #[arg(long, env = "BENCH_INIT", default_value_t = 0)]
    pub init: i64,

    /// Number of workers. Defaults to `SPLITFOLD_WORKERS` if set, otherwise
    /// to the number of logical CPUs.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// How many times each variant is timed.
    ///
    /// Environment variable: `BENCH_REPEAT`
    #[arg(long, env = "BENCH_REPEAT", default_value_t = 1)]
    pub repeat: usize,

    /// Log one line per worker after every parallel run.
    #[arg(short, long, default_value_t = false)]
    pub diagnostics: bool,
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub elements: usize,
    pub value: i64,
    pub init: i64,
    pub repeat: usize,
    pub reduce: ReduceConfig,
}

impl TryFrom<CliArgs> for HarnessConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.repeat == 0 {
            bail!("BENCH_REPEAT must be greater than 0");
        }

        let workers = match args.workers {
            Some(0) => bail!("--workers must be greater than 0"),
            Some(n) => WorkerCount::fixed(n),
            None => WorkerCount::from_env(),
        };

        Ok(Self {
            elements: args.elements,
            value: args.value,
            init: args.init,
            repeat: args.repeat,
            reduce: ReduceConfig::new()
                .with_workers(workers)
                .with_diagnostics(args.diagnostics),
        })
    }
}
