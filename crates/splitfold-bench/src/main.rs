mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, HarnessConfig};
use core::hint::black_box;
use splitfold::{FoldOp, Reducer, Sum};
use std::time::{Duration, Instant};
use telemetry::init_telemetry;

// Using mimalloc for faster allocation of the input vector and of the
// per-run worker bookkeeping.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = HarnessConfig::try_from(args)?;

    init_telemetry()?;

    let data = vec![config.value; config.elements];
    let reducer = Reducer::new(config.reduce.clone());

    tracing::info!(
        "Reducing {} elements of value {} on {} workers ({} runs)",
        config.elements,
        config.value,
        config.reduce.workers().resolve(),
        config.repeat
    );

    let (parallel, parallel_time) = time_runs(config.repeat, || {
        reducer.try_reduce(black_box(&data), config.init, Sum)
    })?;
    let (sequential, sequential_time) = time_runs(config.repeat, || {
        Ok::<_, splitfold::Error>(sequential_sum(black_box(&data), config.init))
    })?;

    if parallel != sequential {
        anyhow::bail!("parallel result {parallel} differs from sequential result {sequential}");
    }

    tracing::info!(
        "parallel: {:.10}s, sequential: {:.10}s (best of {})",
        parallel_time.as_secs_f64(),
        sequential_time.as_secs_f64(),
        config.repeat
    );

    println!("{parallel}");
    Ok(())
}

/// Runs `f` `repeat` times and returns the last result with the fastest
/// wall-clock time.
fn time_runs<T, E>(
    repeat: usize,
    mut f: impl FnMut() -> Result<T, E>,
) -> Result<(T, Duration), E> {
    let mut best = Duration::MAX;
    let mut last = None;

    for _ in 0..repeat {
        let start = Instant::now();
        let value = f()?;
        best = best.min(start.elapsed());
        last = Some(value);
    }

    // `repeat` is validated to be non-zero.
    let value = last.expect("at least one run");
    Ok((value, best))
}

fn sequential_sum(data: &[i64], init: i64) -> i64 {
    data.iter().fold(init, |acc, &x| match Sum.combine(acc, x) {
        Ok(v) => v,
        Err(never) => match never {},
    })
}
