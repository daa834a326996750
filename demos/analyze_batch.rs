//! Example: Analyze multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each analysis is synchronous.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.
//! - Set `RUST_LOG=cadence_dsp=debug` to see per-stage logging.

use cadence_dsp::{run_analysis, AnalysisResult};
use rayon::prelude::*;
use std::env;
use std::time::Instant;

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn to_json(path: &str, result: &AnalysisResult) -> serde_json::Value {
    serde_json::json!({
        "path": path,
        "ok": true,
        "bpm": result.bpm(),
        "tempo": result.tempo(),
        "key": result.key().label(),
        "key_estimate": result.key(),
        "time_signature": result.time_signature().label(),
        "beat_times": result.beats().times(),
        "chroma_mean": result.chromagram().mean(),
        "metadata": result.metadata(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<(String, Result<AnalysisResult, cadence_dsp::AnalysisError>)> =
        pool.install(|| {
            paths
                .par_iter()
                .map(|path| (path.clone(), run_analysis(path)))
                .collect()
        });

    let mut failures = 0usize;
    for (path, outcome) in &outs {
        match outcome {
            Ok(result) if json => println!("{}", to_json(path, result)),
            Ok(result) => {
                println!("{}", path);
                print!("{}", result.summary());
            }
            Err(e) => {
                failures += 1;
                if json {
                    println!(
                        "{}",
                        serde_json::json!({ "path": path, "ok": false, "error": e.to_string() })
                    );
                } else {
                    eprintln!("{}: ERROR: {}", path, e);
                }
            }
        }
    }

    eprintln!(
        "Done: {} ok, {} failed in {:.2}s",
        outs.len() - failures,
        failures,
        t0.elapsed().as_secs_f32()
    );

    Ok(())
}
