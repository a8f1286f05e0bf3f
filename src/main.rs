use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use poisson_rust::grid::{DEFAULT_DELTA, DEFAULT_ITERATIONS, DEFAULT_N, DEFAULT_THREADS};
use poisson_rust::{Engine, Grid, SolverConfig};

const BENCH_WARMUP: usize = 3;

/// ノイマン境界条件付きポアソン方程式ソルバー
#[derive(Parser, Debug)]
#[command(name = "poisson", version)]
struct Args {
    /// 立方体の一辺のセル数（奇数）
    #[arg(short = 'n', long = "size", default_value_t = DEFAULT_N)]
    n: usize,

    /// スイープ回数
    #[arg(short = 'i', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// ワーカースレッド数
    #[arg(short = 't', long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// グリッド間隔
    #[arg(long, default_value_t = DEFAULT_DELTA)]
    delta: f64,

    #[arg(long, value_enum, default_value_t = CliEngine::Barrier)]
    engine: CliEngine,

    /// 結果を出力せず、指定回数の計測を行う
    #[arg(long, value_name = "RUNS")]
    bench: Option<usize>,

    /// 詳細ログ（スレッドごとの所要時間など）
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEngine {
    Barrier,
    Single,
    Rayon,
}

impl From<CliEngine> for Engine {
    fn from(engine: CliEngine) -> Self {
        match engine {
            CliEngine::Barrier => Engine::Barrier,
            CliEngine::Single => Engine::Single,
            CliEngine::Rayon => Engine::Rayon,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // 中心セルが定義できるよう奇数のみ受け付ける
    if args.n % 2 == 0 {
        bail!("n should be an odd number (got {})", args.n);
    }

    let engine = Engine::from(args.engine);
    let config = SolverConfig::new(args.n, args.iterations, args.threads, args.delta)
        .with_verbose(args.debug);

    if matches!(engine, Engine::Rayon) && args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("failed to configure rayon thread pool")?;
    }

    let source = Grid::impulse(args.n)
        .with_context(|| format!("failed to allocate source term (n={})", args.n))?;
    debug!("{:?} engine, {:?}", engine, config);

    if let Some(runs) = args.bench {
        return run_benchmark(engine, &config, &source, runs);
    }

    let result = engine
        .solve(&config, &source.data)
        .context("solve failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Result:")?;
    result.write_middle_slice(&mut out)?;
    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run_benchmark(engine: Engine, config: &SolverConfig, source: &Grid, runs: usize) -> Result<()> {
    if runs == 0 {
        bail!("--bench needs at least one run");
    }

    println!("=== Poisson {} ベンチマーク ===", engine.name());
    println!(
        "n: {}, iterations: {}, 測定回数: {}, スレッド数: {}\n",
        config.n, config.iterations, runs, config.threads
    );

    // ウォームアップ
    for _ in 0..BENCH_WARMUP {
        engine.solve(config, &source.data)?;
    }

    // 本番計測
    let mut times = Vec::with_capacity(runs);
    for i in 0..runs {
        let start = Instant::now();
        engine.solve(config, &source.data)?;
        let duration = start.elapsed();
        times.push(duration);
        println!("  試行 {:2}: {:?}", i + 1, duration);
    }

    let summary = summarize(&mut times);
    info!("bench {}: median {:?}", engine.name(), summary.median);
    println!("  ---");
    println!("  最小値:   {:?}", summary.min);
    println!("  中央値:   {:?}", summary.median);
    println!("  平均値:   {:?}", summary.mean);
    println!("  最大値:   {:?}", summary.max);
    Ok(())
}

struct Summary {
    min: Duration,
    median: Duration,
    mean: Duration,
    max: Duration,
}

// times は空でないこと
fn summarize(times: &mut [Duration]) -> Summary {
    times.sort();
    let len = times.len();
    Summary {
        min: times[0],
        median: times[len / 2],
        mean: times.iter().sum::<Duration>().div_f64(len as f64),
        max: times[len - 1],
    }
}
