use blockfit::*;

/// Simulates jobs competing for a fixed set of memory blocks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a `time,size` CSV (the demo workload is used otherwise)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:      Option<PathBuf>,

    /// Block capacities, in order
    #[arg(short, long, value_delimiter = ',', default_values_t = DEMO_BLOCKS)]
    blocks:     Vec<Size>,

    /// Job fitting
    #[arg(short, long, value_enum, default_value_t = Fit::First)]
    fit:        Fit,

    /// What to do with jobs that do not fit
    #[arg(short, long, value_enum, default_value_t = Requeue::Reject)]
    requeue:    Requeue,

    /// Give up after this many ticks
    #[arg(short, long, default_value_t = 10_000)]
    max_ticks:  Tick,

    /// Generate this many random jobs instead of reading them
    #[arg(long, conflicts_with = "input")]
    random:     Option<usize>,

    /// Seed for `--random`
    #[arg(long, default_value_t = 0)]
    seed:       u64,

    /// Print block state after every tick
    #[arg(short, long, default_value_t = false)]
    trace:      bool,

    /// Run both fits and compare them
    #[arg(short, long, default_value_t = false)]
    compare:    bool,

    /// Runs per fit, with `--compare`
    #[arg(long, default_value_t = 1)]
    runs:       usize,

    /// Print reports as JSON
    #[arg(short, long, default_value_t = false)]
    json:       bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Args::parse();

    let jobs = match (&cli.input, cli.random) {
        (Some(p), _)    => {
            anyhow::ensure!(p.exists() && p.is_file(), "Invalid input path: {}", p.display());
            read_from_path::<CsvWorkload, (Tick, Size)>(p.clone())?
        },
        (None, Some(n)) => {
            let max_size = cli.blocks.iter().copied().max().unwrap_or(1);
            random_workload(n, 10, max_size, cli.seed)
        },
        (None, None)    => init(make_job_queue(&DEMO_JOBS).into_iter().collect())?,
    };
    let config = SimConfig {
        fit:        cli.fit,
        requeue:    cli.requeue,
        max_ticks:  cli.max_ticks,
    };

    if cli.compare {
        let results = compare_policies(&cli.blocks, &jobs, config, cli.runs)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            for r in &results {
                println!("{} ->", r.fit);
                println!("    average ticks taken: {:.2}", r.average_ticks);
                print_stats(&r.last.statistics, "    ");
            }
        }
        return Ok(());
    }

    let total = jobs.len();
    let sim = Simulation::new(&cli.blocks, jobs, config);
    let report = if cli.trace {
        sim.run_with(|engine, tick, attempt| {
            println!("{}", engine.render_state());
            println!("Tick: {} | {:?} | Allocated: {}", tick, attempt, engine.busy_list().len());
            println!();
        })?
    } else {
        sim.run()?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Scheme: {}", report.fit);
        println!("Jobs:\t\t{}\nRejected:\t{}\nTicks:\t\t{}", total, report.rejected.len(), report.ticks);
        print_stats(&report.statistics, "");
    }

    Ok(())
}

fn print_stats(stats: &Statistics, indent: &str) {
    for (stat, val) in stats.as_map() {
        println!("{}{} -> {}", indent, stat, val);
    }
}
