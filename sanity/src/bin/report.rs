use sanity::*;

/// An utility for auditing block allocation runs.
///
/// Runs a workload under both fits, checks the engine's invariants
/// after every tick and prints a JSON report.
#[derive(Parser, Debug)]
struct Arg {
    /// Path to a `time,size` CSV (the demo workload is used otherwise)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:      Option<PathBuf>,

    /// Block capacities, in order
    #[arg(short, long, value_delimiter = ',', default_values_t = DEMO_BLOCKS)]
    blocks:     Vec<Size>,

    /// What to do with jobs that do not fit
    #[arg(short, long, value_enum, default_value_t = Requeue::Reject)]
    requeue:    Requeue,

    /// Give up after this many ticks
    #[arg(short, long, default_value_t = 10_000)]
    max_ticks:  Tick,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Arg::parse();
    let jobs = match cli.input {
        Some(p) => {
            anyhow::ensure!(p.is_file(), "File does not exist: {}", p.display());
            read_from_path::<CsvWorkload, (Tick, Size)>(p)?
        },
        None    => make_job_queue(&DEMO_JOBS),
    };
    let config = SimConfig {
        requeue:    cli.requeue,
        max_ticks:  cli.max_ticks,
        ..SimConfig::default()
    };

    let runs = audit_both(&cli.blocks, &jobs, config)?;
    println!("{}", serde_json::to_string_pretty(&runs)?);

    Ok(())
}
