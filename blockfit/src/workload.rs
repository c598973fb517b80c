use crate::helpe::*;

/// `(time, size)` pairs of the demonstration workload.
pub const DEMO_JOBS: [(Tick, Size); 25] = [
    (5, 5760),
    (4, 4190),
    (8, 3290),
    (2, 2030),
    (2, 2550),
    (6, 6990),
    (8, 8940),
    (10, 740),
    (7, 3930),
    (6, 6890),
    (5, 6580),
    (8, 3820),
    (9, 9140),
    (10, 420),
    (10, 220),
    (7, 7540),
    (3, 3210),
    (1, 1380),
    // Larger than any demo block: never fits.
    (9, 9850),
    (3, 3610),
    (7, 7540),
    (2, 2710),
    (8, 8390),
    (5, 5950),
    (10, 760),
];

/// Block capacities of the demonstration workload.
pub const DEMO_BLOCKS: [Size; 10] = [
    9500,
    7000,
    4500,
    8500,
    3000,
    9000,
    1000,
    5500,
    1500,
    500,
];

/// Builds a queue out of `(time, size)` pairs, numbering jobs from 1
/// in the order given.
pub fn make_job_queue(specs: &[(Tick, Size)]) -> VecDeque<Job> {
    specs.iter()
        .enumerate()
        .map(|(i, (time, size))| Job::new(i as JobId + 1, *time, *size))
        .collect()
}

/// Validates a set of jobs and queues them in the order given.
/// A successfully returned queue is guaranteed to contain:
/// - no job with zero size
/// - no job with id 0
/// - no two jobs sharing an id
///
/// This function is the gatekeeper between job sources and
/// [`Simulation`]s.
pub fn init(in_elts: Vec<Job>) -> Result<VecDeque<Job>, JobError> {
    let mut seen: HashSet<JobId> = HashSet::with_capacity(in_elts.len());
    for j in &in_elts {
        if j.size() == 0 {
            return Err(JobError {
                message: String::from("Job with 0 size found!"),
                culprit: *j,
            });
        } else if j.id() == 0 {
            return Err(JobError {
                message: String::from("Job with id 0 found!"),
                culprit: *j,
            });
        } else if !seen.insert(j.id()) {
            return Err(JobError {
                message: String::from("Duplicate job id found!"),
                culprit: *j,
            });
        }
    }

    Ok(in_elts.into_iter().collect())
}

/// Random jobs, for demos and stress tests. Times are drawn from
/// `0..=max_time` and sizes from `1..=max_size`.
///
/// Same seed, same jobs.
pub fn random_workload(
    n:          usize,
    max_time:   Tick,
    max_size:   Size,
    seed:       u64,
) -> VecDeque<Job> {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let specs: Vec<(Tick, Size)> = (0..n)
        .map(|_| (rng.gen_range(0..=max_time), rng.gen_range(1..=max_size.max(1))))
        .collect();

    make_job_queue(&specs)
}

//---START EXTERNAL INTERFACES
// The types listed below read workloads from somewhere.
//
// To write your own source, simply make sure that it
// satisfies the `WorkloadGen` trait.

/// Reads a CSV with a header line followed by `time,size` rows. Blank
/// lines and lines starting with `#` are skipped. Jobs are numbered
/// from 1 in row order.
pub struct CsvWorkload {
    pub path: PathBuf,
}

impl WorkloadGen<(Tick, Size)> for CsvWorkload {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    fn read_jobs(&self) -> Result<Vec<Job>, WorkloadError> {
        let fd = std::fs::File::open(self.path.as_path())?;
        let reader = BufReader::new(fd);
        let mut res = vec![];
        let mut next_id: JobId = 1;

        for (idx, line) in reader.lines()
            .enumerate()
            // First line is the header!
            .skip(1) {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed.split(',')
                .map(|f| f.trim())
                .collect();
            if fields.len() != 2 {
                return Err(WorkloadError::Malformed {
                    line:   idx + 1,
                    reason: format!("expected 2 fields, found {}", fields.len()),
                });
            }
            let parse = |f: &str, what: &str| {
                f.parse::<usize>().map_err(|e| WorkloadError::Malformed {
                    line:   idx + 1,
                    reason: format!("bad {} {:?}: {}", what, f, e),
                })
            };
            let time = parse(fields[0], "time")?;
            let size = parse(fields[1], "size")?;
            res.push(self.gen_single((time, size), next_id));
            next_id += 1;
        }

        Ok(res)
    }

    fn gen_single(&self, (time, size): (Tick, Size), id: JobId) -> Job {
        Job::new(id, time, size)
    }
}
//---END EXTERNAL INTERFACES

/// Reads jobs with any [WorkloadGen] and runs them through [init].
pub fn read_from_path<T, B>(path: PathBuf) -> Result<VecDeque<Job>, WorkloadError>
where T: WorkloadGen<B> {
    let parser = T::new(path);
    let jobs = parser.read_jobs()?;

    Ok(init(jobs)?)
}
