use crate::helpe::*;

/// What the driver does with a job that did not fit this tick.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Requeue {
    /// Put it back at the head of the queue, always
    Retry,
    /// Put it back only if some block could ever hold it; reject it otherwise
    Reject,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimConfig {
    pub fit:        Fit,
    pub requeue:    Requeue,
    /// A run that has not converged after this many ticks is
    /// declared stalled.
    pub max_ticks:  Tick,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fit:        Fit::First,
            requeue:    Requeue::Retry,
            max_ticks:  10_000,
        }
    }
}

/// The outcome of one tick's placement attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// The queue was empty.
    Idle,
    Placed(JobId),
    /// Did not fit; back at the head of the queue.
    Deferred(JobId),
    /// Did not fit, and never will.
    Rejected(JobId),
}

/// The driver: owns the waiting queue, the tick counter and the
/// [`Engine`].
///
/// Each [`step`](Simulation::step) is one tick: one placement attempt
/// for the head of the queue, then a deallocation pass, then the tick
/// advances.
pub struct Simulation {
    engine:     Engine,
    queue:      VecDeque<Job>,
    rejected:   Vec<Job>,
    tick:       Tick,
    config:     SimConfig,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub fit:        Fit,
    pub requeue:    Requeue,
    /// Ticks elapsed until convergence.
    pub ticks:      Tick,
    pub rejected:   Vec<JobId>,
    pub statistics: Statistics,
}

impl Simulation {
    pub fn new(blocks: &[Size], queue: VecDeque<Job>, config: SimConfig) -> Self {
        Self {
            engine:     Engine::new(blocks),
            queue,
            rejected:   vec![],
            tick:       0,
            config,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn queue(&self) -> &VecDeque<Job> {
        &self.queue
    }

    pub fn rejected(&self) -> &[Job] {
        &self.rejected
    }

    /// The tick the next [`step`](Simulation::step) will run at.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns `true` once nothing waits and nothing runs.
    pub fn is_converged(&self) -> bool {
        self.queue.is_empty() && self.engine.is_idle()
    }

    /// Runs one tick.
    pub fn step(&mut self) -> Attempt {
        let tick = self.tick;
        let attempt = match self.queue.pop_front() {
            Some(job)   => {
                if self.engine.place(self.config.fit, tick, &job) {
                    Attempt::Placed(job.id())
                } else if self.config.requeue == Requeue::Reject && !self.engine.can_allocate(&job) {
                    warn!("Tick {}: job {} ({} units) fits no block, rejected", tick, job.id(), job.size());
                    self.rejected.push(job);
                    Attempt::Rejected(job.id())
                } else {
                    self.queue.push_front(job);
                    Attempt::Deferred(job.id())
                }
            },
            None        => Attempt::Idle,
        };
        self.engine.deallocate(tick);
        self.tick += 1;

        attempt
    }

    /// Steps until convergence. See [`Simulation::run_with`].
    pub fn run(self) -> Result<RunReport, SimError> {
        self.run_with(|_, _, _| {})
    }

    /// Steps until convergence, calling `observe` with the engine, the
    /// tick just run and its [`Attempt`] after every step.
    ///
    /// At least one tick always runs. Fails if the queue is empty to
    /// begin with, or if `max_ticks` pass without convergence (with
    /// [`Requeue::Retry`], one job that fits nowhere is enough).
    pub fn run_with<F>(mut self, mut observe: F) -> Result<RunReport, SimError>
    where F: FnMut(&Engine, Tick, Attempt) {
        if self.queue.is_empty() {
            return Err(SimError::EmptyWorkload);
        }
        info!("Starting {} run: {} jobs, {} blocks", self.config.fit, self.queue.len(), self.engine.num_blocks());
        loop {
            let tick = self.tick;
            let attempt = self.step();
            observe(&self.engine, tick, attempt);
            if self.is_converged() {
                break;
            }
            if self.tick >= self.config.max_ticks {
                return Err(SimError::Stalled {
                    tick:       self.tick,
                    pending:    self.queue.len(),
                    busy:       self.engine.busy_list().len(),
                });
            }
        }

        let report = self.report();
        info!("{} converged after {} ticks, {} jobs rejected", report.fit, report.ticks, report.rejected.len());

        Ok(report)
    }

    /// The current state, summarized. Does not require convergence.
    pub fn report(&self) -> RunReport {
        RunReport {
            fit:        self.config.fit,
            requeue:    self.config.requeue,
            ticks:      self.tick,
            rejected:   self.rejected.iter().map(|j| j.id()).collect(),
            statistics: self.engine.statistics(),
        }
    }
}

/// Per-policy results of [`compare_policies`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyComparison {
    pub fit:            Fit,
    pub ticks_per_run:  Vec<Tick>,
    pub average_ticks:  f64,
    /// Report of the last run.
    pub last:           RunReport,
}

/// Runs the same workload `runs` times under each [`Fit`], first-fit
/// first in the result. Every run owns its own [`Engine`]; runs execute
/// in parallel.
pub fn compare_policies(
    blocks: &[Size],
    jobs:   &VecDeque<Job>,
    config: SimConfig,
    runs:   usize,
) -> Result<Vec<PolicyComparison>, SimError> {
    let runs = runs.max(1);
    [Fit::First, Fit::Best]
        .par_iter()
        .map(|&fit| {
            let cfg = SimConfig { fit, ..config };
            let reports = (0..runs)
                .into_par_iter()
                .map(|_| Simulation::new(blocks, jobs.clone(), cfg).run())
                .collect::<Result<Vec<RunReport>, SimError>>()?;
            let ticks_per_run: Vec<Tick> = reports.iter()
                .map(|r| r.ticks)
                .collect();
            let average_ticks = ticks_per_run.iter().sum::<Tick>() as f64 / runs as f64;
            let last = reports.into_iter()
                .last()
                .ok_or(SimError::EmptyWorkload)?;

            Ok(PolicyComparison {
                fit,
                ticks_per_run,
                average_ticks,
                last,
            })
        })
        .collect()
}
