pub use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    io::{BufRead, BufReader},
    path::PathBuf,
    hash::BuildHasherDefault,
    fmt,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use indexmap::IndexMap;
pub use ahash::AHasher;
pub use clap::{Parser, ValueEnum};
pub use serde::Serialize;
pub use log::{debug, info, trace, warn};

pub use crate::{Block, Engine, Job,
    stats::*,
    workload::*,
    sim::*,
};

/// The unit of logical time. The engine never reads a clock: whoever
/// drives it decides what a tick means and when the next one begins.
pub type Tick = usize;

/// Capacities and job footprints share one unit. `blockfit` does not
/// care which one (the demo workload thinks in kilobytes).
pub type Size = usize;

/// Blocks are numbered `1..=N` in construction order.
pub type BlockId = usize;

/// Jobs are numbered in arrival order, starting from 1.
pub type JobId = u32;

/// Every job that was ever placed, keyed by id. Insertion order is
/// placement order.
pub type JobMap = IndexMap<JobId, Job, BuildHasherDefault<AHasher>>;

/// Who sits in a busy [`Block`], and since when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub job:    JobId,
    pub start:  Tick,
}

impl Occupancy {
    /// Ticks elapsed since the job moved in. A tick that precedes the
    /// start counts as zero residency.
    #[inline(always)]
    pub fn held_for(&self, tick: Tick) -> Tick {
        tick.saturating_sub(self.start)
    }
}

/// One successful placement, as recorded in the engine's history.
///
/// Sizes are copied at placement time, so that `block_size - job_size`
/// is exactly the internal fragmentation charged by this placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub tick:       Tick,
    pub job:        JobId,
    pub block:      BlockId,
    pub block_size: Size,
    pub job_size:   Size,
}

impl Placement {
    #[inline(always)]
    pub fn waste(&self) -> Size {
        self.block_size - self.job_size
    }
}

/// Running totals kept by the [`Engine`]. The statistics engine reads
/// nothing else besides the per-block usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    /// Sum of all block sizes. Fixed at construction.
    pub capacity:       Size,
    /// Sum of the sizes of blocks used at least once. A block counts
    /// once, no matter how many times it is reused.
    pub memory_used:    Size,
    /// Sum of `block size - job size` over every placement.
    pub fragmentation:  Size,
    /// Sum of `job size` over every placement.
    pub job_memory:     Size,
    /// The tick of the most recent deallocation pass.
    pub last_tick:      Tick,
}

/// Read-only view of a [`Block`], handed out for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockSnapshot {
    pub id:     BlockId,
    pub size:   Size,
    pub busy:   bool,
    pub job:    Option<JobId>,
}

impl fmt::Display for BlockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})\t{}K\t", self.id, self.size)?;
        match self.job {
            Some(j) => write!(f, "[{}]", j),
            None    => Ok(()),
        }
    }
}

/// Placement policies.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Lowest-numbered free block that is large enough
    First,
    /// Smallest free block that is large enough (ties: lowest number)
    Best,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fit::First  => write!(f, "First Fit"),
            Fit::Best   => write!(f, "Best Fit"),
        }
    }
}

/// Defines the interface for reading workloads.
///
/// [`CsvWorkload`] reads `time,size` rows from a file. Anything else
/// that can hand out jobs (a generator, a socket, a trace) only needs
/// to implement this trait.
pub trait WorkloadGen<T> {
    fn new(path: PathBuf) -> Self;
    /// Either the jobs, numbered in arrival order, or the reason why
    /// they could not be read.
    fn read_jobs(&self) -> Result<Vec<Job>, WorkloadError>;
    /// Spawns one [Job] out of whatever raw data the source yields.
    fn gen_single(&self, d: T, id: JobId) -> Job;
}

#[derive(Error, Debug)]
#[error("{message}\n{:?}", culprit)]
/// Appears while validating the jobs that are about to be
/// fed to a [`Simulation`].
pub struct JobError {
    pub message: String,
    pub culprit: Job,
}

#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Job(#[from] JobError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimError {
    #[error("no convergence after {tick} ticks ({pending} jobs pending, {busy} blocks busy)")]
    Stalled { tick: Tick, pending: usize, busy: usize },
    #[error("nothing to simulate: the job queue is empty")]
    EmptyWorkload,
}
