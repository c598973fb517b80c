//! Welcome to `blockfit`!
//!
//! A fixed set of memory blocks, each of immutable capacity, serves a
//! queue of jobs. Each job asks for some memory and, once it gets a block,
//! keeps it for a fixed number of ticks. The [`Engine`] decides where
//! jobs go (first-fit or best-fit), frees blocks whose tenants have
//! expired, and keeps the books from which [`Statistics`] are derived.
//!
//! Everything that *drives* the engine (the tick counter, the waiting
//! queue, what to do with a job that did not fit) lives in [`sim`].

mod job;
mod block;
mod engine;

pub mod stats;
pub mod workload;
pub mod sim;
pub mod helpe;

pub use crate::helpe::*;

/// A unit of work. It needs [`size`](Job::size) units of memory and,
/// once placed, holds its block for [`time`](Job::time) ticks.
///
/// Jobs never change after creation. The [`Engine`] keeps its own copy
/// of every job it has ever placed: the copy is what tells it, later on,
/// when the job's time is up.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Job {
    id:     JobId,
    time:   Tick,
    size:   Size,
}

/// A fixed-capacity storage unit, holding at most one [`Job`] at a time.
///
/// > A block is busy *if and only if* it has an [`Occupancy`]. There is
/// > no separate flag that could disagree with it.
#[derive(Debug, Clone)]
pub struct Block {
    id:         BlockId,
    size:       Size,
    occupant:   Option<Occupancy>,
}

/// The allocation engine. Owns every [`Block`], the free/busy partition
/// over their ids, the map of jobs it has placed, and the counters that
/// the statistics engine feeds on.
///
/// Both partition sets are ordered by block id. First-fit relies on it:
/// "first" means "lowest id".
#[derive(Debug, Clone)]
pub struct Engine {
    blocks:     Vec<Block>,
    free:       BTreeSet<BlockId>,
    busy:       BTreeSet<BlockId>,
    jobs:       JobMap,
    // Indexed like `blocks`.
    usage:      Vec<u32>,
    history:    Vec<Placement>,
    ledger:     Ledger,
}
