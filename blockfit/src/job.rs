use crate::helpe::*;

impl Job {
    /// Creates a new [Job]. Validation (non-zero size, unique ids) is
    /// the business of [`workload::init`](crate::workload::init), not ours.
    pub fn new(id: JobId, time: Tick, size: Size) -> Self {
        Self {
            id,
            time,
            size,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// How many ticks the job keeps its block once placed.
    #[inline(always)]
    pub fn time(&self) -> Tick {
        self.time
    }

    #[inline(always)]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns `true` if a job that moved in at `start` is done by `tick`.
    ///
    /// A job with zero time is done the very tick it was placed.
    #[inline(always)]
    pub fn expired(&self, start: Tick, tick: Tick) -> bool {
        tick.saturating_sub(start) >= self.time
    }

    /// Returns `true` if the job fits into `capacity` units of memory.
    #[inline(always)]
    pub fn fits_in(&self, capacity: Size) -> bool {
        self.size <= capacity
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{} {}K", self.id, self.size)
    }
}

//-----TREATING GROUPS OF JOBS (START)---------------------
/*
    Jobs are identified by their id alone, and queues of them
    are naturally sorted in arrival order, which is id order.
 */
impl Ord for Job {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

impl std::hash::Hash for Job {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
//-----TREATING GROUPS OF JOBS (END)---------------------
