use crate::helpe::*;

impl Engine {
    /// Creates an [Engine] over blocks of the given capacities. Block
    /// `i` of the slice gets id `i + 1`. All blocks start out free.
    ///
    /// An empty slice is fine: nothing will ever fit.
    pub fn new(sizes: &[Size]) -> Self {
        let blocks: Vec<Block> = sizes.iter()
            .enumerate()
            .map(|(i, s)| Block::new(i + 1, *s))
            .collect();
        let free = blocks.iter()
            .map(|b| b.id())
            .collect();

        Self {
            usage:      vec![0; blocks.len()],
            free,
            busy:       BTreeSet::new(),
            jobs:       JobMap::default(),
            history:    vec![],
            ledger:     Ledger {
                capacity:   sizes.iter().sum(),
                ..Ledger::default()
            },
            blocks,
        }
    }

    /// Places `job` according to `fit`. See [`Engine::place_first_fit`]
    /// and [`Engine::place_best_fit`].
    #[inline(always)]
    pub fn place(&mut self, fit: Fit, tick: Tick, job: &Job) -> bool {
        match fit {
            Fit::First  => self.place_first_fit(tick, job),
            Fit::Best   => self.place_best_fit(tick, job),
        }
    }

    /// Puts `job` into the lowest-numbered free block that is large
    /// enough. Returns `false`, changing nothing, if there is none.
    pub fn place_first_fit(&mut self, tick: Tick, job: &Job) -> bool {
        let target = self.free
            .iter()
            .copied()
            .find(|&id| job.fits_in(self.blocks[id - 1].size()));

        self.settle(tick, job, target)
    }

    /// Puts `job` into the smallest free block that is large enough,
    /// the lowest-numbered one among equals. Returns `false`, changing
    /// nothing, if there is none.
    pub fn place_best_fit(&mut self, tick: Tick, job: &Job) -> bool {
        // Sort a snapshot of the free set. The set itself must keep
        // its id order for first-fit.
        let target = self.free
            .iter()
            .copied()
            .sorted_by_key(|&id| (self.blocks[id - 1].size(), id))
            .find(|&id| job.fits_in(self.blocks[id - 1].size()));

        self.settle(tick, job, target)
    }

    #[inline(always)]
    fn settle(&mut self, tick: Tick, job: &Job, target: Option<BlockId>) -> bool {
        match target {
            Some(id)    => {
                self.commit(tick, job, id);
                true
            },
            None        => {
                trace!("Tick {}: no free block fits job {} ({} units)", tick, job.id(), job.size());
                false
            }
        }
    }

    /// The only place where a free block becomes busy. Books are
    /// updated here and nowhere else.
    fn commit(&mut self, tick: Tick, job: &Job, id: BlockId) {
        let idx = id - 1;
        let block = &mut self.blocks[idx];
        block.allocate(tick, job);
        let block_size = block.size();

        let moved = self.free.remove(&id) && self.busy.insert(id);
        debug_assert!(moved, "Broken free/busy partition at block {}", id);
        self.jobs.insert(job.id(), *job);

        if self.usage[idx] == 0 {
            self.ledger.memory_used += block_size;
        }
        self.usage[idx] += 1;
        let record = Placement {
            tick,
            job:        job.id(),
            block:      id,
            block_size,
            job_size:   job.size(),
        };
        self.ledger.fragmentation += record.waste();
        self.ledger.job_memory += record.job_size;
        self.history.push(record);

        debug!("Tick {}: job {} ({} units) -> block {} ({} units)", tick, job.id(), job.size(), id, block_size);
    }

    /// Returns `true` if *some* block, free or busy, is large enough for
    /// `job`. A `false` means the job can never be placed; a `true`
    /// promises nothing about when.
    pub fn can_allocate(&self, job: &Job) -> bool {
        self.blocks.iter().any(|b| job.fits_in(b.size()))
    }

    /// Frees every busy block whose job has spent at least its `time`
    /// in it by `tick`. Also remembers `tick` for throughput.
    pub fn deallocate(&mut self, tick: Tick) {
        // Collect first, mutate after.
        let expired: Vec<BlockId> = self.busy
            .iter()
            .copied()
            .filter(|&id| {
                match self.blocks[id - 1].occupant() {
                    Some(occ)   => {
                        self.jobs.get(&occ.job)
                            .map_or(true, |j| j.expired(occ.start, tick))
                    },
                    None        => true,
                }
            })
            .collect();

        for id in expired {
            if let Some(occ) = self.blocks[id - 1].deallocate() {
                debug!("Tick {}: block {} released by job {} after {} ticks", tick, id, occ.job, occ.held_for(tick));
            }
            self.busy.remove(&id);
            self.free.insert(id);
        }
        self.ledger.last_tick = tick;
    }

    /// One snapshot per block, in id order.
    pub fn output_state(&self) -> Vec<BlockSnapshot> {
        self.blocks.iter()
            .map(|b| b.snapshot())
            .collect()
    }

    /// Human-readable state, one block per line.
    pub fn render_state(&self) -> String {
        self.blocks.iter()
            .map(|b| b.to_string())
            .join("\n")
    }

    /// Derives a fresh [Statistics] report. Calling this does not
    /// touch the engine.
    pub fn statistics(&self) -> Statistics {
        Statistics::derive(self)
    }

    /// Free block ids, ascending.
    pub fn free_list(&self) -> &BTreeSet<BlockId> {
        &self.free
    }

    /// Busy block ids, ascending.
    pub fn busy_list(&self) -> &BTreeSet<BlockId> {
        &self.busy
    }

    /// Returns `true` if no block is busy.
    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.busy.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        id.checked_sub(1).and_then(|idx| self.blocks.get(idx))
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Every job ever placed.
    pub fn jobs(&self) -> &JobMap {
        &self.jobs
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// How many placements block `id` has received so far.
    pub fn usage(&self, id: BlockId) -> u32 {
        id.checked_sub(1)
            .and_then(|idx| self.usage.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Per-block placement counters, indexed by `id - 1`.
    pub fn usage_counts(&self) -> &[u32] {
        &self.usage
    }

    /// Every successful placement, oldest first.
    pub fn history(&self) -> &[Placement] {
        &self.history
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
