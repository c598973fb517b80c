use crate::helpe::*;

impl Block {
    /// A free block. Only the [`Engine`] makes these.
    pub(crate) fn new(id: BlockId, size: Size) -> Self {
        Self {
            id,
            size,
            occupant: None,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline(always)]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline(always)]
    pub fn is_busy(&self) -> bool {
        self.occupant.is_some()
    }

    #[inline(always)]
    pub fn occupant(&self) -> Option<Occupancy> {
        self.occupant
    }

    #[inline(always)]
    pub fn job_id(&self) -> Option<JobId> {
        self.occupant.map(|o| o.job)
    }

    #[inline(always)]
    pub fn job_start(&self) -> Option<Tick> {
        self.occupant.map(|o| o.start)
    }

    pub(crate) fn allocate(&mut self, tick: Tick, job: &Job) {
        debug_assert!(self.occupant.is_none(), "Block {} double-booked!", self.id);
        debug_assert!(job.fits_in(self.size), "Job {} overflows block {}", job.id(), self.id);
        self.occupant = Some(Occupancy {
            job:    job.id(),
            start:  tick,
        });
    }

    pub(crate) fn deallocate(&mut self) -> Option<Occupancy> {
        self.occupant.take()
    }

    pub fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot {
            id:     self.id,
            size:   self.size,
            busy:   self.is_busy(),
            job:    self.job_id(),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}
