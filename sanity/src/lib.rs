pub use blockfit::*;

/// A broken engine invariant. Finding one means there is a bug in
/// `blockfit`, not in the workload.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Violation {
    #[error("block {0} is both free and busy")]
    DoubleListed(BlockId),
    #[error("block {0} is neither free nor busy")]
    Unlisted(BlockId),
    #[error("block {0} does not exist but is listed")]
    Phantom(BlockId),
    #[error("block {block} busy flag says {busy}, partition disagrees")]
    FlagMismatch { block: BlockId, busy: bool },
    #[error("block {block} holds job {job}, which the engine never placed")]
    UnknownJob { block: BlockId, job: JobId },
    #[error("job {job} ({job_size} units) sits in block {block} ({block_size} units)")]
    Overflow { job: JobId, block: BlockId, job_size: Size, block_size: Size },
    #[error("job {job} occupies more than one block")]
    Cloned { job: JobId },
    #[error("history records block {block} as {recorded} units, engine says {actual}")]
    Resized { block: BlockId, recorded: Size, actual: Size },
    #[error("fragmentation {fragmentation} + job memory {job_memory} != {handed_out} handed out")]
    Conservation { fragmentation: Size, job_memory: Size, handed_out: Size },
    #[error("block {block} counted {counted} placements, history has {recorded}")]
    Usage { block: BlockId, counted: u32, recorded: u32 },
    #[error("memory used is {counted}, used blocks add up to {expected}")]
    MemoryUsed { counted: Size, expected: Size },
    #[error("tick {tick}: job {job} in block {block} should have left by now")]
    Overstay { tick: Tick, job: JobId, block: BlockId },
}

/// Checks every invariant that must hold between any two engine
/// operations. Returns the first violation found.
pub fn audit(engine: &Engine) -> Result<(), Violation> {
    let n = engine.num_blocks();
    let (free, busy) = (engine.free_list(), engine.busy_list());

    if let Some(id) = free.intersection(busy).next() {
        return Err(Violation::DoubleListed(*id));
    }
    if let Some(id) = free.iter().chain(busy.iter()).find(|id| **id == 0 || **id > n) {
        return Err(Violation::Phantom(*id));
    }
    let mut tenants: HashSet<JobId> = HashSet::new();
    for b in engine.blocks() {
        let id = b.id();
        if !free.contains(&id) && !busy.contains(&id) {
            return Err(Violation::Unlisted(id));
        }
        if b.is_busy() != busy.contains(&id) {
            return Err(Violation::FlagMismatch { block: id, busy: b.is_busy() });
        }
        if let Some(occ) = b.occupant() {
            let job = engine.job(occ.job)
                .ok_or(Violation::UnknownJob { block: id, job: occ.job })?;
            if !job.fits_in(b.size()) {
                return Err(Violation::Overflow {
                    job:        job.id(),
                    block:      id,
                    job_size:   job.size(),
                    block_size: b.size(),
                });
            }
            if !tenants.insert(occ.job) {
                return Err(Violation::Cloned { job: occ.job });
            }
        }
    }

    audit_books(engine)
}

/// The placement history and the running totals must tell the same
/// story, placement by placement.
fn audit_books(engine: &Engine) -> Result<(), Violation> {
    let mut recorded = vec![0u32; engine.num_blocks()];
    let mut handed_out = 0;
    let mut waste = 0;
    for p in engine.history() {
        let actual = engine.block(p.block)
            .map(|b| b.size())
            .ok_or(Violation::Phantom(p.block))?;
        if p.block_size != actual {
            return Err(Violation::Resized { block: p.block, recorded: p.block_size, actual });
        }
        if p.job_size > p.block_size {
            return Err(Violation::Overflow {
                job:        p.job,
                block:      p.block,
                job_size:   p.job_size,
                block_size: p.block_size,
            });
        }
        recorded[p.block - 1] += 1;
        handed_out += p.block_size;
        waste += p.waste();
    }

    let ledger = engine.ledger();
    if ledger.fragmentation + ledger.job_memory != handed_out || ledger.fragmentation != waste {
        return Err(Violation::Conservation {
            fragmentation:  ledger.fragmentation,
            job_memory:     ledger.job_memory,
            handed_out,
        });
    }

    let mut expected_used = 0;
    for (b, (&counted, &rec)) in engine.blocks()
        .iter()
        .zip(engine.usage_counts().iter().zip(recorded.iter())) {
        if counted != rec {
            return Err(Violation::Usage { block: b.id(), counted, recorded: rec });
        }
        if counted > 0 {
            expected_used += b.size();
        }
    }
    if ledger.memory_used != expected_used {
        return Err(Violation::MemoryUsed { counted: ledger.memory_used, expected: expected_used });
    }

    Ok(())
}

/// After the deallocation pass of `tick`, no busy block may hold a job
/// whose time is up.
pub fn audit_residency(engine: &Engine, tick: Tick) -> Result<(), Violation> {
    for b in engine.blocks() {
        if let Some(occ) = b.occupant() {
            if let Some(job) = engine.job(occ.job) {
                if job.expired(occ.start, tick) {
                    return Err(Violation::Overstay { tick, job: occ.job, block: b.id() });
                }
            }
        }
    }

    Ok(())
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("tick {tick}: {violation}")]
    Broken { tick: Tick, violation: Violation },
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// A run that went through [`audit`] after every tick.
#[derive(Debug, Clone, Serialize)]
pub struct AuditedRun {
    pub ticks_audited:  Tick,
    pub report:         RunReport,
    /// [`Statistics::as_map`] of the final state.
    pub summary:        IndexMap<String, String>,
}

/// Drives a [`Simulation`] to convergence, auditing the engine after
/// every tick. Stops at the first violation.
pub fn audited_run(
    blocks: &[Size],
    jobs:   VecDeque<Job>,
    config: SimConfig,
) -> Result<AuditedRun, AuditError> {
    let mut first_violation: Option<(Tick, Violation)> = None;
    let mut ticks_audited = 0;
    let report = Simulation::new(blocks, jobs, config)
        .run_with(|engine, tick, _| {
            if first_violation.is_some() {
                return;
            }
            ticks_audited += 1;
            if let Err(v) = audit(engine).and_then(|_| audit_residency(engine, tick)) {
                warn!("Tick {}: {}", tick, v);
                first_violation = Some((tick, v));
            }
        })?;

    if let Some((tick, violation)) = first_violation {
        return Err(AuditError::Broken { tick, violation });
    }
    let stats = &report.statistics;
    info!("{}: {} ticks audited, all clean", report.fit, ticks_audited);

    Ok(AuditedRun {
        ticks_audited,
        summary: stats.as_map(),
        report,
    })
}

/// Audits one run per [`Fit`] over the same workload.
pub fn audit_both(
    blocks: &[Size],
    jobs:   &VecDeque<Job>,
    config: SimConfig,
) -> Result<Vec<AuditedRun>, AuditError> {
    [Fit::First, Fit::Best]
        .into_iter()
        .map(|fit| audited_run(blocks, jobs.clone(), SimConfig { fit, ..config }))
        .collect()
}
