use sanity::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn reject_config() -> SimConfig {
    SimConfig {
        requeue: Requeue::Reject,
        ..SimConfig::default()
    }
}

#[test]
fn demo_runs_are_clean() {
    let runs = audit_both(&DEMO_BLOCKS, &make_job_queue(&DEMO_JOBS), reject_config()).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].report.fit, Fit::First);
    assert_eq!(runs[0].ticks_audited, runs[0].report.ticks);
    assert_eq!(runs[1].report.fit, Fit::Best);
    assert_eq!(runs[1].summary[LEAST_USED_BLOCK], "#9 (1x)");
}

#[test]
fn fresh_engines_are_clean() {
    assert_eq!(audit(&Engine::new(&[])), Ok(()));
    assert_eq!(audit(&Engine::new(&[5, 0, 7])), Ok(()));
}

#[test]
fn overstay_is_caught_before_deallocation() {
    let mut engine = Engine::new(&[10]);
    assert!(engine.place_first_fit(4, &Job::new(1, 0, 3)));
    assert_eq!(audit(&engine), Ok(()));
    assert_eq!(
        audit_residency(&engine, 4),
        Err(Violation::Overstay { tick: 4, job: 1, block: 1 })
    );
    engine.deallocate(4);
    assert_eq!(audit_residency(&engine, 4), Ok(()));
}

#[test]
fn stalls_surface_as_sim_errors() {
    let config = SimConfig {
        max_ticks: 20,
        ..SimConfig::default()
    };
    let res = audited_run(&[10], make_job_queue(&[(1, 11)]), config);
    match res {
        Err(AuditError::Sim(SimError::Stalled { tick, pending, busy })) => {
            assert_eq!((tick, pending, busy), (20, 1, 0));
        },
        other   => panic!("unexpected {:?}", other.map(|r| r.ticks_audited)),
    }
}

#[test]
fn random_runs_are_clean() {
    for seed in 0..25u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let num_blocks = rng.gen_range(1..10);
        let blocks: Vec<Size> = (0..num_blocks).map(|_| rng.gen_range(1..=64)).collect();
        let jobs = random_workload(rng.gen_range(1..60), 4, 80, seed);
        for run in audit_both(&blocks, &jobs, reject_config()).unwrap() {
            let stats = &run.report.statistics;
            // Nobody is placed twice.
            assert_eq!(stats.placements, stats.jobs_placed);
            assert_eq!(stats.jobs_placed + run.report.rejected.len(), jobs.len());
        }
    }
}

#[test]
fn violations_serialize() {
    let v = Violation::Overflow { job: 3, block: 2, job_size: 9, block_size: 4 };
    assert_eq!(v.to_string(), "job 3 (9 units) sits in block 2 (4 units)");
    let json = serde_json::to_string(&v).unwrap();
    assert!(json.contains("Overflow"));
}
