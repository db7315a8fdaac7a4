//! # Alignment Tick Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use align_lib::{
    align_ctrl::{AlignCtrl, AlignCtrlParams},
    sim::{SimParams, VisionSim},
    vision::{VisionMgr, VisionParams},
};
use comms_if::table::Table;

fn align_tick_benchmark(c: &mut Criterion) {
    // ---- Build a simulated scene ----

    let table = Table::new();

    let mut sim = VisionSim::new(SimParams::default());
    sim.init(&table);

    // Target marker plus a couple of distractors
    sim.set_multiple_markers(&[(2, 2.5, 0.3, 0.0), (5, 3.0, -1.0, 10.0), (7, 4.0, 1.0, -5.0)]);

    let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();
    let mut ctrl = AlignCtrl::new(AlignCtrlParams::default()).unwrap();
    let mut ctrl_telem = AlignCtrl::new(AlignCtrlParams::default())
        .unwrap()
        .with_telemetry(&table);

    // ---- Benches ----

    c.bench_function("VisionMgr::update", |b| b.iter(|| vision.update()));

    vision.update();

    c.bench_function("AlignCtrl::tick", |b| {
        b.iter(|| ctrl.tick(vision.observation(2)))
    });

    c.bench_function("AlignCtrl::tick::telemetry", |b| {
        b.iter(|| ctrl_telem.tick(vision.observation(2)))
    });

    c.bench_function("VisionMgr::update + AlignCtrl::tick", |b| {
        b.iter(|| {
            vision.update();
            ctrl.tick(vision.observation(2))
        })
    });
}

criterion_group!(benches, align_tick_benchmark);
criterion_main!(benches);
