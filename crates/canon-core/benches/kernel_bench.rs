// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the per-turn path: metric evaluation,
//! cycle detection, and a full `respond` on each judgment branch.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use canon_core::{Canon, CanonKernel, CanonSource, CycleDetector, MetricEvaluator};
use canon_types::{KernelConfig, TurnContext, TurnRecord};

fn history(turns: usize) -> Vec<TurnRecord> {
    (0..turns)
        .map(|i| {
            let reply = format!("Reply number {i} covers a different aspect of the topic.");
            TurnRecord::new(format!("question {i}"), reply.clone(), reply)
        })
        .collect()
}

fn context(turns: usize, draft: &str) -> TurnContext {
    TurnContext::new("how does the scheduler pick the next task", history(turns), draft)
}

// ── MetricEvaluator.evaluate() ──────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let config = KernelConfig::default();
    let canon = Canon::load(&CanonSource::Default).unwrap();
    let evaluator = MetricEvaluator::new(&config, &canon);
    let ctx = context(
        10,
        "The scheduler picks the next task by priority. Everyone knows it is guaranteed fair.",
    );
    c.bench_function("evaluate_10_turns", |b| {
        b.iter(|| evaluator.evaluate(black_box(&ctx)))
    });
}

// ── CycleDetector.detect() ──────────────────────────────────────────

fn bench_detect_short_history(c: &mut Criterion) {
    let config = KernelConfig::default();
    let detector = CycleDetector::new(&config);
    let ctx = context(4, "The scheduler picks the next task by priority.");
    c.bench_function("detect_4_turns", |b| {
        b.iter(|| detector.detect(black_box(&ctx)))
    });
}

fn bench_detect_long_history(c: &mut Criterion) {
    // Cost depends on the window, not on total history length.
    let config = KernelConfig::default();
    let detector = CycleDetector::new(&config);
    let ctx = context(1000, "The scheduler picks the next task by priority.");
    c.bench_function("detect_1000_turns", |b| {
        b.iter(|| detector.detect(black_box(&ctx)))
    });
}

// ── CanonKernel.respond() ───────────────────────────────────────────

fn bench_respond_accept(c: &mut Criterion) {
    let kernel = CanonKernel::new();
    kernel.load_canon().unwrap();
    let ctx = context(
        4,
        "The scheduler picks the next task from the run queue by priority.",
    );
    c.bench_function("respond_accept", |b| {
        b.iter(|| kernel.respond(black_box(&ctx)))
    });
}

fn bench_respond_correct(c: &mut Criterion) {
    let kernel = CanonKernel::new();
    kernel.load_canon().unwrap();
    let ctx = context(
        4,
        "Everyone knows the scheduler picks the next task by priority. Trust me.",
    );
    c.bench_function("respond_correct", |b| {
        b.iter(|| kernel.respond(black_box(&ctx)))
    });
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_detect_short_history,
    bench_detect_long_history,
    bench_respond_accept,
    bench_respond_correct,
);
criterion_main!(benches);
