//! Criterion benchmarks for ticksim hot paths.
//!
//! Benchmarks:
//! 1. Synthetic replay generation
//! 2. Execution engine matching against a deep resting book
//! 3. Full broker loop (engine + ledger) over a synthetic stream

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ticksim_core::{
    Broker, ExecutionEngine, Ledger, MarketDataReplayer, MarketEvent, Order, OrderSide,
    SimulatedBroker,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn symbols(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("SYM{i:02}")).collect()
}

fn replay(n_symbols: usize, days: i64) -> MarketDataReplayer {
    let end = start() + Duration::days(days);
    MarketDataReplayer::synthetic(start(), end, &symbols(n_symbols), 42, 60).unwrap()
}

// ── 1. Replay generation ─────────────────────────────────────────────

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for &n in &[1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::new("synthetic_30d_hourly", n), &n, |b, &n| {
            b.iter(|| black_box(replay(n, 30)));
        });
    }

    group.finish();
}

// ── 2. Engine matching ───────────────────────────────────────────────

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    group.bench_function("resting_500_limits_no_cross", |b| {
        let ev = MarketEvent::new(start(), "SYM00", 100.0);
        b.iter(|| {
            let mut engine = ExecutionEngine::new();
            for i in 0..500u64 {
                engine
                    .submit(Order::limit(i, "SYM00", OrderSide::Buy, 10.0, 50.0))
                    .unwrap();
            }
            black_box(engine.process_event(&ev));
        });
    });

    group.bench_function("partial_fill_100_limits_20_events", |b| {
        b.iter(|| {
            let mut engine = ExecutionEngine::new();
            for i in 0..100u64 {
                engine
                    .submit(Order::limit(i, "SYM00", OrderSide::Buy, 50.0, 101.0))
                    .unwrap();
            }
            for t in 0..20 {
                let ev = MarketEvent::new(start() + Duration::minutes(t), "SYM00", 100.0)
                    .with_size(5.0);
                black_box(engine.process_event(&ev));
            }
        });
    });

    group.finish();
}

// ── 3. Broker loop ───────────────────────────────────────────────────

fn bench_broker_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("broker_loop");
    let data = replay(10, 30);

    group.bench_function("10_symbols_30d_alternating_orders", |b| {
        b.iter(|| {
            let mut broker =
                SimulatedBroker::new(ExecutionEngine::new(), Ledger::with_cash(1e6), symbols(10));
            for (i, ev) in data.iter().enumerate() {
                if i % 7 == 0 {
                    let side = if i % 14 == 0 { OrderSide::Buy } else { OrderSide::Sell };
                    let order = Order::market(i as u64, ev.symbol.clone(), side, 1.0);
                    let _ = broker.submit_order(order);
                }
                broker.on_market_event(ev);
            }
            black_box(broker.get_account());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_replay, bench_engine, bench_broker_loop);
criterion_main!(benches);
