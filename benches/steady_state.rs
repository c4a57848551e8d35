use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pkevents::prelude::models::{one_compartment, one_compartment_with_absorption};
use pkevents::*;
use std::hint::black_box;

fn ss_bolus(tau: f64) -> DoseEvent {
    let mut dose = DoseEvent::dose(1, 100.0, 0.0, 0.0);
    dose.set_ss(true);
    dose.set_ii(tau);
    dose
}

/// Oral regimen with a steady-state start, additional doses and sparse sampling
fn oral_schedule(id: f64) -> Schedule {
    Schedule::builder(id)
        .bolus(0.0, 100.0, 1)
        .steady_state(12.0)
        .addl(6, 12.0)
        .observation(0.5, 2)
        .observation(1.0, 2)
        .observation(2.0, 2)
        .observation(4.0, 2)
        .observation(8.0, 2)
        .observation(12.0, 2)
        .observation(84.0, 2)
        .build()
}

fn bench_steady_bolus(c: &mut Criterion) {
    let template = Analytical::new(one_compartment, vec![0.1], 1);
    let options = SteadyStateOptions::default();

    c.bench_function("steady_state_bolus", |b| {
        b.iter(|| {
            let mut system = template.clone();
            let report = black_box(ss_bolus(12.0)).steady_bolus(&mut system, &options);
            black_box(report)
        });
    });
}

fn bench_steady_infusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("steady_state_infusion");
    let template = Analytical::new(one_compartment, vec![0.1], 1);
    let options = SteadyStateOptions::default();

    // infusion durations below and above the interval
    for duration in [2.0, 12.0, 30.0] {
        let mut dose = ss_bolus(12.0);
        dose.set_rate(100.0 / duration);

        group.bench_with_input(BenchmarkId::from_parameter(duration), &dose, |b, dose| {
            b.iter(|| {
                let mut system = template.clone();
                black_box(dose.steady_infusion(&mut system, &options))
            });
        });
    }

    group.finish();
}

fn bench_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_population");
    let template = Analytical::new(one_compartment_with_absorption, vec![1.0, 0.1], 2);
    let options = SimulationOptions::default().with_forced_times(vec![3.0, 6.0, 24.0, 48.0]);

    for size in [10, 100, 500] {
        let schedules: Vec<Schedule> = (0..size).map(|i| oral_schedule(i as f64)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let results = simulate_population(&template, black_box(&schedules), &options);
                black_box(results)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_steady_bolus,
    bench_steady_infusion,
    bench_population
);
criterion_main!(benches);
