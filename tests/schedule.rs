use approx::assert_relative_eq;
use pkevents::data::ordering::{EARLY_POSITION, LATE_POSITION, PHANTOM_POSITION};
use pkevents::prelude::models::one_compartment;
use pkevents::*;

fn one_cmt() -> Analytical {
    Analytical::new(one_compartment, vec![0.1], 1)
}

fn doses_of(schedule: &Schedule, kind: EventKind) -> Vec<(f64, i32)> {
    schedule
        .iter()
        .filter(|r| r.kind() == kind)
        .map(|r| (r.time(), r.pos()))
        .collect()
}

#[test]
fn additional_doses_stop_at_the_horizon() {
    let mut schedule = Schedule::builder(1.0)
        .bolus(0.0, 100.0, 1)
        .addl(3, 24.0)
        .observation(96.0, 1)
        .build();
    schedule.expand(80.0, false).unwrap();

    let doses: Vec<f64> = doses_of(&schedule, EventKind::Dose)
        .iter()
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(doses, vec![0.0, 24.0, 48.0, 72.0]);
    assert!(schedule.is_sorted());

    let derived: Vec<&DoseEvent> = schedule.doses().filter(|d| d.time() > 0.0).collect();
    assert!(derived.iter().all(|d| !d.output()));
    // placed after the two known records
    assert!(derived.iter().all(|d| d.pos() == 12));
}

#[test]
fn prepended_repeats_sort_before_same_time_records() {
    let mut schedule = Schedule::builder(1.0)
        .bolus(0.0, 100.0, 1)
        .addl(1, 24.0)
        .observation(24.0, 1)
        .build();
    schedule.expand(f64::INFINITY, true).unwrap();

    let at_24: Vec<EventKind> = schedule
        .iter()
        .filter(|r| r.time() == 24.0)
        .map(|r| r.kind())
        .collect();
    assert_eq!(at_24, vec![EventKind::Dose, EventKind::Observation]);
    assert_eq!(doses_of(&schedule, EventKind::Dose)[1], (24.0, EARLY_POSITION));
}

#[test]
fn infusion_repeats_carry_their_own_ends() {
    let mut schedule = Schedule::builder(1.0)
        .infusion(0.0, 100.0, 1, 50.0)
        .addl(2, 12.0)
        .build();
    schedule.expand(f64::INFINITY, false).unwrap();

    assert_eq!(
        doses_of(&schedule, EventKind::InfusionStop),
        vec![(2.0, LATE_POSITION), (14.0, LATE_POSITION), (26.0, LATE_POSITION)]
    );
}

#[test]
fn forced_times_inside_the_stream_only() {
    let mut schedule = Schedule::builder(2.0)
        .bolus(0.0, 100.0, 1)
        .observation(100.0, 1)
        .build();
    schedule.insert_forced_times(&[-5.0, 0.0, 50.0, 100.0, 150.0], &[], false);

    let phantoms: Vec<&Record> = schedule
        .iter()
        .filter(|r| r.kind() == EventKind::Phantom)
        .collect();
    assert_eq!(phantoms.len(), 1);
    assert_eq!(phantoms[0].time(), 50.0);
    assert_eq!(phantoms[0].pos(), PHANTOM_POSITION);
    assert_eq!(phantoms[0].record().id(), 2.0);
    assert!(!phantoms[0].output());
}

#[test]
fn reset_and_dose_restarts_from_zero() {
    let schedule = Schedule::builder(1.0)
        .bolus(0.0, 100.0, 1)
        .reset_dose(10.0, 40.0, 1, 0.0)
        .observation(20.0, 1)
        .build();

    let states =
        simulate_subject(&mut one_cmt(), &schedule, &SimulationOptions::default()).unwrap();
    let central = states.compartment(0);
    assert_relative_eq!(central[1], 40.0);
    assert_relative_eq!(central[2], 40.0 * (-1.0_f64).exp(), max_relative = 1e-12);
}

#[test]
fn replace_overwrites_the_compartment() {
    let schedule = Schedule::builder(1.0)
        .bolus(0.0, 100.0, 1)
        .replace(5.0, 7.0, 1)
        .build();

    let states =
        simulate_subject(&mut one_cmt(), &schedule, &SimulationOptions::default()).unwrap();
    assert_eq!(states.compartment(0)[1], 7.0);
}

#[test]
fn dosing_into_an_off_compartment_fails() {
    let schedule = Schedule::builder(1.0)
        .toggle(0.0, -1)
        .bolus(1.0, 100.0, 1)
        .build();

    let result = simulate_subject(&mut one_cmt(), &schedule, &SimulationOptions::default());
    assert_eq!(
        result,
        Err(DosingError::CompartmentOff {
            action: "bolus dose",
            cmt: 1,
            time: 1.0
        })
    );
}

#[test]
fn toggled_compartment_accepts_doses_again() {
    let schedule = Schedule::builder(1.0)
        .toggle(0.0, -1)
        .toggle(1.0, 1)
        .bolus(1.0, 100.0, 1)
        .observation(2.0, 1)
        .build();

    let states =
        simulate_subject(&mut one_cmt(), &schedule, &SimulationOptions::default()).unwrap();
    let central = states.compartment(0);
    assert_relative_eq!(
        *central.last().unwrap(),
        100.0 * (-0.1_f64).exp(),
        max_relative = 1e-12
    );
}

#[test]
fn compartment_out_of_range_is_rejected() {
    let schedule = Schedule::builder(1.0).bolus(0.0, 100.0, 3).build();
    let result = simulate_subject(&mut one_cmt(), &schedule, &SimulationOptions::default());
    assert_eq!(
        result,
        Err(DosingError::InvalidCompartment {
            cmt: 3,
            neq: 1,
            evid: 1
        })
    );
}

#[test]
fn missing_interval_is_rejected() {
    let mut schedule = Schedule::builder(1.0).bolus(0.0, 100.0, 1).build();
    if let Some(Record::Dose(dose)) = schedule.records_mut().first_mut() {
        dose.set_addl(2);
    }
    let result = simulate_subject(&mut one_cmt(), &schedule, &SimulationOptions::default());
    assert!(matches!(result, Err(DosingError::MissingInterval { .. })));
}

#[test]
fn raw_kind_codes() {
    for evid in [0u32, 1, 2, 3, 4, 5, 8, 9, 11, 100] {
        let kind = EventKind::try_from(evid).unwrap();
        assert_eq!(kind.evid(), evid);
    }
    assert_eq!(
        EventKind::try_from(6u32),
        Err(DosingError::UnknownEvid { evid: 6 })
    );
}

#[test]
fn population_runs_every_subject() {
    let schedules: Vec<Schedule> = (1..=4)
        .map(|i| {
            Schedule::builder(i as f64)
                .bolus(0.0, 100.0, 1)
                .addl(2, 12.0)
                .observation(36.0, 1)
                .build()
        })
        .chain(std::iter::once(Schedule::new(5.0, vec![])))
        .collect();

    let results = simulate_population(&one_cmt(), &schedules, &SimulationOptions::default());
    assert_eq!(results.len(), 5);
    for result in &results[..4] {
        let states = result.as_ref().unwrap();
        let expected = 100.0 * ((-3.6_f64).exp() + (-2.4_f64).exp() + (-1.2_f64).exp());
        assert_relative_eq!(states.compartment(0)[1], expected, max_relative = 1e-12);
    }
    assert_eq!(results[4], Err(DosingError::EmptySchedule));
}
