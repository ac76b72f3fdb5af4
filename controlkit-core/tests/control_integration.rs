//! Integration tests for controllers
//!
//! Tests controllers in closed loop with simulated plants:
//! - PID anti-windup on setpoint changes
//! - PID regulating a first-order lag
//! - Full-state feedback on an estimated double integrator
//! - Swapping input sources at runtime

#![cfg(test)]

#[macro_use]
mod common;

use std::cell::Cell;

use controlkit_core::{
    control::BoxedSource, Constant, ControlError, Controller, Error, Estimator, KalmanFilter,
    KalmanModel, OutputLimits, Pid, PidGains, StateFeedback, StateSpace,
};

use common::harness::TestRng;

#[test]
fn test_set_target_matches_fresh_controller() {
    let gains = PidGains::new(1.5, 0.8, 0.05);
    let input = Cell::new(0.0_f64);
    let mut seasoned = Pid::new(gains, || input.get());
    seasoned.set_target(4.0);

    // Wind up the integral with a persistent error
    for _ in 0..50 {
        seasoned.calculate(0.1).unwrap();
    }
    assert!(seasoned.integral_sum() > 10.0);

    // Fresh controller that has seen the same last error
    let fresh_input = Cell::new(0.0_f64);
    let mut fresh = Pid::new(gains, || fresh_input.get());
    fresh.set_target(4.0);
    fresh.calculate(0.1).unwrap();
    assert_eq!(fresh.last_error(), seasoned.last_error());

    seasoned.set_target(1.0);
    fresh.set_target(1.0);
    assert_eq!(seasoned.integral_sum(), 0.0);

    for step in 0..20 {
        let y = 0.05 * step as f64;
        input.set(y);
        fresh_input.set(y);
        assert_eq!(seasoned.calculate(0.1).unwrap(), fresh.calculate(0.1).unwrap());
    }
}

#[test]
fn test_pid_regulates_first_order_lag() {
    let tau = 1.0;
    let dt = 0.01;
    let plant = Cell::new(0.0_f64);

    let mut pid = Pid::new(PidGains::new(2.0, 1.0, 0.0), || plant.get())
        .with_limits(OutputLimits { min: -5.0, max: 5.0 })
        .unwrap();
    pid.set_target(1.0);

    for _ in 0..2000 {
        let u = pid.calculate(dt).unwrap();
        assert!((-5.0..=5.0).contains(&u));
        plant.set(plant.get() + dt * (-plant.get() + u) / tau);
    }

    assert_within_tolerance!(plant.get(), 1.0, 0.01);
    assert_within_tolerance!(pid.last_input(), plant.get(), 0.01);
}

#[test]
fn test_integral_saturation_limits_overshoot() {
    // Actuator far too weak to reach the target: the integral would run away
    let plant = Cell::new(0.0_f64);
    let mut pid = Pid::new(PidGains::new(0.0, 5.0, 0.0), || plant.get())
        .with_limits(OutputLimits { min: -1.0, max: 1.0 })
        .unwrap();
    pid.set_integral_saturation(1.0).unwrap();
    pid.set_target(10.0);

    for _ in 0..500 {
        let u = pid.calculate(0.1).unwrap();
        plant.set(0.5 * u);
        assert!(pid.integral_sum().abs() <= 1.0);
    }

    // Reversing the setpoint does not have to unwind a huge sum first
    pid.set_target(-10.0);
    let u = pid.calculate(0.1).unwrap();
    assert!(u < 0.0, "output still wound up: {u}");
}

#[test]
fn test_state_feedback_on_estimated_state() -> Result<(), Error> {
    let dt = 0.05;
    let plant = StateSpace::strictly_proper(
        [[1.0, dt], [0.0, 1.0]],
        [[0.5 * dt * dt], [dt]],
        [[1.0, 0.0], [0.0, 1.0]],
    );
    let model = KalmanModel::<f64, 2, 2>::default()
        .with_transition(plant.a)
        .with_observation(plant.c)
        .with_process_noise_diagonal([1e-4, 1e-2])
        .with_measurement_noise_diagonal([0.0025, 0.0025]);
    let mut kf = KalmanFilter::with_initial(model, [[1.0, 0.0], [0.0, 1.0]], [0.0, 0.0]);

    let estimate = Cell::new(kf.estimate()?);
    let mut controller = StateFeedback::new([[4.0, 4.0]], || estimate.get());
    controller.set_output_limits([-2.0], [2.0])?;

    let mut rng = TestRng::new(7);
    let mut x = [1.0, 0.0];
    for _ in 0..200 {
        let u = controller.calculate(dt)?;
        assert!(u[0].abs() <= 2.0);
        assert_eq!(controller.last_input(), estimate.get());

        x = plant.propagate(&x, &u);
        let y = plant.output(&x, &u);
        let z = [y[0] + rng.gen_range(-0.05, 0.05), y[1] + rng.gen_range(-0.05, 0.05)];
        estimate.set(kf.step(&z)?);
    }

    assert_within_tolerance!(x[0], 0.0, 0.1);
    assert_within_tolerance!(x[1], 0.0, 0.1);
    Ok(())
}

#[test]
fn test_boxed_source_can_be_swapped() {
    let source: BoxedSource<'_, f64> = Box::new(|| 1.0);
    let mut pid = Pid::new(PidGains::new(1.0, 0.0, 0.0), source);
    pid.set_target(3.0);
    assert_eq!(pid.calculate(0.1).unwrap(), 2.0);

    let offset = 0.5;
    pid.set_source(Box::new(move || 2.0 + offset));
    assert_eq!(pid.error(), 0.5);
    assert_eq!(pid.last_input(), 2.5);
}

#[test]
fn test_controllers_share_one_interface() {
    fn tick<C: Controller<Real = f64>>(controller: &mut C, ticks: usize) -> Vec<C::Output> {
        (0..ticks).map(|_| controller.calculate(0.02).unwrap()).collect()
    }

    let mut pid = Pid::new(PidGains::new(1.0, 0.0, 0.0), Constant(0.25));
    pid.set_target(1.0);
    assert_eq!(tick(&mut pid, 3), vec![0.75; 3]);

    let mut sf = StateFeedback::new([[2.0, 0.0], [0.0, 1.0]], Constant([1.0, -1.0]));
    assert_eq!(tick(&mut sf, 2), vec![[-2.0, 1.0]; 2]);
}

#[test]
fn test_overflowing_gains_never_escape_the_limits() {
    let mut pid = Pid::new(PidGains::new(1e308, 1e308, -1e308), Constant(0.0_f64))
        .with_limits(OutputLimits { min: -1.0, max: 1.0 })
        .unwrap();
    pid.set_target(10.0);

    match pid.calculate(0.001) {
        Ok(u) => assert!((-1.0..=1.0).contains(&u)),
        Err(err) => assert_eq!(err, ControlError::IndeterminateOutput),
    }
    assert!((-1.0..=1.0).contains(&pid.last_output()));
}

#[test]
fn test_zero_time_step_is_an_error() {
    let mut pid = Pid::new(PidGains::new(1.0, 1.0, 1.0), Constant(0.0));
    let err = pid.calculate(0.0).unwrap_err();
    assert_eq!(err, ControlError::InvalidTimeStep { dt: 0.0 });

    let loop_err: Error = err.into();
    assert!(matches!(loop_err, Error::Control(_)));
}
