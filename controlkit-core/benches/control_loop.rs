//! Per-tick cost of the estimator and controllers

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use controlkit_core::{
    Constant, Controller, KalmanFilter, KalmanModel, Pid, PidGains, StateFeedback,
};

fn kalman_step(c: &mut Criterion) {
    let dt = 1.0 / 30.0;
    let model = KalmanModel::<f32, 3, 1>::default()
        .with_transition([[1.0, dt, 0.0], [0.0, 1.0, dt], [0.0, 0.0, 1.0]])
        .with_process_noise_diagonal([0.05, 0.05, 0.0])
        .with_measurement_noise_diagonal([5.0]);
    let p0 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut kf = KalmanFilter::with_initial(model, p0, [0.0; 3]);

    c.bench_function("kalman_3x1_predict_correct", |b| {
        b.iter(|| {
            kf.time_update().unwrap();
            kf.measurement_update(black_box(&[1.0])).unwrap()
        })
    });
}

fn controller_tick(c: &mut Criterion) {
    let mut pid = Pid::new(PidGains::new(1.2f32, 0.4, 0.05), Constant(0.3));
    pid.set_target(1.0);
    c.bench_function("pid_tick", |b| b.iter(|| pid.calculate(black_box(0.01)).unwrap()));

    let gain = [[1.0f32, 0.5, 0.1, 0.0], [0.0, 0.2, 1.0, 0.3]];
    let mut sf = StateFeedback::new(gain, Constant([0.1, -0.2, 0.3, 0.0]));
    c.bench_function("state_feedback_4x2_tick", |b| {
        b.iter(|| sf.calculate(black_box(0.01)).unwrap())
    });
}

criterion_group!(benches, kalman_step, controller_tick);
criterion_main!(benches);
