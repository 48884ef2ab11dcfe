mod common;

use common::{min_eigenvalue, Target};
use ctrv_ukf::{Measurement, Outcome, SensorKind, UkfConfig, UnscentedKalmanFilter};

const STEPS: u64 = 200;
const DT_US: u64 = 50_000;

/// Tracks a simulated target with alternating lidar / radar fixes, checks
/// the covariance after every cycle and returns the position RMSE over the
/// second half of the run.
fn track(seed: u64, truth: nalgebra::Vector5<f64>) -> f64 {
    let config = UkfConfig::default();
    let mut ukf = UnscentedKalmanFilter::new(config.clone()).unwrap();
    let mut target = Target::new(seed, truth);

    let first = target.lidar(&config, 0);
    assert!(matches!(
        ukf.process(&first),
        Ok(Outcome::Initialized { .. })
    ));

    let mut sq_err = Vec::new();
    for k in 1..STEPS {
        target.step(DT_US as f64 / 1e6);
        let t = k * DT_US;
        let m: Measurement = if k % 2 == 0 {
            target.lidar(&config, t)
        } else {
            target.radar(&config, t)
        };
        let ahead = ukf.predicted(t).unwrap();
        let p = ahead.covariance();
        assert_eq!(*p, p.transpose(), "seed {seed}, step {k}: predicted");
        assert!(min_eigenvalue(p) >= 0.0, "seed {seed}, step {k}: predicted {p}");

        match ukf.process(&m) {
            Ok(Outcome::Updated { nis, .. }) => assert!(nis >= 0.0 && nis.is_finite()),
            other => panic!("seed {seed}, step {k}: {other:?}"),
        }

        let p = ukf.covariance();
        assert_eq!(*p, p.transpose(), "seed {seed}, step {k}");
        assert!(min_eigenvalue(p) > 0.0, "seed {seed}, step {k}: {p}");
        assert!(ukf.state().iter().all(|v| v.is_finite()));

        let err = ukf.estimate().position() - target.truth.fixed_rows::<2>(0);
        sq_err.push(err.norm_squared());
    }

    let tail = &sq_err[sq_err.len() / 2..];
    (tail.iter().sum::<f64>() / tail.len() as f64).sqrt()
}

#[test]
fn gentle_turn_stays_consistent() {
    common::init_logger();
    for seed in 0..6 {
        let rmse = track(seed, nalgebra::vector![5.0, 5.0, 5.0, 0.3, 0.2]);
        assert!(rmse < 0.3, "seed {seed}: rmse {rmse}");
    }
}

#[test]
fn far_target_stays_consistent() {
    common::init_logger();
    for seed in 10..16 {
        let rmse = track(seed, nalgebra::vector![12.0, 4.0, 4.0, 0.8, -0.2]);
        assert!(rmse < 0.3, "seed {seed}: rmse {rmse}");
    }
}

#[test]
fn nis_mostly_within_chi2_bounds() {
    let config = UkfConfig::default();
    let mut ukf = UnscentedKalmanFilter::new(config.clone()).unwrap();
    let mut target = Target::new(42, nalgebra::vector![5.0, 5.0, 5.0, 0.3, 0.2]);
    ukf.process(&target.lidar(&config, 0)).unwrap();
    for k in 1..400 {
        target.step(DT_US as f64 / 1e6);
        let m = if k % 2 == 0 {
            target.lidar(&config, k * DT_US)
        } else {
            target.radar(&config, k * DT_US)
        };
        ukf.process(&m).unwrap();
    }

    let monitor = ukf.nis_monitor();
    for sensor in [SensorKind::Lidar, SensorKind::Radar] {
        let counter = monitor.counter(sensor);
        assert!(counter.count > 150);
        let fraction = counter.fraction_above_95().unwrap();
        assert!(fraction < 0.35, "{sensor}: {fraction}");
    }
}

#[test]
fn disabled_radar_tracks_on_lidar_alone() {
    let config = UkfConfig::default().with_sensors(true, false);
    let mut ukf = UnscentedKalmanFilter::new(config.clone()).unwrap();
    let mut target = Target::new(7, nalgebra::vector![5.0, 5.0, 5.0, 0.3, 0.2]);
    ukf.process(&target.lidar(&config, 0)).unwrap();

    let mut ignored = 0;
    let mut err = f64::NAN;
    for k in 1..STEPS {
        target.step(DT_US as f64 / 1e6);
        let m = if k % 2 == 0 {
            target.lidar(&config, k * DT_US)
        } else {
            target.radar(&config, k * DT_US)
        };
        match ukf.process(&m) {
            Ok(Outcome::Ignored { .. }) => ignored += 1,
            Ok(Outcome::Updated { .. }) => {
                err = (ukf.estimate().position() - target.truth.fixed_rows::<2>(0)).norm();
                assert!(ukf.estimate().is_positive_definite());
            }
            other => panic!("step {k}: {other:?}"),
        }
    }
    assert_eq!(ignored, (STEPS as usize) / 2);
    assert_eq!(ukf.nis_monitor().counter(SensorKind::Radar).count, 0);
    assert!(err < 0.5, "error at the last lidar fix {err}");
}
