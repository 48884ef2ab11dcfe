//! Shared helpers for the integration tests: a noisy CTRV target and
//! lidar / radar sensors observing it from the origin.

#![allow(dead_code)]

use ctrv_ukf::motion::ctrv;
use ctrv_ukf::state::{AugStateVector, StateVector};
use ctrv_ukf::{Measurement, UkfConfig};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn init_logger() {
    // several tests share the process; only the first install wins
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .init();
}

pub struct Target {
    pub truth: StateVector,
    rng: Xoshiro256PlusPlus,
    accel: Normal<f64>,
    yaw_accel: Normal<f64>,
}

impl Target {
    pub fn new(seed: u64, truth: StateVector) -> Self {
        Self {
            truth,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            accel: Normal::new(0.0, 0.2).unwrap(),
            yaw_accel: Normal::new(0.0, 0.2).unwrap(),
        }
    }

    pub fn step(&mut self, dt: f64) {
        let mut aug = AugStateVector::zeros();
        aug.fixed_rows_mut::<5>(0).copy_from(&self.truth);
        aug[5] = self.accel.sample(&mut self.rng);
        aug[6] = self.yaw_accel.sample(&mut self.rng);
        self.truth = ctrv(&aug, dt, 1e-3);
    }

    pub fn lidar(&mut self, config: &UkfConfig, timestamp_us: u64) -> Measurement {
        let nx = Normal::new(0.0, config.std_laspx).unwrap();
        let ny = Normal::new(0.0, config.std_laspy).unwrap();
        Measurement::lidar(
            self.truth[0] + nx.sample(&mut self.rng),
            self.truth[1] + ny.sample(&mut self.rng),
            timestamp_us,
        )
    }

    pub fn radar(&mut self, config: &UkfConfig, timestamp_us: u64) -> Measurement {
        let (px, py, v, yaw) = (self.truth[0], self.truth[1], self.truth[2], self.truth[3]);
        let rho = (px * px + py * py).sqrt();
        let phi = py.atan2(px);
        let rho_dot = (px * yaw.cos() * v + py * yaw.sin() * v) / rho;
        let nr = Normal::new(0.0, config.std_radr).unwrap();
        let nphi = Normal::new(0.0, config.std_radphi).unwrap();
        let nrd = Normal::new(0.0, config.std_radrd).unwrap();
        Measurement::radar(
            rho + nr.sample(&mut self.rng),
            phi + nphi.sample(&mut self.rng),
            rho_dot + nrd.sample(&mut self.rng),
            timestamp_us,
        )
    }
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_eigenvalue(p: &ctrv_ukf::StateCovariance) -> f64 {
    p.symmetric_eigenvalues().min()
}
