//! CTRV prediction: augmented sigma points pushed through the motion model,
//! then recombined into a predicted mean and covariance.

use crate::angle::normalize_angle;
use crate::error::Result;
use crate::sigma::SigmaPointGenerator;
use crate::state::{
    AugStateVector, SigmaPoints, StateCovariance, StateEstimate, StateVector, Weights, N_SIGMA,
    PX, PY, V, YAW, YAW_RATE,
};

/// Prediction result. The propagated sigma points are kept for the
/// corrector that runs in the same cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub estimate: StateEstimate,
    pub sigma_points: SigmaPoints,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPropagator {
    generator: SigmaPointGenerator,
    yaw_rate_threshold: f64,
}

impl MotionPropagator {
    pub fn new(generator: SigmaPointGenerator, yaw_rate_threshold: f64) -> Self {
        Self {
            generator,
            yaw_rate_threshold,
        }
    }

    pub fn weights(&self) -> &Weights {
        self.generator.weights()
    }

    /// Predicts `estimate` forward by `dt` seconds.
    pub fn predict(&self, estimate: &StateEstimate, dt: f64) -> Result<Prediction> {
        let sigma_aug = self.generator.generate(estimate.mean(), estimate.covariance())?;
        let mut sigma_points = SigmaPoints::zeros();
        for i in 0..N_SIGMA {
            let point = sigma_aug.column(i).into_owned();
            sigma_points.set_column(i, &ctrv(&point, dt, self.yaw_rate_threshold));
        }
        let (x, p) = unscented_transform(&sigma_points, self.weights());
        let mut predicted = *estimate;
        predicted.set(x, p);
        Ok(Prediction {
            estimate: predicted,
            sigma_points,
        })
    }
}

/// Propagates one augmented sigma point (px, py, v, yaw, yawd, nu_a, nu_yawdd)
/// through the CTRV model over `dt`.
pub fn ctrv(point: &AugStateVector, dt: f64, yaw_rate_threshold: f64) -> StateVector {
    let px = point[PX];
    let py = point[PY];
    let v = point[V];
    let yaw = point[YAW];
    let yawd = point[YAW_RATE];
    let nu_a = point[5];
    let nu_yawdd = point[6];

    let (dpx, dpy) = if yawd.abs() > yaw_rate_threshold {
        (
            v / yawd * ((yaw + yawd * dt).sin() - yaw.sin()),
            v / yawd * (yaw.cos() - (yaw + yawd * dt).cos()),
        )
    } else {
        // 直進
        (v * yaw.cos() * dt, v * yaw.sin() * dt)
    };

    let dt2 = 0.5 * dt * dt;
    na::vector![
        px + dpx + dt2 * yaw.cos() * nu_a,
        py + dpy + dt2 * yaw.sin() * nu_a,
        v + dt * nu_a,
        yaw + yawd * dt + dt2 * nu_yawdd,
        yawd + dt * nu_yawdd
    ]
}

/// Weighted mean and covariance of predicted sigma points, heading wrapped.
pub fn unscented_transform(sigmas: &SigmaPoints, w: &Weights) -> (StateVector, StateCovariance) {
    let x = sigmas * w;
    let mut p = StateCovariance::zeros();
    for i in 0..N_SIGMA {
        let d = state_diff(&sigmas.column(i).into_owned(), &x);
        p += w[i] * d * d.transpose();
    }
    (x, p)
}

/// `a - b` with the heading component wrapped.
pub fn state_diff(a: &StateVector, b: &StateVector) -> StateVector {
    let mut d = a - b;
    d[YAW] = normalize_angle(d[YAW]);
    d
}
