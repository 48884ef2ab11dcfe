//! Radar correction through a second unscented transform over the
//! predicted sigma points.

use crate::angle::normalize_angle;
use crate::error::{Result, Stage, UkfError};
use crate::motion::{state_diff, Prediction};
use crate::state::{
    RadarSigmaPoints, SigmaPoints, StateEstimate, StateVector, Weights, N_SIGMA, N_X, PX, PY,
    V, YAW,
};

// measurement layout
pub const RHO: usize = 0;
pub const PHI: usize = 1;
pub const RHO_DOT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarCorrector {
    r: na::Matrix3<f64>,
    range_floor: f64,
    origin_epsilon: f64,
}

impl RadarCorrector {
    pub fn new(r: na::Matrix3<f64>, range_floor: f64, origin_epsilon: f64) -> Self {
        Self {
            r,
            range_floor,
            origin_epsilon,
        }
    }

    /// Maps one state into (range, bearing, range rate).
    ///
    /// A state sitting on the sensor origin is moved to
    /// (range_floor, range_floor) first so the range rate stays finite.
    pub fn measurement_model(&self, x: &StateVector) -> na::Vector3<f64> {
        let (mut px, mut py) = (x[PX], x[PY]);
        if px.abs() < self.origin_epsilon && py.abs() < self.origin_epsilon {
            px = self.range_floor;
            py = self.range_floor;
        }
        let v = x[V];
        let yaw = x[YAW];
        let rho = (px * px + py * py).sqrt();
        na::vector![
            rho,
            py.atan2(px),
            (px * yaw.cos() * v + py * yaw.sin() * v) / rho
        ]
    }

    pub fn measurement_sigma_points(&self, sigma_points: &SigmaPoints) -> RadarSigmaPoints {
        let mut z_sig = RadarSigmaPoints::zeros();
        for i in 0..N_SIGMA {
            let x = sigma_points.column(i).into_owned();
            z_sig.set_column(i, &self.measurement_model(&x));
        }
        z_sig
    }

    /// Corrects the predicted estimate with radar measurement `z`.
    /// Returns the corrected estimate and the NIS of the innovation.
    pub fn correct(
        &self,
        prediction: &Prediction,
        weights: &Weights,
        z: &na::Vector3<f64>,
    ) -> Result<(StateEstimate, f64)> {
        let x = prediction.estimate.mean();
        let p = prediction.estimate.covariance();
        let z_sig = self.measurement_sigma_points(&prediction.sigma_points);
        let z_pred = z_sig * weights;

        // 観測の共分散と相互共分散
        let mut s = na::Matrix3::<f64>::zeros();
        let mut t = na::SMatrix::<f64, N_X, 3>::zeros();
        for i in 0..N_SIGMA {
            let z_diff = measurement_diff(&z_sig.column(i).into_owned(), &z_pred);
            let x_diff = state_diff(&prediction.sigma_points.column(i).into_owned(), x);
            s += weights[i] * z_diff * z_diff.transpose();
            t += weights[i] * x_diff * z_diff.transpose();
        }
        s += self.r;

        let s_inv = s.try_inverse().ok_or(UkfError::NumericalSingularity {
            stage: Stage::RadarInnovation,
        })?;
        let k = t * s_inv;

        let z_diff = measurement_diff(z, &z_pred);
        let x = x + k * z_diff;
        let p = p - k * s * k.transpose();
        let nis = (z_diff.transpose() * s_inv * z_diff)[0];

        let mut corrected = prediction.estimate;
        corrected.set(x, p);
        Ok((corrected, nis))
    }
}

/// `a - b` with the bearing component wrapped.
pub fn measurement_diff(a: &na::Vector3<f64>, b: &na::Vector3<f64>) -> na::Vector3<f64> {
    let mut d = a - b;
    d[PHI] = normalize_angle(d[PHI]);
    d
}
