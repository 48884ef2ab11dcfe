use crate::error::{Result, Stage, UkfError};
use crate::state::{StateCovariance, StateEstimate, N_X};

/// Linear Kalman correction with a position-only measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidarCorrector {
    h: na::SMatrix<f64, 2, N_X>,
    r: na::Matrix2<f64>,
}

impl LidarCorrector {
    pub fn new(r: na::Matrix2<f64>) -> Self {
        let h = na::matrix![
            1.0, 0.0, 0.0, 0.0, 0.0;
            0.0, 1.0, 0.0, 0.0, 0.0;
        ];
        Self { h, r }
    }

    /// Corrects `estimate` with lidar position `z`. Returns the corrected
    /// estimate and the NIS of the innovation.
    pub fn correct(
        &self,
        estimate: &StateEstimate,
        z: &na::Vector2<f64>,
    ) -> Result<(StateEstimate, f64)> {
        let x = estimate.mean();
        let p = estimate.covariance();
        let y = z - self.h * x;
        let s = self.h * p * self.h.transpose() + self.r;
        let s_inv = s.try_inverse().ok_or(UkfError::NumericalSingularity {
            stage: Stage::LidarInnovation,
        })?;
        let k = p * self.h.transpose() * s_inv;

        let x = x + k * y;
        let p = (StateCovariance::identity() - k * self.h) * p;
        let nis = (y.transpose() * s_inv * y)[0];

        let mut corrected = *estimate;
        corrected.set(x, p);
        Ok((corrected, nis))
    }
}
