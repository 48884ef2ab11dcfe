use log::warn;

use crate::angle::normalize_angle;

/// Dimension of the CTRV state (px, py, v, yaw, yaw rate).
pub const N_X: usize = 5;
/// State plus longitudinal and yaw acceleration noise.
pub const N_AUG: usize = 7;
/// Number of sigma points.
pub const N_SIGMA: usize = 2 * N_AUG + 1;

// state vector layout
pub const PX: usize = 0;
pub const PY: usize = 1;
pub const V: usize = 2;
pub const YAW: usize = 3;
pub const YAW_RATE: usize = 4;

pub type StateVector = na::SVector<f64, N_X>;
pub type StateCovariance = na::SMatrix<f64, N_X, N_X>;
pub type AugStateVector = na::SVector<f64, N_AUG>;
pub type AugCovariance = na::SMatrix<f64, N_AUG, N_AUG>;
pub type Sigma<const S: usize> = na::SMatrix<f64, S, N_SIGMA>;
pub type AugSigmaPoints = Sigma<N_AUG>;
pub type SigmaPoints = Sigma<N_X>;
pub type RadarSigmaPoints = Sigma<3>;
pub type Weights = na::SVector<f64, N_SIGMA>;

/// Smallest eigenvalue a repaired covariance is allowed to keep.
pub const COVARIANCE_FLOOR: f64 = 1e-6;

/// Mean and covariance of the tracked object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateEstimate {
    x: StateVector,
    p: StateCovariance,
}

impl StateEstimate {
    pub fn new(x: StateVector, p: StateCovariance) -> Self {
        Self { x, p }
    }

    pub fn mean(&self) -> &StateVector {
        &self.x
    }

    pub fn covariance(&self) -> &StateCovariance {
        &self.p
    }

    pub fn position(&self) -> na::Vector2<f64> {
        na::Vector2::new(self.x[PX], self.x[PY])
    }

    pub fn speed(&self) -> f64 {
        self.x[V]
    }

    /// Heading wrapped into (-π, π]. The stored mean is left unwrapped.
    pub fn yaw(&self) -> f64 {
        normalize_angle(self.x[YAW])
    }

    pub fn yaw_rate(&self) -> f64 {
        self.x[YAW_RATE]
    }

    /// Velocity in Cartesian coordinates.
    pub fn velocity(&self) -> na::Vector2<f64> {
        let yaw = self.x[YAW];
        self.x[V] * na::Vector2::new(yaw.cos(), yaw.sin())
    }

    pub fn is_positive_definite(&self) -> bool {
        self.p.cholesky().is_some()
    }

    /// Stores a new mean and covariance. The covariance is symmetrised and,
    /// if it is no longer positive definite, repaired.
    pub(crate) fn set(&mut self, x: StateVector, p: StateCovariance) {
        self.x = x;
        self.p = condition_covariance(&p).0;
    }
}

/// Symmetrises `p`; when the result is not positive definite its
/// eigenvalues are clipped to [`COVARIANCE_FLOOR`].
///
/// The negative centre weight of the sigma point set (λ = -4) lets the
/// reconstructed covariance go indefinite under strong nonlinearity.
pub fn condition_covariance(p: &StateCovariance) -> (StateCovariance, bool) {
    // 対称性の維持
    let p = (p + p.transpose()) / 2.0;
    if p.cholesky().is_some() {
        return (p, false);
    }
    let mut eig = p.symmetric_eigen();
    warn!(
        "covariance not positive definite (min eigenvalue {:e}), clipping",
        eig.eigenvalues.min()
    );
    eig.eigenvalues.apply(|v| *v = v.max(COVARIANCE_FLOOR));
    let p = eig.recompose();
    ((p + p.transpose()) / 2.0, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn accessors() {
        let x = na::vector![1.0, 2.0, 3.0, 7.0, 0.1];
        let est = StateEstimate::new(x, StateCovariance::identity());
        assert_eq!(est.position(), na::Vector2::new(1.0, 2.0));
        assert_eq!(est.speed(), 3.0);
        assert_abs_diff_eq!(est.yaw(), 7.0 - 2.0 * core::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(est.mean()[YAW], 7.0);
        assert_abs_diff_eq!(est.velocity().norm(), 3.0, epsilon = 1e-12);
        assert_eq!(est.yaw_rate(), 0.1);
    }

    #[test]
    fn set_keeps_covariance_symmetric() {
        let mut est = StateEstimate::new(StateVector::zeros(), StateCovariance::identity());
        let mut p = StateCovariance::identity();
        p[(0, 1)] = 0.2;
        p[(1, 0)] = 0.4;
        est.set(StateVector::zeros(), p);
        assert_eq!(est.covariance()[(0, 1)], est.covariance()[(1, 0)]);
        assert_abs_diff_eq!(est.covariance()[(0, 1)], 0.3, epsilon = 1e-15);
        assert!(est.is_positive_definite());
    }

    #[test]
    fn indefinite_covariance_is_repaired() {
        let mut p = StateCovariance::identity();
        p[(0, 1)] = 2.0;
        p[(1, 0)] = 2.0;
        let (repaired, clipped) = condition_covariance(&p);
        assert!(clipped);
        assert_eq!(repaired, repaired.transpose());
        assert!(repaired.cholesky().is_some());
        let eig = repaired.symmetric_eigenvalues();
        assert!(eig.min() >= COVARIANCE_FLOOR * 0.5);
        // the healthy directions are kept
        assert_abs_diff_eq!(eig.max(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(repaired[(2, 2)], 1.0, epsilon = 1e-9);

        let (same, clipped) = condition_covariance(&StateCovariance::identity());
        assert!(!clipped);
        assert_eq!(same, StateCovariance::identity());
    }

    #[test]
    fn set_repairs_indefinite_covariance() {
        let mut p = StateCovariance::identity();
        p[(0, 1)] = 2.0;
        p[(1, 0)] = 2.0;
        let mut est = StateEstimate::new(StateVector::zeros(), StateCovariance::identity());
        est.set(StateVector::zeros(), p);
        assert!(est.is_positive_definite());
    }
}
