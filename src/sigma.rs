use crate::error::{Result, Stage, UkfError};
use crate::state::{
    AugSigmaPoints, AugStateVector, StateCovariance, StateVector, Weights, N_AUG, N_X,
};

/// Spreading parameter λ = 3 - n_aug.
pub const LAMBDA: f64 = 3.0 - N_AUG as f64;

/// Builds the augmented sigma point constellation.
///
/// The augmented state is (x, 0, 0) with covariance blockdiag(P, Q), where
/// Q = diag(std_a², std_yawdd²). Because the matrix is block diagonal its
/// lower Cholesky factor is blockdiag(chol(P), diag(std_a, std_yawdd)), so
/// only the 5x5 block is factorised. This also keeps zero process noise legal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaPointGenerator {
    std_a: f64,
    std_yawdd: f64,
    weights: Weights,
}

impl SigmaPointGenerator {
    // C := λ + n_aug
    const C: f64 = LAMBDA + N_AUG as f64;

    pub fn new(std_a: f64, std_yawdd: f64) -> Self {
        Self {
            std_a,
            std_yawdd,
            weights: Self::sigma_weight(),
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// w0 = λ/(λ+n_aug), wi = 1/(2(λ+n_aug)). w0 is negative for n_aug = 7.
    fn sigma_weight() -> Weights {
        let mut w = Weights::from_element(1.0 / (2.0 * Self::C));
        w[0] = LAMBDA / Self::C;
        w
    }

    pub fn augmented_mean(x: &StateVector) -> AugStateVector {
        let mut x_aug = AugStateVector::zeros();
        x_aug.fixed_rows_mut::<N_X>(0).copy_from(x);
        x_aug
    }

    /// Lower square root of blockdiag(P, Q).
    pub fn augmented_sqrt(&self, p: &StateCovariance) -> Result<na::SMatrix<f64, N_AUG, N_AUG>> {
        let l = p
            .cholesky()
            .ok_or(UkfError::NumericalSingularity {
                stage: Stage::AugmentedCovariance,
            })?
            .unpack();
        let mut a = na::SMatrix::<f64, N_AUG, N_AUG>::zeros();
        a.fixed_view_mut::<N_X, N_X>(0, 0).copy_from(&l);
        a[(N_X, N_X)] = self.std_a.abs();
        a[(N_X + 1, N_X + 1)] = self.std_yawdd.abs();
        Ok(a)
    }

    pub fn generate(&self, x: &StateVector, p: &StateCovariance) -> Result<AugSigmaPoints> {
        let x_aug = Self::augmented_mean(x);
        let l = Self::C.sqrt() * self.augmented_sqrt(p)?;
        let mut sigma_points = AugSigmaPoints::zeros();
        sigma_points.set_column(0, &x_aug);
        for i in 0..N_AUG {
            sigma_points.set_column(1 + i, &(x_aug + l.column(i)));
            sigma_points.set_column(1 + N_AUG + i, &(x_aug - l.column(i)));
        }
        Ok(sigma_points)
    }
}
