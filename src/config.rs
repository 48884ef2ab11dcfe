use crate::error::{Result, UkfError};
use crate::state::StateCovariance;

/// Noise model and tuning of the filter. Never mutated by the filter itself.
#[derive(Debug, Clone, PartialEq)]
pub struct UkfConfig {
    /// Longitudinal acceleration noise std-dev [m/s^2]
    pub std_a: f64,
    /// Yaw acceleration noise std-dev [rad/s^2]
    pub std_yawdd: f64,
    /// Lidar position noise std-dev [m]
    pub std_laspx: f64,
    pub std_laspy: f64,
    /// Radar range noise std-dev [m]
    pub std_radr: f64,
    /// Radar bearing noise std-dev [rad]
    pub std_radphi: f64,
    /// Radar range rate noise std-dev [m/s]
    pub std_radrd: f64,
    /// Covariance the filter starts from on the first measurement.
    pub initial_covariance: StateCovariance,
    /// When false, lidar measurements are ignored after initialisation.
    pub use_lidar: bool,
    /// When false, radar measurements are ignored after initialisation.
    pub use_radar: bool,
    /// Below this |yaw rate| [rad/s] the motion model drives straight.
    pub yaw_rate_threshold: f64,
    /// Position floor used when a sigma point sits on the radar origin.
    pub range_floor: f64,
    /// |px| and |py| both below this count as "on the origin".
    pub origin_epsilon: f64,
}

impl Default for UkfConfig {
    fn default() -> Self {
        Self {
            std_a: 0.4,
            std_yawdd: 0.65,
            std_laspx: 0.15,
            std_laspy: 0.15,
            std_radr: 0.3,
            std_radphi: 0.03,
            std_radrd: 0.3,
            initial_covariance: StateCovariance::from_diagonal(&na::vector![
                1.0, 1.0, 100.0, 1.0, 100.0
            ]),
            use_lidar: true,
            use_radar: true,
            yaw_rate_threshold: 1e-3,
            range_floor: 0.01,
            origin_epsilon: 1e-3,
        }
    }
}

impl UkfConfig {
    pub fn with_process_noise(mut self, std_a: f64, std_yawdd: f64) -> Self {
        self.std_a = std_a;
        self.std_yawdd = std_yawdd;
        self
    }

    pub fn with_lidar_noise(mut self, std_px: f64, std_py: f64) -> Self {
        self.std_laspx = std_px;
        self.std_laspy = std_py;
        self
    }

    pub fn with_radar_noise(mut self, std_r: f64, std_phi: f64, std_rd: f64) -> Self {
        self.std_radr = std_r;
        self.std_radphi = std_phi;
        self.std_radrd = std_rd;
        self
    }

    pub fn with_initial_covariance(mut self, p: StateCovariance) -> Self {
        self.initial_covariance = p;
        self
    }

    pub fn with_sensors(mut self, use_lidar: bool, use_radar: bool) -> Self {
        self.use_lidar = use_lidar;
        self.use_radar = use_radar;
        self
    }

    /// Process noise covariance diag(std_a², std_yawdd²).
    pub fn process_noise(&self) -> na::Matrix2<f64> {
        na::Matrix2::from_diagonal(&na::vector![
            self.std_a * self.std_a,
            self.std_yawdd * self.std_yawdd
        ])
    }

    pub fn lidar_noise(&self) -> na::Matrix2<f64> {
        na::Matrix2::from_diagonal(&na::vector![
            self.std_laspx * self.std_laspx,
            self.std_laspy * self.std_laspy
        ])
    }

    pub fn radar_noise(&self) -> na::Matrix3<f64> {
        na::Matrix3::from_diagonal(&na::vector![
            self.std_radr * self.std_radr,
            self.std_radphi * self.std_radphi,
            self.std_radrd * self.std_radrd
        ])
    }

    pub fn validate(&self) -> Result<()> {
        let stds = [
            self.std_a,
            self.std_yawdd,
            self.std_laspx,
            self.std_laspy,
            self.std_radr,
            self.std_radphi,
            self.std_radrd,
        ];
        if stds.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(UkfError::InvalidConfig(
                "noise std-dev must be finite and non-negative",
            ));
        }
        if !(self.yaw_rate_threshold > 0.0 && self.range_floor > 0.0 && self.origin_epsilon > 0.0)
        {
            return Err(UkfError::InvalidConfig("guard thresholds must be positive"));
        }
        let p = self.initial_covariance;
        if (p - p.transpose()).amax() > 1e-12 || p.cholesky().is_none() {
            return Err(UkfError::InvalidConfig(
                "initial covariance must be symmetric positive definite",
            ));
        }
        Ok(())
    }
}
