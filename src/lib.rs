//! Unscented Kalman filter for a single object moving under a constant
//! turn rate and velocity (CTRV) model, fusing lidar positions and radar
//! range / bearing / range rate.
//!
//! ```no_run
//! use ctrv_ukf::{Measurement, UkfConfig, UnscentedKalmanFilter};
//!
//! let mut ukf = UnscentedKalmanFilter::new(UkfConfig::default())?;
//! ukf.process(&Measurement::lidar(1.0, 0.5, 0))?;
//! ukf.process(&Measurement::radar(1.15, 0.45, 0.4, 50_000))?;
//! println!("{:?} nis {}", ukf.state(), ukf.nis_radar());
//! # Ok::<(), ctrv_ukf::UkfError>(())
//! ```

extern crate nalgebra as na;

pub mod angle;
pub mod config;
pub mod error;
pub mod lidar;
pub mod measurement;
pub mod motion;
pub mod nis;
pub mod radar;
pub mod sigma;
pub mod state;
pub mod ukf;

pub use angle::normalize_angle;
pub use config::UkfConfig;
pub use error::{Result, Stage, UkfError};
pub use measurement::{Measurement, Observation, SensorKind};
pub use nis::NisMonitor;
pub use state::{StateCovariance, StateEstimate, StateVector};
pub use ukf::{Outcome, UnscentedKalmanFilter};
