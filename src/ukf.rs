use log::{debug, trace, warn};

use crate::config::UkfConfig;
use crate::error::{Result, UkfError};
use crate::lidar::LidarCorrector;
use crate::measurement::{Measurement, Observation, SensorKind};
use crate::motion::{MotionPropagator, Prediction};
use crate::nis::NisMonitor;
use crate::radar::RadarCorrector;
use crate::sigma::SigmaPointGenerator;
use crate::state::{SigmaPoints, StateCovariance, StateEstimate, StateVector};

/// What a call to [`UnscentedKalmanFilter::process`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// First measurement; the state was set from its geometry.
    Initialized { sensor: SensorKind },
    /// Predict and correct ran. `dt` is in seconds.
    Updated { sensor: SensorKind, dt: f64, nis: f64 },
    /// The sensor is disabled in the configuration.
    Ignored { sensor: SensorKind },
}

/// CTRV unscented Kalman filter fusing lidar and radar.
///
/// Each call to [`process`](Self::process) is one complete cycle. If a cycle
/// fails nothing is committed: state, covariance, timestamp and NIS are
/// left as they were before the call.
#[derive(Debug, Clone)]
pub struct UnscentedKalmanFilter {
    config: UkfConfig,
    estimate: StateEstimate,
    initialized: bool,
    time_us: u64,
    propagator: MotionPropagator,
    lidar: LidarCorrector,
    radar: RadarCorrector,
    sigma_pred: SigmaPoints,
    nis_lidar: f64,
    nis_radar: f64,
    monitor: NisMonitor,
}

impl UnscentedKalmanFilter {
    pub fn new(config: UkfConfig) -> Result<Self> {
        config.validate()?;
        let generator = SigmaPointGenerator::new(config.std_a, config.std_yawdd);
        let propagator = MotionPropagator::new(generator, config.yaw_rate_threshold);
        let lidar = LidarCorrector::new(config.lidar_noise());
        let radar = RadarCorrector::new(
            config.radar_noise(),
            config.range_floor,
            config.origin_epsilon,
        );
        let estimate = StateEstimate::new(StateVector::zeros(), config.initial_covariance);
        Ok(Self {
            config,
            estimate,
            initialized: false,
            time_us: 0,
            propagator,
            lidar,
            radar,
            sigma_pred: SigmaPoints::from_element(f64::NAN),
            nis_lidar: 0.0,
            nis_radar: 0.0,
            monitor: NisMonitor::default(),
        })
    }

    /// Runs one cycle for `measurement`: initialisation on the first call,
    /// predict + correct afterwards. The corrector is chosen by the
    /// measurement's own sensor kind.
    pub fn process(&mut self, measurement: &Measurement) -> Result<Outcome> {
        let obs = measurement.observation().map_err(|e| {
            warn!("rejected measurement: {e}");
            e
        })?;
        let sensor = measurement.sensor;
        let timestamp_us = measurement.timestamp_us;

        if !self.initialized {
            self.initialize(&obs, timestamp_us);
            return Ok(Outcome::Initialized { sensor });
        }

        let dt = self.elapsed(timestamp_us)?;
        if !self.sensor_enabled(sensor) {
            debug!("{sensor} disabled, measurement at {timestamp_us} us ignored");
            return Ok(Outcome::Ignored { sensor });
        }

        let prediction = self.propagator.predict(&self.estimate, dt).map_err(|e| {
            warn!("prediction failed (dt = {dt} s): {e}");
            e
        })?;
        trace!("predicted mean {:?}", prediction.estimate.mean().as_slice());

        let (estimate, nis) = match obs {
            Observation::Lidar(z) => self.lidar.correct(&prediction.estimate, &z),
            Observation::Radar(z) => self
                .radar
                .correct(&prediction, self.propagator.weights(), &z),
        }
        .map_err(|e| {
            warn!("{sensor} correction failed: {e}");
            e
        })?;

        self.commit(&prediction, estimate, timestamp_us);
        match sensor {
            SensorKind::Lidar => self.nis_lidar = nis,
            SensorKind::Radar => self.nis_radar = nis,
        }
        self.monitor.record(sensor, nis);
        debug!("{sensor} update: dt = {dt} s, nis = {nis:.3}");

        Ok(Outcome::Updated { sensor, dt, nis })
    }

    /// State predicted to `timestamp_us` without touching the filter.
    pub fn predicted(&self, timestamp_us: u64) -> Result<StateEstimate> {
        if !self.initialized {
            return Err(UkfError::NotInitialized);
        }
        let dt = self.elapsed(timestamp_us)?;
        Ok(self.propagator.predict(&self.estimate, dt)?.estimate)
    }

    /// Back to the uninitialised state with the configured prior.
    pub fn reset(&mut self) {
        self.estimate = StateEstimate::new(StateVector::zeros(), self.config.initial_covariance);
        self.initialized = false;
        self.time_us = 0;
        self.sigma_pred = SigmaPoints::from_element(f64::NAN);
        self.nis_lidar = 0.0;
        self.nis_radar = 0.0;
        self.monitor = NisMonitor::default();
    }

    fn initialize(&mut self, obs: &Observation, timestamp_us: u64) {
        let x = match obs {
            Observation::Lidar(z) => na::vector![z[0], z[1], 0.0, 0.0, 0.0],
            Observation::Radar(z) => {
                let (rho, phi, rho_dot) = (z[0], z[1], z[2]);
                // range rate stands in for speed
                na::vector![rho * phi.cos(), rho * phi.sin(), rho_dot, phi, 0.0]
            }
        };
        self.estimate = StateEstimate::new(x, self.config.initial_covariance);
        self.time_us = timestamp_us;
        self.initialized = true;
        debug!(
            "initialised from {} at {timestamp_us} us: {:?}",
            obs.sensor(),
            x.as_slice()
        );
    }

    fn elapsed(&self, timestamp_us: u64) -> Result<f64> {
        if timestamp_us < self.time_us {
            warn!(
                "out of order measurement: {timestamp_us} us < {} us",
                self.time_us
            );
            return Err(UkfError::NonMonotonicTimestamp {
                previous_us: self.time_us,
                current_us: timestamp_us,
            });
        }
        Ok((timestamp_us - self.time_us) as f64 / 1_000_000.0)
    }

    fn commit(&mut self, prediction: &Prediction, estimate: StateEstimate, timestamp_us: u64) {
        self.estimate = estimate;
        self.sigma_pred = prediction.sigma_points;
        self.time_us = timestamp_us;
    }

    fn sensor_enabled(&self, sensor: SensorKind) -> bool {
        match sensor {
            SensorKind::Lidar => self.config.use_lidar,
            SensorKind::Radar => self.config.use_radar,
        }
    }

    // 推定した状態を返す
    pub fn state(&self) -> &StateVector {
        self.estimate.mean()
    }

    pub fn covariance(&self) -> &StateCovariance {
        self.estimate.covariance()
    }

    pub fn estimate(&self) -> &StateEstimate {
        &self.estimate
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn timestamp_us(&self) -> u64 {
        self.time_us
    }

    /// NIS of the last lidar correction, 0 before the first one.
    pub fn nis_lidar(&self) -> f64 {
        self.nis_lidar
    }

    /// NIS of the last radar correction, 0 before the first one.
    pub fn nis_radar(&self) -> f64 {
        self.nis_radar
    }

    pub fn nis_monitor(&self) -> &NisMonitor {
        &self.monitor
    }

    /// Sigma points of the last prediction. NaN until the first cycle.
    pub fn predicted_sigma_points(&self) -> &SigmaPoints {
        &self.sigma_pred
    }

    pub fn config(&self) -> &UkfConfig {
        &self.config
    }
}
