use crate::error::{Result, UkfError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Lidar,
    Radar,
}

impl SensorKind {
    /// Number of raw values a measurement of this kind carries.
    pub const fn dim(self) -> usize {
        match self {
            SensorKind::Lidar => 2,
            SensorKind::Radar => 3,
        }
    }
}

impl core::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorKind::Lidar => write!(f, "lidar"),
            SensorKind::Radar => write!(f, "radar"),
        }
    }
}

/// One record of the input stream.
///
/// `values` is (px, py) for lidar and (range, bearing, range rate) for radar.
/// `timestamp_us` is in microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub sensor: SensorKind,
    pub values: Vec<f64>,
    pub timestamp_us: u64,
}

/// A measurement whose length and values have been checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Lidar(na::Vector2<f64>),
    Radar(na::Vector3<f64>),
}

impl Observation {
    pub fn sensor(&self) -> SensorKind {
        match self {
            Observation::Lidar(_) => SensorKind::Lidar,
            Observation::Radar(_) => SensorKind::Radar,
        }
    }
}

impl Measurement {
    pub fn new(sensor: SensorKind, values: Vec<f64>, timestamp_us: u64) -> Self {
        Self {
            sensor,
            values,
            timestamp_us,
        }
    }

    pub fn lidar(px: f64, py: f64, timestamp_us: u64) -> Self {
        Self::new(SensorKind::Lidar, vec![px, py], timestamp_us)
    }

    pub fn radar(rho: f64, phi: f64, rho_dot: f64, timestamp_us: u64) -> Self {
        Self::new(SensorKind::Radar, vec![rho, phi, rho_dot], timestamp_us)
    }

    /// Checks the value count against the sensor kind and rejects NaN/∞.
    pub fn observation(&self) -> Result<Observation> {
        let expected = self.sensor.dim();
        if self.values.len() != expected {
            return Err(UkfError::MalformedMeasurement {
                sensor: self.sensor,
                expected,
                actual: self.values.len(),
            });
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err(UkfError::NonFiniteMeasurement {
                sensor: self.sensor,
            });
        }
        let obs = match self.sensor {
            SensorKind::Lidar => Observation::Lidar(na::Vector2::from_column_slice(&self.values)),
            SensorKind::Radar => Observation::Radar(na::Vector3::from_column_slice(&self.values)),
        };
        Ok(obs)
    }
}
