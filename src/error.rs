use crate::measurement::SensorKind;

/// Where in the cycle a matrix turned out not to be invertible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Cholesky factorisation of the augmented covariance.
    AugmentedCovariance,
    /// Inverse of the lidar innovation covariance.
    LidarInnovation,
    /// Inverse of the radar innovation covariance.
    RadarInnovation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UkfError {
    /// A covariance needed for the cycle is not positive definite / invertible.
    NumericalSingularity { stage: Stage },
    /// Value count does not match the declared sensor.
    MalformedMeasurement {
        sensor: SensorKind,
        expected: usize,
        actual: usize,
    },
    /// Measurement contains NaN or an infinite value.
    NonFiniteMeasurement { sensor: SensorKind },
    /// Timestamp is older than the last processed one.
    NonMonotonicTimestamp { previous_us: u64, current_us: u64 },
    /// Configuration rejected by `UkfConfig::validate`.
    InvalidConfig(&'static str),
    /// No measurement has been processed yet, so there is no state.
    NotInitialized,
}

impl std::error::Error for UkfError {}

impl core::fmt::Display for UkfError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UkfError::NumericalSingularity { stage } => match stage {
                Stage::AugmentedCovariance => {
                    write!(f, "augmented covariance is not positive definite")
                }
                Stage::LidarInnovation => write!(f, "lidar innovation covariance is singular"),
                Stage::RadarInnovation => write!(f, "radar innovation covariance is singular"),
            },
            UkfError::MalformedMeasurement {
                sensor,
                expected,
                actual,
            } => write!(
                f,
                "{sensor} measurement needs {expected} values, got {actual}"
            ),
            UkfError::NonFiniteMeasurement { sensor } => {
                write!(f, "{sensor} measurement contains a non-finite value")
            }
            UkfError::NonMonotonicTimestamp {
                previous_us,
                current_us,
            } => write!(
                f,
                "timestamp {current_us} us is earlier than last processed {previous_us} us"
            ),
            UkfError::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
            UkfError::NotInitialized => write!(f, "filter has not been initialised"),
        }
    }
}

pub type Result<T> = core::result::Result<T, UkfError>;
