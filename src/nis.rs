use crate::measurement::SensorKind;

/// 95% quantile of χ² with 2 degrees of freedom (lidar).
pub const CHI2_95_2DOF: f64 = 5.991;
/// 95% quantile of χ² with 3 degrees of freedom (radar).
pub const CHI2_95_3DOF: f64 = 7.815;

pub fn chi2_95(sensor: SensorKind) -> f64 {
    match sensor {
        SensorKind::Lidar => CHI2_95_2DOF,
        SensorKind::Radar => CHI2_95_3DOF,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NisCounter {
    pub count: usize,
    pub above_95: usize,
    pub last: Option<f64>,
}

impl NisCounter {
    /// Share of updates whose NIS exceeded the 95% threshold.
    /// A well tuned filter sits near 0.05.
    pub fn fraction_above_95(&self) -> Option<f64> {
        (self.count > 0).then(|| self.above_95 as f64 / self.count as f64)
    }
}

/// Running NIS consistency statistics, one counter per sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NisMonitor {
    lidar: NisCounter,
    radar: NisCounter,
}

impl NisMonitor {
    pub fn record(&mut self, sensor: SensorKind, nis: f64) {
        let threshold = chi2_95(sensor);
        let counter = self.counter_mut(sensor);
        counter.count += 1;
        if nis > threshold {
            counter.above_95 += 1;
        }
        counter.last = Some(nis);
    }

    pub fn counter(&self, sensor: SensorKind) -> &NisCounter {
        match sensor {
            SensorKind::Lidar => &self.lidar,
            SensorKind::Radar => &self.radar,
        }
    }

    fn counter_mut(&mut self, sensor: SensorKind) -> &mut NisCounter {
        match sensor {
            SensorKind::Lidar => &mut self.lidar,
            SensorKind::Radar => &mut self.radar,
        }
    }
}
