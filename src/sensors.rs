//! Host telemetry: CPU load and temperature sensors
//!
//! Sensors are addressed by `<chip>-<n>` keys (`coretemp-0`, `k10temp-1`),
//! numbering the readings of each chip in the order the OS lists them.

use std::collections::HashMap;

use rand::Rng;
use sysinfo::{Components, System};

/// One temperature sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Stable key used to select the sensor (`coretemp-0`)
    pub device_key: String,
    /// Label reported by the OS
    pub label: String,
    /// Current temperature in °C
    pub current: f32,
    /// Highest temperature seen, when known
    pub high: Option<f32>,
    /// Critical threshold, when known
    pub critical: Option<f32>,
}

/// Source of CPU load samples
pub trait CpuSampler: Send {
    /// CPU usage since the previous call, 0..100
    fn percent_used(&mut self) -> f32;
}

/// Source of temperature readings
pub trait TemperatureSensors: Send {
    /// All sensors currently visible
    fn enumerate(&mut self) -> Vec<SensorReading>;

    /// Current temperature of one sensor, `None` if it does not exist
    fn sample(&mut self, device_key: &str) -> Option<f32> {
        self.enumerate()
            .into_iter()
            .find(|r| r.device_key == device_key)
            .map(|r| r.current)
    }
}

/// Build `<chip>-<n>` keys from OS labels like `coretemp Package id 0`
pub fn device_keys<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    labels
        .into_iter()
        .map(|label| {
            let chip = label.split_whitespace().next().unwrap_or("sensor").to_string();
            let n = seen.entry(chip.clone()).or_insert(0);
            let key = format!("{chip}-{n}");
            *n += 1;
            key
        })
        .collect()
}

/// Telemetry backed by `sysinfo`
pub struct SystemTelemetry {
    system: System,
    components: Components,
}

impl Default for SystemTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTelemetry {
    pub fn new() -> Self {
        let mut system = System::new();
        // First refresh only sets the baseline for the next delta
        system.refresh_cpu_usage();
        Self {
            system,
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl CpuSampler for SystemTelemetry {
    fn percent_used(&mut self) -> f32 {
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage()
    }
}

impl TemperatureSensors for SystemTelemetry {
    fn enumerate(&mut self) -> Vec<SensorReading> {
        self.components.refresh();
        let list = self.components.list();
        let keys = device_keys(list.iter().map(|c| c.label()));
        list.iter()
            .zip(keys)
            .map(|(c, device_key)| SensorReading {
                device_key,
                label: c.label().to_string(),
                current: c.temperature(),
                high: Some(c.max()).filter(|t| t.is_finite() && *t > 0.0),
                critical: c.critical(),
            })
            .collect()
    }
}

/// Random telemetry for exercising the display without real load
#[derive(Debug, Default)]
pub struct RandomTelemetry;

impl RandomTelemetry {
    pub const DEVICE_KEY: &'static str = "random-0";
}

impl CpuSampler for RandomTelemetry {
    fn percent_used(&mut self) -> f32 {
        rand::rng().random_range(0..100) as f32
    }
}

impl TemperatureSensors for RandomTelemetry {
    fn enumerate(&mut self) -> Vec<SensorReading> {
        vec![SensorReading {
            device_key: Self::DEVICE_KEY.to_string(),
            label: "random".to_string(),
            current: rand::rng().random_range(0..100) as f32,
            high: None,
            critical: None,
        }]
    }

    fn sample(&mut self, _device_key: &str) -> Option<f32> {
        Some(rand::rng().random_range(0..100) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_keys_number_per_chip() {
        let keys = device_keys([
            "coretemp Package id 0",
            "coretemp Core 0",
            "acpitz temp1",
            "coretemp Core 1",
        ]);
        assert_eq!(keys, ["coretemp-0", "coretemp-1", "acpitz-0", "coretemp-2"]);
    }

    #[test]
    fn test_random_in_range() {
        let mut t = RandomTelemetry;
        for _ in 0..50 {
            let cpu = t.percent_used();
            assert!((0.0..100.0).contains(&cpu));
            let temp = t.sample("anything").unwrap();
            assert!((0.0..100.0).contains(&temp));
        }
        assert_eq!(t.enumerate()[0].device_key, "random-0");
    }

    struct Fixed(Vec<SensorReading>);

    impl TemperatureSensors for Fixed {
        fn enumerate(&mut self) -> Vec<SensorReading> {
            self.0.clone()
        }
    }

    #[test]
    fn test_default_sample_by_key() {
        let mut s = Fixed(vec![SensorReading {
            device_key: "coretemp-0".into(),
            label: "coretemp Package id 0".into(),
            current: 52.0,
            high: Some(80.0),
            critical: Some(100.0),
        }]);
        assert_eq!(s.sample("coretemp-0"), Some(52.0));
        assert_eq!(s.sample("nvme-0"), None);
    }
}
