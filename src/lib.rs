// Epomaker RT100 Linux Driver - Shared Library
// Configuration, host telemetry and the display update daemon

pub mod config;
pub mod daemon;
pub mod sensors;

pub use config::{Config, DaemonSettings};
pub use daemon::{Clock, DaemonConfig, DaemonError, Scheduler, SchedulerState, SystemClock};
pub use sensors::{
    CpuSampler, RandomTelemetry, SensorReading, SystemTelemetry, TemperatureSensors,
};
