//! Background updater for the keyboard's status display
//!
//! Sets the clock once, then pushes CPU load and one temperature reading on
//! every tick until told to stop.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use epomaker_keyboard::{
    Command, Keyboard, KeyboardError, NumericDisplay, NumericKind, Timestamp, ValidationError,
};

use crate::sensors::{CpuSampler, SystemTelemetry, TemperatureSensors};

/// Settings owned by the scheduler for its whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub interval: Duration,
    /// Temperature sensor key; `None` sends CPU only, an unknown key sends 0
    pub sensor_label: Option<String>,
    pub interface_number: i32,
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("device error: {0}")]
    Device(#[from] KeyboardError),

    #[error("clock: {0}")]
    Clock(ValidationError),

    #[error("scheduler already started")]
    AlreadyStarted,
}

/// Source of wall-clock time for the display clock
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<Timestamp, ValidationError>;
}

/// Local system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<Timestamp, ValidationError> {
        Timestamp::now_local()
    }
}

/// Periodic CPU/temperature pusher
pub struct Scheduler {
    config: DaemonConfig,
    keyboard: Keyboard,
    cpu: Box<dyn CpuSampler>,
    sensors: Box<dyn TemperatureSensors>,
    clock: Box<dyn Clock>,
    state: watch::Sender<SchedulerState>,
    ticks: u64,
}

impl Scheduler {
    /// Scheduler sampling the host through `sysinfo`
    pub fn new(config: DaemonConfig, keyboard: Keyboard) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            config,
            keyboard,
            cpu: Box::new(SystemTelemetry::new()),
            sensors: Box::new(SystemTelemetry::new()),
            clock: Box::new(SystemClock),
            state,
            ticks: 0,
        }
    }

    pub fn with_cpu(mut self, cpu: Box<dyn CpuSampler>) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn with_sensors(mut self, sensors: Box<dyn TemperatureSensors>) -> Self {
        self.sensors = sensors;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Follow state transitions from another task
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    fn set_state(&self, state: SchedulerState) {
        debug!("Scheduler -> {:?}", state);
        self.state.send_replace(state);
    }

    /// Run until `stop` turns true or the device fails fatally, then close
    /// the device.
    ///
    /// The stop signal is only looked at while waiting for the next tick,
    /// so a tick that has started always finishes.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> Result<(), DaemonError> {
        if self.state() != SchedulerState::Idle {
            return Err(DaemonError::AlreadyStarted);
        }
        self.set_state(SchedulerState::Running);
        info!(
            "Daemon started: interval {:?}, sensor {}",
            self.config.interval,
            self.config.sensor_label.as_deref().unwrap_or("none")
        );

        let result = self.run_loop(&mut stop).await;
        if result.is_ok() {
            self.set_state(SchedulerState::Stopping);
        }
        if let Err(e) = self.keyboard.close().await {
            warn!("Closing device: {e}");
        }
        self.set_state(SchedulerState::Stopped);
        match &result {
            Ok(()) => info!("Daemon stopped after {} ticks", self.ticks),
            Err(e) => error!("Daemon halted: {e}"),
        }
        result
    }

    async fn run_loop(&mut self, stop: &mut watch::Receiver<bool>) -> Result<(), DaemonError> {
        let now = self.clock.now().map_err(DaemonError::Clock)?;
        send(&self.keyboard, &Command::send_time(now)).await?;

        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *stop.borrow() {
                return Ok(());
            }
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    // A dropped sender can never stop us, so treat it as a stop
                    if changed.is_err() || *stop.borrow() {
                        return Ok(());
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            self.tick().await?;
        }
    }

    /// Sample and send one CPU and one temperature value
    async fn tick(&mut self) -> Result<(), DaemonError> {
        let (cpu, clamped) = NumericDisplay::clamped(NumericKind::Cpu, self.cpu.percent_used());
        if clamped {
            warn!("CPU reading clamped to {}", cpu.value());
        }
        send(&self.keyboard, &Command::SendNumericDisplay(cpu)).await?;

        if let Some(key) = self.config.sensor_label.clone() {
            match self.sensors.sample(&key) {
                Some(celsius) => {
                    let (temp, clamped) =
                        NumericDisplay::clamped(NumericKind::Temperature, celsius);
                    if clamped {
                        warn!("{key} reads {celsius:.1}°C, showing {}", temp.value());
                    }
                    send(&self.keyboard, &Command::SendNumericDisplay(temp)).await?;
                }
                None => {
                    let available: Vec<String> = self
                        .sensors
                        .enumerate()
                        .into_iter()
                        .map(|r| r.device_key)
                        .collect();
                    warn!(
                        "Sensor {key} not found, showing 0; available: {}",
                        if available.is_empty() {
                            "none".to_string()
                        } else {
                            available.join(", ")
                        }
                    );
                    let (zero, _) = NumericDisplay::clamped(NumericKind::Temperature, 0.0);
                    send(&self.keyboard, &Command::SendNumericDisplay(zero)).await?;
                }
            }
        }

        self.ticks += 1;
        Ok(())
    }
}

/// Submit a command; only fatal device errors propagate
async fn send(keyboard: &Keyboard, command: &Command) -> Result<(), DaemonError> {
    match keyboard.submit(command).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            warn!("{} failed: {e}", command.name());
            Ok(())
        }
    }
}
