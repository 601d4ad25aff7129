//! Daemon command handlers.

use std::time::Duration;

use anyhow::{ensure, Context};
use epomaker_driver::{Config, RandomTelemetry, Scheduler, SystemTelemetry, TemperatureSensors};
use tokio::sync::watch;

use super::{open_keyboard, CommandResult};

/// Run the display updater until Ctrl+C
pub async fn start_daemon(
    config: &Config,
    temp_key: Option<String>,
    interval: Option<u64>,
    test: bool,
) -> CommandResult {
    let mut daemon_config = config.daemon_config();
    if let Some(key) = temp_key {
        daemon_config.sensor_label = Some(key);
    }
    if let Some(secs) = interval {
        ensure!(secs > 0, "--interval must be at least 1 second");
        daemon_config.interval = Duration::from_secs(secs);
    }
    if test && daemon_config.sensor_label.is_none() {
        daemon_config.sensor_label = Some(RandomTelemetry::DEVICE_KEY.to_string());
    }

    let keyboard = open_keyboard(config).await?;
    let mut scheduler = Scheduler::new(daemon_config, keyboard);
    if test {
        println!("Test mode: sending random values");
        scheduler = scheduler
            .with_cpu(Box::new(RandomTelemetry))
            .with_sensors(Box::new(RandomTelemetry));
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(true);
    })
    .context("installing Ctrl+C handler")?;

    println!("Daemon running, Ctrl+C to stop");
    scheduler.run(stop_rx).await?;
    println!("Daemon stopped after {} updates", scheduler.ticks());
    Ok(())
}

/// Print the temperature sensors the daemon can read
pub fn list_temp_devices() {
    let readings = SystemTelemetry::new().enumerate();
    if readings.is_empty() {
        println!("No temperature sensors found");
        return;
    }
    let fmt = |t: Option<f32>| t.map_or_else(|| "-".to_string(), |t| format!("{t:.1}°C"));
    println!("{:<16} {:>8} {:>8} {:>8}  LABEL", "KEY", "CURRENT", "HIGH", "CRIT");
    for r in readings {
        println!(
            "{:<16} {:>8} {:>8} {:>8}  {}",
            r.device_key,
            fmt(Some(r.current)),
            fmt(r.high),
            fmt(r.critical),
            r.label
        );
    }
}
