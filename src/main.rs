//! Epomaker RT100 Driver CLI
//!
//! A command-line interface for the RT100's display and lighting.

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use epomaker_driver::Config;
use epomaker_transport::validate_interface;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

/// Config file merged with command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config =
        Config::load_from(&path).with_context(|| format!("loading {}", path.display()))?;
    if cli.dry_run {
        config.dry_run = true;
    }
    if let Some(interface) = cli.interface {
        validate_interface(interface)?;
        config.interface_number = interface;
    }
    debug!("Using config {:?}", config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = resolve_config(&cli)?;

    match cli.command {
        // === Display Commands ===
        Commands::UploadImage { path, preview } => {
            commands::display::upload_image(&config, &path, preview.as_deref()).await?;
        }
        Commands::SendTime => {
            commands::display::send_time(&config).await?;
        }
        Commands::SendCpu { cpu } => {
            commands::display::send_cpu(&config, cpu).await?;
        }
        Commands::SendTemperature { temperature } => {
            commands::display::send_temperature(&config, temperature).await?;
        }
        Commands::ClearScreen => {
            commands::display::clear_screen(&config).await?;
        }

        // === Lighting Commands ===
        Commands::SetRgbAllKeys { r, g, b } => {
            commands::lighting::set_rgb_all_keys(&config, r, g, b).await?;
        }
        Commands::SetKeys {
            assignments,
            time_ms,
        } => {
            commands::lighting::set_keys(&config, &assignments, time_ms).await?;
        }
        Commands::SetLightMode {
            mode,
            speed,
            brightness,
            color,
            dazzle,
            direction,
            list,
        } => {
            if list {
                commands::lighting::list_modes();
            } else if let Some(mode) = mode {
                commands::lighting::set_light_mode(
                    &config, &mode, speed, brightness, &color, dazzle, direction,
                )
                .await?;
            }
        }
        Commands::CycleLightModes { delay } => {
            commands::lighting::cycle_light_modes(&config, delay).await?;
        }

        // === Key Commands ===
        Commands::RemapKey { key, hid_code } => {
            commands::keymap::remap_key(&config, &key, &hid_code).await?;
        }
        Commands::ShowKeymap { filter } => {
            commands::keymap::show_keymap(filter.as_deref());
        }

        // === Daemon Commands ===
        Commands::StartDaemon {
            temp_key,
            interval,
            test,
        } => {
            commands::daemon::start_daemon(&config, temp_key, interval, test).await?;
        }
        Commands::ListTempDevices => {
            commands::daemon::list_temp_devices();
        }

        // === Utility Commands ===
        Commands::List => {
            commands::utility::list().await?;
        }
    }

    Ok(())
}
