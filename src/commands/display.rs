//! Display command handlers.

use std::path::Path;

use anyhow::Context;
use epomaker_driver::Config;
use epomaker_keyboard::{convert, Command, Timestamp};

use super::{open_keyboard, CommandResult};

/// Convert and upload a picture
pub async fn upload_image(config: &Config, path: &Path, preview: Option<&Path>) -> CommandResult {
    let img = image::open(path).with_context(|| format!("reading {}", path.display()))?;
    println!(
        "Converting {} ({}x{})...",
        path.display(),
        img.width(),
        img.height()
    );
    let bitmap = convert(&img);
    if let Some(out) = preview {
        bitmap
            .to_image()
            .save(out)
            .with_context(|| format!("writing preview {}", out.display()))?;
        println!("Preview written to {}", out.display());
    }

    let command = Command::send_image(bitmap)?;
    let keyboard = open_keyboard(config).await?;
    keyboard.submit(&command).await?;
    println!("Image uploaded");
    Ok(())
}

/// Set the display clock to local time
pub async fn send_time(config: &Config) -> CommandResult {
    let now = Timestamp::now_local()?;
    let keyboard = open_keyboard(config).await?;
    keyboard.send_time(now).await?;
    println!("Time set to {now}");
    Ok(())
}

pub async fn send_cpu(config: &Config, cpu: i64) -> CommandResult {
    let keyboard = open_keyboard(config).await?;
    keyboard.send_cpu(cpu).await?;
    println!("CPU usage {cpu}% sent");
    Ok(())
}

pub async fn send_temperature(config: &Config, temperature: i64) -> CommandResult {
    let keyboard = open_keyboard(config).await?;
    keyboard.send_temperature(temperature).await?;
    println!("Temperature {temperature}°C sent");
    Ok(())
}

pub async fn clear_screen(config: &Config) -> CommandResult {
    let keyboard = open_keyboard(config).await?;
    keyboard.clear_screen().await?;
    println!("Display cleared");
    Ok(())
}
