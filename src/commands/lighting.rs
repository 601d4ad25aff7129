//! Lighting command handlers.

use std::time::Duration;

use anyhow::{anyhow, Context};
use epomaker_driver::Config;
use epomaker_keyboard::{Command, Direction, KeyColorMap, LightMode, LightProfile, RgbColor};

use super::{open_keyboard, CommandResult};

/// Parse `KEY=RRGGBB` pairs into a color map
pub fn parse_assignments(assignments: &[String]) -> anyhow::Result<KeyColorMap> {
    let mut map = KeyColorMap::new();
    for pair in assignments {
        let (key, hex) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("'{pair}' is not KEY=RRGGBB"))?;
        let color =
            RgbColor::from_hex(hex).ok_or_else(|| anyhow!("'{hex}' is not an RRGGBB color"))?;
        map.insert(key, color);
    }
    Ok(map)
}

/// Split assignments into animation frames at each lone `/`
pub fn parse_frames(
    assignments: &[String],
    time_ms: u8,
) -> anyhow::Result<Vec<(KeyColorMap, u8)>> {
    assignments
        .split(|a| a == "/")
        .enumerate()
        .map(|(i, frame)| {
            if frame.is_empty() {
                anyhow::bail!("frame {} has no KEY=RRGGBB pairs", i + 1);
            }
            Ok((parse_assignments(frame)?, time_ms))
        })
        .collect()
}

/// Light every key with one color
pub async fn set_rgb_all_keys(config: &Config, r: u8, g: u8, b: u8) -> CommandResult {
    let color = RgbColor::new(r, g, b);
    let keyboard = open_keyboard(config).await?;
    keyboard.set_all_keys_color(color).await?;
    println!("All keys set to {color}");
    Ok(())
}

/// Color individual keys; keys left out go dark
pub async fn set_keys(config: &Config, assignments: &[String], time_ms: u8) -> CommandResult {
    let frames = parse_frames(assignments, time_ms)?;
    let command = Command::set_key_frames(&frames)?;
    let keyboard = open_keyboard(config).await?;
    keyboard.submit(&command).await?;
    if frames.len() == 1 {
        println!("Set {} key colors", frames[0].0.len());
    } else {
        println!("Sent {} frames, {time_ms} ms each", frames.len());
    }
    Ok(())
}

/// Print the lighting patterns
pub fn list_modes() {
    println!("Lighting modes:");
    for mode in LightMode::ALL {
        println!("  {:2}  {}", mode as u8, mode.name());
    }
}

pub async fn set_light_mode(
    config: &Config,
    mode: &str,
    speed: u8,
    brightness: u8,
    color: &str,
    dazzle: bool,
    direction: Direction,
) -> CommandResult {
    let mode = LightMode::parse(mode)
        .ok_or_else(|| anyhow!("unknown mode '{mode}' (see set-light-mode --list)"))?;
    let color = RgbColor::from_hex(color).ok_or_else(|| anyhow!("'{color}' is not RRGGBB"))?;
    let profile = LightProfile::new(mode, speed, brightness, color)?
        .with_dazzle(dazzle)
        .with_direction(direction);

    let keyboard = open_keyboard(config).await?;
    keyboard.set_light_profile(profile).await?;
    println!(
        "Light mode set to {} (speed {speed}, brightness {brightness})",
        mode.name()
    );
    Ok(())
}

/// Show every pattern in turn, `delay` seconds each
pub async fn cycle_light_modes(config: &Config, delay: u64) -> CommandResult {
    let keyboard = open_keyboard(config).await?;
    let total = LightMode::ALL.len();
    println!("Cycling through {total} modes, {delay}s each");

    for (i, mode) in LightMode::ALL.into_iter().enumerate() {
        keyboard
            .set_light_profile(LightProfile::cycle_defaults(mode))
            .await
            .with_context(|| format!("switching to {}", mode.name()))?;
        println!("[{}/{total}] {}", i + 1, mode.name());
        if i + 1 < total {
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
    }

    println!("Cycled through all light modes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignments() {
        let map = parse_assignments(&["esc=ff0000".into(), "NUMPAD_ENTER=#00ff00".into()]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("ESC"), Some(RgbColor::RED));
        assert_eq!(map.get("numpad_enter"), Some(RgbColor::GREEN));
    }

    #[test]
    fn test_parse_assignments_errors() {
        assert!(parse_assignments(&["ESC".into()]).is_err());
        assert!(parse_assignments(&["ESC=red".into()]).is_err());
    }

    #[test]
    fn test_parse_frames() {
        let args: Vec<String> = ["ESC=ff0000", "F=00ff00", "/", "ESC=0000ff"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let frames = parse_frames(&args, 80).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0.len(), 2);
        assert_eq!(frames[1].0.get("ESC"), Some(RgbColor::BLUE));
        assert!(frames.iter().all(|(_, t)| *t == 80));

        assert_eq!(parse_frames(&["ESC=ff0000".into()], 0).unwrap().len(), 1);
        assert!(parse_frames(&["ESC=ff0000".into(), "/".into()], 0).is_err());
    }

    #[tokio::test]
    async fn test_unknown_key_rejected_before_open() {
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        let err = set_keys(&config, &["NOPE=ffffff".into()], 0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }
}
