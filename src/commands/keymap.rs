//! Key command handlers.

use epomaker_driver::Config;
use epomaker_keyboard::rt100;

use super::{open_keyboard, parse_byte, CommandResult};

/// Rebind a key to a HID usage code
pub async fn remap_key(config: &Config, key: &str, hid_code: &str) -> CommandResult {
    let code = parse_byte(hid_code)?;
    let keyboard = open_keyboard(config).await?;
    keyboard.remap_key(key, code).await?;
    println!("{} remapped to HID 0x{code:02x}", key.trim().to_ascii_uppercase());
    Ok(())
}

/// Print key names with their LED index
pub fn show_keymap(filter: Option<&str>) {
    let layout = rt100();
    let keys: Vec<_> = match filter {
        Some(f) => layout.filter(f).collect(),
        None => layout.keys().collect(),
    };
    if keys.is_empty() {
        println!("No keys match");
        return;
    }
    for key in keys {
        println!("{}: {}", key.name(), key.led_index());
    }
}
