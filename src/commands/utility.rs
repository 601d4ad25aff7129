//! Utility command handlers.

use epomaker_transport::device_registry::model_name;
use epomaker_transport::protocol::device;
use epomaker_transport::{DeviceDiscovery, HidDiscovery};

use super::CommandResult;

/// List connected keyboards and their interfaces
pub async fn list() -> CommandResult {
    let devices = HidDiscovery::new().list_devices().await?;
    if devices.is_empty() {
        println!("No supported keyboard found");
        return Ok(());
    }
    println!("Supported keyboards:");
    for d in devices {
        let info = &d.info;
        let note = match info.interface_number {
            device::DEFAULT_INTERFACE => " (default)",
            device::KEYBOARD_INTERFACE => " (typing)",
            _ => "",
        };
        println!(
            "  {} VID={:04X} PID={:04X} if={}{} serial={} path={}",
            model_name(info.pid),
            info.vid,
            info.pid,
            info.interface_number,
            note,
            info.serial.as_deref().unwrap_or("-"),
            info.device_path,
        );
    }
    Ok(())
}
