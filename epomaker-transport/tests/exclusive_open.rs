//! In-process exclusivity of device handles.
//!
//! Uses leased recording transports so no hardware is needed; the HID
//! transport takes its lease through the same registry.

use std::sync::Arc;

use epomaker_transport::{
    handle_registry, FlowControlTransport, Frame, RecordingTransport, ScriptedFault, Transport,
    TransportDeviceInfo, TransportError,
};

fn interface(serial: &str, number: i32) -> TransportDeviceInfo {
    TransportDeviceInfo {
        vid: 0x3151,
        pid: 0x4010,
        interface_number: number,
        device_path: format!("test-{serial}:1.{number}"),
        serial: Some(serial.to_string()),
        product_name: None,
    }
}

#[test]
fn second_interface_of_open_device_is_busy() {
    let held = RecordingTransport::leased(interface("busy", 1)).unwrap();
    assert_eq!(held.device_info().interface_number, 1);

    match RecordingTransport::leased(interface("busy", 0)) {
        Err(TransportError::DeviceBusy(msg)) => assert!(msg.contains("3151:4010")),
        Err(e) => panic!("expected DeviceBusy, got {e}"),
        Ok(_) => panic!("expected DeviceBusy, got a transport"),
    }
}

#[test]
fn lease_released_when_transport_dropped() {
    let info = interface("release", 2);
    let key = info.device_key();
    {
        let _t = RecordingTransport::leased(info.clone()).unwrap();
        assert!(handle_registry().is_held(&key));
    }
    assert!(!handle_registry().is_held(&key));
    let _again = RecordingTransport::leased(info).unwrap();
}

#[tokio::test]
async fn lease_released_after_failed_transfer() {
    let info = interface("midfail", 2);
    let key = info.device_key();
    {
        let rec = Arc::new(RecordingTransport::leased(info).unwrap());
        rec.fail_next(ScriptedFault::Disconnect);
        let flow = FlowControlTransport::new(rec.clone());
        let frames = vec![Frame::new(&[0x18, 0, 0, 0, 0, 0, 0], &[]).unwrap()];
        assert!(flow.write(&frames).await.is_err());
        assert!(!flow.is_connected().await);
    }
    assert!(!handle_registry().is_held(&key));
}
