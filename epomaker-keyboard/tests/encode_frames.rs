//! End-to-end encoding through the keyboard facade.
//!
//! Commands are submitted to a recording transport and the captured frames
//! are checked against what `encode` produces.

use std::sync::Arc;
use std::time::Duration;

use epomaker_keyboard::bitmap::{BITMAP_BYTES, PIXEL_COUNT};
use epomaker_keyboard::{
    encode, Bitmap, Command, KeyColorMap, Keyboard, KeyboardError, LightMode, NumericKind,
    RgbColor, Timestamp, ValidationError,
};
use epomaker_transport::protocol::{cmd, DATA_CAPACITY};
use epomaker_transport::{
    reassemble, DeviceStatus, FlowControlTransport, RecordingTransport, ScriptedFault,
    TransportError,
};

fn keyboard() -> (Keyboard, Arc<RecordingTransport>) {
    let rec = Arc::new(RecordingTransport::new());
    let flow = FlowControlTransport::new(rec.clone()).with_frame_delay(Duration::ZERO);
    (Keyboard::new(Arc::new(flow)), rec)
}

#[tokio::test(start_paused = true)]
async fn image_upload_frames() {
    let (kb, rec) = keyboard();
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        640,
        480,
        image::Rgb([255, 0, 0]),
    ));
    kb.upload_image(&img).await.unwrap();

    let frames = rec.frames();
    assert_eq!(frames.len(), 1 + BITMAP_BYTES.div_ceil(DATA_CAPACITY));
    assert_eq!(frames[0].command(), cmd::IMAGE_START);
    for (i, f) in frames[1..].iter().enumerate() {
        assert_eq!(f.command(), cmd::IMAGE_DATA);
        assert_eq!(&f.header()[4..6], &(i as u16).to_le_bytes());
        assert!(f.verify_checksum());
    }
    let body = reassemble(&frames[1..]).unwrap();
    assert_eq!(body.len(), BITMAP_BYTES);
    assert_eq!(&body[..2], &[0xF8, 0x00]);
}

#[tokio::test]
async fn submitted_frames_match_encoding() {
    let (kb, rec) = keyboard();
    let command = Command::send_numeric(NumericKind::Temperature, 52).unwrap();
    kb.submit(&command).await.unwrap();
    assert_eq!(rec.frames(), encode(&command).unwrap());
}

#[tokio::test]
async fn all_keys_color() {
    let (kb, rec) = keyboard();
    kb.set_all_keys_color(RgbColor::new(10, 20, 30)).await.unwrap();
    let frames = rec.frames();
    assert_eq!(frames[0].command(), cmd::KEY_RGB_START);
    let body = reassemble(&frames[1..]).unwrap();
    // ESC lit, unwired slot 29 dark
    assert_eq!(&body[0..3], &[10, 20, 30]);
    assert_eq!(&body[29 * 3..29 * 3 + 3], &[0, 0, 0]);
}

#[tokio::test]
async fn cycle_reports_next_mode() {
    let (kb, rec) = keyboard();
    let next = kb.cycle_light_mode(LightMode::Laser).await.unwrap();
    assert_eq!(next, LightMode::PeakTurn);
    let report = rec.frames()[0].to_report();
    assert_eq!(report[0], cmd::SET_LIGHT_PROFILE);
    assert_eq!(report[1], LightMode::PeakTurn as u8);
}

#[tokio::test]
async fn key_animation_is_sent_frame_by_frame() {
    let (kb, rec) = keyboard();
    let mut first = KeyColorMap::new();
    first.insert("ESC", RgbColor::RED);
    let second = KeyColorMap::all(RgbColor::BLUE);
    let third = KeyColorMap::new();
    kb.set_key_frames(&[(first, 50), (second, 50), (third, 120)])
        .await
        .unwrap();

    let frames = rec.frames();
    assert_eq!(frames.len(), 1 + 3 * 7);
    let data = &frames[1..];
    for (frame_index, chunk) in data.chunks(7).enumerate() {
        for (report, f) in chunk.iter().enumerate() {
            let header = f.header();
            assert_eq!(header[1] as usize, report);
            assert_eq!(header[2] as usize, frame_index);
            assert_eq!(header[3], 3);
        }
    }
    assert_eq!(data[14].header()[4], 120);
    assert_eq!(&data[0].payload()[..3], &[255, 0, 0]);
    assert_eq!(&data[7].payload()[..3], &[0, 0, 255]);
    assert!(data[14..].iter().all(|f| f.payload().iter().all(|&b| b == 0)));
}

#[tokio::test]
async fn validation_sends_nothing() {
    let (kb, rec) = keyboard();
    let err = kb.send_cpu(150).await.unwrap_err();
    assert!(matches!(
        err,
        KeyboardError::Validation(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        Command::send_image(Bitmap::solid(0, 0, 0)),
        Ok(Command::SendImage(b)) if b.len() == PIXEL_COUNT
    ));
    assert_eq!(rec.attempts(), 0);
}

#[tokio::test]
async fn status_and_close() {
    let (kb, rec) = keyboard();
    assert_eq!(kb.status().await.unwrap(), DeviceStatus::Accepted);
    kb.close().await.unwrap();
    assert!(kb.status().await.is_err());
    let ts = Timestamp::new(2024, 1, 1, 0, 0, 0).unwrap();
    assert!(kb.send_time(ts).await.unwrap_err().is_fatal());
    assert!(rec.frames().is_empty());
}

#[tokio::test]
async fn disconnect_is_fatal() {
    let (kb, rec) = keyboard();
    rec.fail_next(ScriptedFault::Disconnect);
    let err = kb.clear_screen().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        KeyboardError::Transport(TransportError::Disconnected)
    ));
}
