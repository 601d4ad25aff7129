//! Command to report encoding
//!
//! Most commands fit one report: the command code, six zero bytes, the
//! checksum at byte 7 and the value from byte 8. Per-key colors and pictures
//! open with a start report and then stream their body in 56-byte data
//! reports whose headers say where each chunk belongs.

use epomaker_transport::protocol::cmd;
use epomaker_transport::{split, EncodingError, Frame};
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{Immutable, IntoBytes};

use crate::bitmap::{Bitmap, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::command::{Command, KeyColors, KeyFrame, KeyRemap, NumericKind, Timestamp};
use crate::layout::LED_SLOTS;
use crate::led::LightProfile;

/// Size of the per-key color buffer of one animation frame
pub const KEY_BUFFER_LEN: usize = 392;

/// Data reports per animation frame
pub const KEY_REPORTS_PER_FRAME: usize = 7;

/// Fixed prefix of the CPU readout payload; the value follows it
const CPU_PREFIX: [u8; 8] = [0x63, 0x00, 0x7F, 0x00, 0x04, 0x00, 0x08, 0x00];

/// Picture stream type in the image headers
const IMAGE_STREAM: u8 = 0x01;

const _: () = assert!(LED_SLOTS * 3 <= KEY_BUFFER_LEN);

/// Header shared by single-report commands
#[derive(Debug, Clone, Copy, IntoBytes, Immutable)]
#[repr(C)]
struct ShortHeader {
    cmd: u8,
    _zero: [u8; 6],
}

impl ShortHeader {
    fn new(cmd: u8) -> Self {
        Self { cmd, _zero: [0; 6] }
    }
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable)]
#[repr(C)]
struct RemapHeader {
    cmd: u8,
    _pad: u8,
    key_index: u8,
    _zero: [u8; 4],
}

/// The whole profile lives in the header, so the checksum lands at byte 8
#[derive(Debug, Clone, Copy, IntoBytes, Immutable)]
#[repr(C)]
struct ProfileHeader {
    cmd: u8,
    profile: LightProfile,
}

/// Data report of one animation frame
#[derive(Debug, Clone, Copy, IntoBytes, Immutable)]
#[repr(C)]
struct KeyRgbDataHeader {
    cmd: u8,
    /// Position of the report within its frame (0..7)
    report: u8,
    frame: u8,
    total_frames: u8,
    time_ms: u8,
    _reserved: [u8; 2],
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable)]
#[repr(C)]
struct ImageStartHeader {
    cmd: u8,
    _pad: u8,
    stream: u8,
    _pad2: u8,
    /// Picture size in bytes, 24-bit little endian
    len: [u8; 3],
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable)]
#[repr(C)]
struct ImageDataHeader {
    cmd: u8,
    _pad: u8,
    stream: u8,
    _pad2: u8,
    index: U16,
    /// Data bytes in this report; short only in the last one
    len: u8,
}

/// Encode a command into the reports that carry it, in sending order
pub fn encode(command: &Command) -> Result<Vec<Frame>, EncodingError> {
    match command {
        Command::SetAllRgb(profile) | Command::CycleLightMode(profile) => {
            Ok(vec![profile_report(profile)?])
        }
        Command::SetKeyColor(frames) => key_color_reports(frames),
        Command::SendImage(bitmap) => image_reports(bitmap),
        Command::SendNumericDisplay(d) => {
            let report = match d.kind() {
                NumericKind::Cpu => {
                    let mut data = CPU_PREFIX.to_vec();
                    data.push(d.value());
                    short(cmd::CPU_DISPLAY, &data)?
                }
                NumericKind::Temperature => short(cmd::TEMP_DISPLAY, &[d.value()])?,
            };
            Ok(vec![report])
        }
        Command::SendTime(ts) => Ok(vec![short(cmd::TIME_DISPLAY, &time_data(ts))?]),
        Command::ClearScreen => Ok(vec![short(cmd::CLEAR_SCREEN, &[])?]),
        Command::RemapKey(remap) => Ok(vec![remap_report(remap)?]),
    }
}

fn short(code: u8, data: &[u8]) -> Result<Frame, EncodingError> {
    Frame::new(ShortHeader::new(code).as_bytes(), data)
}

/// `year (u16 BE), month, day, hour, minute, second`
fn time_data(ts: &Timestamp) -> Vec<u8> {
    let mut data = ts.year().to_be_bytes().to_vec();
    data.extend_from_slice(&ts.fields());
    data
}

fn profile_report(profile: &LightProfile) -> Result<Frame, EncodingError> {
    let header = ProfileHeader {
        cmd: cmd::SET_LIGHT_PROFILE,
        profile: *profile,
    };
    Frame::new(header.as_bytes(), &[])
}

fn remap_report(remap: &KeyRemap) -> Result<Frame, EncodingError> {
    let header = RemapHeader {
        cmd: cmd::REMAP_KEY,
        _pad: 0,
        key_index: remap.key().led_index(),
        _zero: [0; 4],
    };
    Frame::new(header.as_bytes(), &[0, 0, remap.hid_code()])
}

/// Three bytes per LED slot, black where unset
fn key_buffer(colors: &KeyColors) -> [u8; KEY_BUFFER_LEN] {
    let mut buf = [0u8; KEY_BUFFER_LEN];
    for (slot, color) in colors.slots().iter().enumerate() {
        buf[slot * 3..slot * 3 + 3].copy_from_slice(&color.to_array());
    }
    buf
}

fn key_color_reports(frames: &[KeyFrame]) -> Result<Vec<Frame>, EncodingError> {
    let total_frames = u8::try_from(frames.len()).map_err(|_| EncodingError::PayloadTooLarge {
        len: frames.len() * KEY_BUFFER_LEN,
        frames: frames.len() * KEY_REPORTS_PER_FRAME,
        limit: u8::MAX as usize * KEY_REPORTS_PER_FRAME,
    })?;

    let mut reports = Vec::with_capacity(1 + frames.len() * KEY_REPORTS_PER_FRAME);
    reports.push(short(cmd::KEY_RGB_START, &[])?);
    for (index, frame) in frames.iter().enumerate() {
        let buf = key_buffer(frame.colors());
        reports.extend(split(&buf, |report, _, _| KeyRgbDataHeader {
            cmd: cmd::KEY_RGB_DATA,
            report: report as u8,
            frame: index as u8,
            total_frames,
            time_ms: frame.time_ms(),
            _reserved: [0; 2],
        })?);
    }
    Ok(reports)
}

fn image_reports(bitmap: &Bitmap) -> Result<Vec<Frame>, EncodingError> {
    let body = bitmap.to_bytes();
    let [l0, l1, l2, _] = (body.len() as u32).to_le_bytes();
    let start = ImageStartHeader {
        cmd: cmd::IMAGE_START,
        _pad: 0,
        stream: IMAGE_STREAM,
        _pad2: 0,
        len: [l0, l1, l2],
    };
    let trailer = [0, 0, DISPLAY_WIDTH as u8, DISPLAY_HEIGHT as u8];

    let mut reports = vec![Frame::new(start.as_bytes(), &trailer)?];
    reports.extend(split(&body, |index, _, len| ImageDataHeader {
        cmd: cmd::IMAGE_DATA,
        _pad: 0,
        stream: IMAGE_STREAM,
        _pad2: 0,
        index: U16::new(index),
        len: len as u8,
    })?);
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::BITMAP_BYTES;
    use crate::command::KeyColorMap;
    use crate::led::{LightMode, RgbColor};
    use epomaker_transport::protocol::REPORT_SIZE;
    use epomaker_transport::reassemble;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn only_report(command: &Command) -> [u8; REPORT_SIZE] {
        let frames = encode(command).unwrap();
        assert_eq!(frames.len(), 1, "{}", command.name());
        frames[0].to_report()
    }

    fn starts_with(report: &[u8], head: &str) {
        let head = hex(head);
        assert_eq!(&report[..head.len()], head.as_slice());
        assert!(report[head.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_time_report() {
        let ts = Timestamp::new(2024, 12, 31, 23, 59, 58).unwrap();
        let report = only_report(&Command::send_time(ts));
        assert_eq!(report.len(), 64);
        starts_with(&report, "28000000000000d707e80c1f173b3a");
    }

    #[test]
    fn test_numeric_reports() {
        let temp = Command::send_numeric(NumericKind::Temperature, 52).unwrap();
        starts_with(&only_report(&temp), "2a000000000000d534");
        let cpu = Command::send_numeric(NumericKind::Cpu, 37).unwrap();
        starts_with(&only_report(&cpu), "22000000000000dd63007f000400080025");
    }

    #[test]
    fn test_clear_screen_report() {
        starts_with(&only_report(&Command::clear_screen()), "ac00000000000053");
    }

    #[test]
    fn test_profile_report() {
        let p = LightProfile::new(LightMode::SineWave, 2, 3, RgbColor::new(9, 8, 7)).unwrap();
        let report = only_report(&Command::set_light_profile(p));
        // 0xFF - (07 + 0a + 02 + 03 + 07 + 09 + 08 + 07)
        starts_with(&report, "070a020307090807ca");
    }

    #[test]
    fn test_remap_report() {
        let report = only_report(&Command::remap_key("caps", 0x29).unwrap());
        // Only the header is summed: 0xFF - (0x13 + 3)
        starts_with(&report, "13000300000000e9000029");
    }

    #[test]
    fn test_key_colors_reports() {
        let mut map = KeyColorMap::new();
        map.insert("F", RgbColor::new(1, 2, 3));
        let frames = encode(&Command::set_key_colors(&map).unwrap()).unwrap();
        assert_eq!(frames.len(), 1 + KEY_REPORTS_PER_FRAME);
        starts_with(&frames[0].to_report(), "18000000000000e7");

        for (i, f) in frames[1..].iter().enumerate() {
            assert_eq!(f.header(), &[0x19, i as u8, 0, 1, 0, 0, 0]);
            assert!(f.verify_checksum());
            assert_eq!(f.payload().len(), 56);
        }
        let body = reassemble(&frames[1..]).unwrap();
        assert_eq!(body.len(), KEY_BUFFER_LEN);
        assert_eq!(&body[27 * 3..27 * 3 + 3], &[1, 2, 3]);
    }

    #[test]
    fn test_key_animation_frames() {
        let red = KeyColorMap::all(RgbColor::RED);
        let green = KeyColorMap::all(RgbColor::GREEN);
        let command = Command::set_key_frames(&[(red, 100), (green, 200)]).unwrap();
        let frames = encode(&command).unwrap();
        assert_eq!(frames.len(), 1 + 2 * KEY_REPORTS_PER_FRAME);

        let second = &frames[1 + KEY_REPORTS_PER_FRAME..];
        for (i, f) in second.iter().enumerate() {
            assert_eq!(f.header(), &[0x19, i as u8, 1, 2, 200, 0, 0]);
        }
        assert_eq!(frames[1].header()[4], 100);
        assert_eq!(&second[0].payload()[..3], &[0, 255, 0]);
    }

    #[test]
    fn test_image_reports() {
        let frames = encode(&Command::send_image(Bitmap::solid(255, 0, 0)).unwrap()).unwrap();
        assert_eq!(frames.len(), 1002);
        starts_with(&frames[0].to_report(), "a5000100f4da008b0000a2ad");

        let first = frames[1].to_report();
        assert_eq!(&first[..7], &hex("25000100000038"));
        assert_eq!(first[7], 0xFF - (0x25 + 0x01 + 0x38));
        assert_eq!(&first[8..10], &[0xF8, 0x00]);

        let second = frames[2].to_report();
        assert_eq!(&second[..7], &hex("25000100010038"));

        let footer = frames[1001].to_report();
        assert_eq!(&footer[..7], &hex("25000100e80334"));
        assert!(frames[1001].verify_checksum());
        assert_eq!(frames[1001].payload().len(), 52);
        assert!(footer[8 + 52..].iter().all(|&b| b == 0));

        assert_eq!(reassemble(&frames[1..]).unwrap().len(), BITMAP_BYTES);
    }
}
