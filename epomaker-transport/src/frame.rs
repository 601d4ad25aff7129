//! Fixed-size report frames
//!
//! Every transfer to the keyboard is a run of 64-byte feature reports. A
//! report starts with a command-specific header, followed by a checksum over
//! that header and then the data, zero padded to the report size.
//!
//! ```text
//! [0]              command code
//! [1..h]           rest of the header (layout depends on the command)
//! [h]              checksum = 0xFF - (sum(header) & 0xFF)
//! [h+1..h+1+len]   data
//! [..64]           zero padding
//! ```
//!
//! Large bodies (key colors, pictures) are cut into 56-byte chunks by
//! [`split`]; the caller supplies each chunk's header so the position can be
//! written in whatever form the command expects.

use zerocopy::{Immutable, IntoBytes};

use crate::error::{EncodingError, FrameError};
use crate::protocol::{calculate_checksum, MAX_FRAMES, REPORT_SIZE};

/// One feature report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; REPORT_SIZE],
    header_len: usize,
    data_len: usize,
}

impl Frame {
    /// Build a report from its header and data; the checksum goes in between.
    pub fn new(header: &[u8], data: &[u8]) -> Result<Self, EncodingError> {
        if header.is_empty() {
            return Err(EncodingError::EmptyHeader);
        }
        let used = header.len() + 1 + data.len();
        if used > REPORT_SIZE {
            return Err(EncodingError::ReportOverflow {
                header: header.len(),
                data: data.len(),
            });
        }

        let mut bytes = [0u8; REPORT_SIZE];
        bytes[..header.len()].copy_from_slice(header);
        bytes[header.len()] = calculate_checksum(header);
        bytes[header.len() + 1..used].copy_from_slice(data);
        Ok(Self {
            bytes,
            header_len: header.len(),
            data_len: data.len(),
        })
    }

    /// Command code carried by this report
    pub fn command(&self) -> u8 {
        self.bytes[0]
    }

    /// Header bytes covered by the checksum
    pub fn header(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[self.header_len]
    }

    /// Data after the checksum, without padding
    pub fn payload(&self) -> &[u8] {
        let start = self.header_len + 1;
        &self.bytes[start..start + self.data_len]
    }

    /// Recompute the checksum and compare it with the stored one
    pub fn verify_checksum(&self) -> bool {
        calculate_checksum(self.header()) == self.checksum()
    }

    /// The report exactly as written to the device
    pub fn to_report(&self) -> [u8; REPORT_SIZE] {
        self.bytes
    }
}

/// Cut `payload` into data reports.
///
/// `header(index, total, len)` builds the header of chunk `index` out of
/// `total`, where `len` is the number of data bytes that chunk carries. The
/// chunk size is whatever is left of the report after the header and its
/// checksum. An empty payload still produces one report.
pub fn split<H, F>(payload: &[u8], mut header: F) -> Result<Vec<Frame>, EncodingError>
where
    H: IntoBytes + Immutable,
    F: FnMut(u16, u16, usize) -> H,
{
    let header_len = std::mem::size_of::<H>();
    if header_len == 0 || header_len + 1 >= REPORT_SIZE {
        return Err(EncodingError::ReportOverflow {
            header: header_len,
            data: payload.len(),
        });
    }
    let capacity = REPORT_SIZE - header_len - 1;
    let frames = payload.len().div_ceil(capacity).max(1);
    if frames > MAX_FRAMES {
        return Err(EncodingError::PayloadTooLarge {
            len: payload.len(),
            frames,
            limit: MAX_FRAMES,
        });
    }
    let total = frames as u16;

    if payload.is_empty() {
        return Ok(vec![Frame::new(header(0, total, 0).as_bytes(), &[])?]);
    }

    payload
        .chunks(capacity)
        .enumerate()
        .map(|(i, chunk)| Frame::new(header(i as u16, total, chunk.len()).as_bytes(), chunk))
        .collect()
}

/// Put a streamed body back together from its data reports.
///
/// Every report must carry the same command code and a valid checksum.
pub fn reassemble(frames: &[Frame]) -> Result<Vec<u8>, FrameError> {
    let first = frames.first().ok_or(FrameError::Empty)?;
    let cmd = first.command();

    let mut payload = Vec::with_capacity(frames.iter().map(|f| f.payload().len()).sum());
    for (index, frame) in frames.iter().enumerate() {
        if frame.command() != cmd {
            return Err(FrameError::MixedCommand {
                expected: cmd,
                got: frame.command(),
            });
        }
        if !frame.verify_checksum() {
            return Err(FrameError::Checksum {
                index,
                stored: frame.checksum(),
                computed: calculate_checksum(frame.header()),
            });
        }
        payload.extend_from_slice(frame.payload());
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DATA_CAPACITY, SHORT_HEADER_LEN};

    fn seq_header(index: u16, total: u16, len: usize) -> [u8; 7] {
        let [lo, hi] = index.to_le_bytes();
        [0x19, lo, hi, total as u8, len as u8, 0, 0]
    }

    #[test]
    fn test_single_report_layout() {
        let frame = Frame::new(&[0x2A, 0, 0, 0, 0, 0, 0], &[52]).unwrap();
        let report = frame.to_report();
        assert_eq!(report.len(), REPORT_SIZE);
        assert_eq!(&report[..9], &[0x2A, 0, 0, 0, 0, 0, 0, 0xD5, 52]);
        assert!(report[9..].iter().all(|&b| b == 0));
        assert_eq!(frame.command(), 0x2A);
        assert_eq!(frame.header().len(), SHORT_HEADER_LEN);
        assert_eq!(frame.payload(), &[52]);
    }

    #[test]
    fn test_data_not_in_checksum() {
        let a = Frame::new(&[0x13, 0, 0x05, 0, 0, 0, 0], &[0, 0, 0x04]).unwrap();
        let b = Frame::new(&[0x13, 0, 0x05, 0, 0, 0, 0], &[0, 0, 0x29]).unwrap();
        assert_eq!(a.checksum(), 0xFF - 0x13 - 0x05);
        assert_eq!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_eight_byte_header_moves_checksum() {
        let frame = Frame::new(&[0x07, 0x01, 4, 4, 0x07, 255, 255, 255], &[]).unwrap();
        let report = frame.to_report();
        assert_eq!(report[8], frame.checksum());
        assert!(frame.verify_checksum());
        assert!(report[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_report_overflow() {
        assert_eq!(
            Frame::new(&[0x25; 8], &[0; 56]),
            Err(EncodingError::ReportOverflow {
                header: 8,
                data: 56
            })
        );
        assert_eq!(Frame::new(&[], &[1]), Err(EncodingError::EmptyHeader));
    }

    #[test]
    fn test_split_full_chunks() {
        let payload: Vec<u8> = (0..200u32).map(|i| i as u8).collect();
        let frames = split(&payload, seq_header).unwrap();
        assert_eq!(frames.len(), 4);
        for (i, f) in frames.iter().enumerate() {
            assert_eq!(f.header()[1] as usize, i);
            assert_eq!(f.header()[3], 4);
            assert!(f.verify_checksum());
        }
        assert_eq!(frames[0].payload().len(), DATA_CAPACITY);
        assert_eq!(frames[3].header()[4] as usize, 200 - 3 * DATA_CAPACITY);
        assert_eq!(reassemble(&frames).unwrap(), payload);
    }

    #[test]
    fn test_empty_payload_one_report() {
        let frames = split(&[], seq_header).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].payload().is_empty());
        assert!(frames[0].verify_checksum());
    }

    #[test]
    fn test_reassemble_rejects_mixed_and_empty() {
        let mut frames = split(&[1u8; 100], seq_header).unwrap();
        frames.push(Frame::new(&[0x25, 0, 0, 0, 0, 0, 0], &[1]).unwrap());
        assert!(matches!(
            reassemble(&frames),
            Err(FrameError::MixedCommand {
                expected: 0x19,
                got: 0x25
            })
        ));
        assert_eq!(reassemble(&[]), Err(FrameError::Empty));
    }

    #[test]
    fn test_too_many_frames() {
        let payload = vec![0u8; DATA_CAPACITY * MAX_FRAMES + 1];
        match split(&payload, seq_header) {
            Err(EncodingError::PayloadTooLarge { frames, limit, .. }) => {
                assert_eq!(frames, MAX_FRAMES + 1);
                assert_eq!(limit, MAX_FRAMES);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }
}
