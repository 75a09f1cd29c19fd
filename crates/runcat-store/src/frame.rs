use crate::errors::StoreError;

/// Store file magic bytes: `b"RCAT"`.
pub const MAGIC: &[u8; 4] = b"RCAT";

/// Current store file format version: `0x0001`.
pub const VERSION: u16 = 0x0001;

/// File header size in bytes.
pub const FILE_HEADER_SIZE: usize = 16;

/// Frame header size in bytes.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Maximum payload size for one journaled operation: 16 MiB.
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Frame kind byte: UTF-8 JSON operation record.
pub const FRAME_KIND_OP_JSON: u8 = 0x01;

/// Store file header (16 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic bytes: `"RCAT"`.
    pub magic: [u8; 4],
    /// Format version: `0x0001`.
    pub version: u16,
    /// Reserved flags (must be 0).
    pub flags: u16,
    /// Reserved bytes (must be all zeros).
    pub reserved: [u8; 8],
}

impl FileHeader {
    /// Creates a header for the current format version.
    pub fn new() -> Self {
        Self {
            magic: *MAGIC,
            version: VERSION,
            flags: 0,
            reserved: [0; 8],
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.reserved);
        bytes
    }

    /// Deserializes a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(StoreError::InvalidHeader(format!(
                "header too short: {} bytes",
                bytes.len()
            )));
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != *MAGIC {
            return Err(StoreError::InvalidHeader(format!(
                "invalid magic: {:?}, expected {:?}",
                magic, MAGIC
            )));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(StoreError::InvalidHeader(format!(
                "unsupported version: 0x{:04x}, expected 0x{:04x}",
                version, VERSION
            )));
        }

        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        if flags != 0 {
            return Err(StoreError::InvalidHeader(format!(
                "non-zero flags: 0x{:04x}",
                flags
            )));
        }

        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&bytes[8..16]);
        if reserved != [0u8; 8] {
            return Err(StoreError::InvalidHeader(
                "non-zero reserved bytes".to_string(),
            ));
        }

        Ok(Self {
            magic,
            version,
            flags,
            reserved,
        })
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a journaled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// UTF-8 JSON object describing one store mutation.
    OpJson,
    /// Unknown/unsupported frame kind; skippable in permissive reads.
    Unknown(u8),
}

impl FrameKind {
    /// Creates a FrameKind from a byte value.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            FRAME_KIND_OP_JSON => FrameKind::OpJson,
            _ => FrameKind::Unknown(byte),
        }
    }

    /// Returns the byte value for this kind.
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::OpJson => FRAME_KIND_OP_JSON,
            FrameKind::Unknown(b) => b,
        }
    }
}

/// Frame header preceding each journaled operation (8 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpFrame {
    /// Frame kind.
    pub kind: FrameKind,
    /// Reserved bytes (must be all zeros).
    pub reserved: [u8; 3],
    /// Payload length in bytes (little-endian).
    pub len: u32,
}

impl OpFrame {
    /// Creates a new frame header, bounding the payload size.
    pub fn new(kind: FrameKind, len: u32) -> Result<Self, StoreError> {
        if len > MAX_PAYLOAD_SIZE {
            return Err(StoreError::PayloadTooLarge {
                size: len,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            kind,
            reserved: [0; 3],
            len,
        })
    }

    /// Serializes the frame header to bytes.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[0] = self.kind.to_byte();
        bytes[1..4].copy_from_slice(&self.reserved);
        bytes[4..8].copy_from_slice(&self.len.to_le_bytes());
        bytes
    }

    /// Deserializes a frame header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(StoreError::InvalidFrame {
                offset: 0,
                reason: format!("frame header too short: {} bytes", bytes.len()),
            });
        }

        let kind = FrameKind::from_byte(bytes[0]);
        let reserved = [bytes[1], bytes[2], bytes[3]];
        if reserved != [0u8; 3] {
            return Err(StoreError::InvalidFrame {
                offset: 0,
                reason: "non-zero reserved bytes".to_string(),
            });
        }
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        if len > MAX_PAYLOAD_SIZE {
            return Err(StoreError::InvalidFrame {
                offset: 0,
                reason: format!("payload size {} exceeds maximum {}", len, MAX_PAYLOAD_SIZE),
            });
        }

        Ok(Self { kind, reserved, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = FileHeader::new();
        let bytes = header.to_bytes();
        let restored = FileHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header, restored);
    }

    #[test]
    fn header_rejects_invalid_magic() {
        let mut bytes = FileHeader::new().to_bytes();
        bytes[0] = b'X';
        assert!(FileHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn header_rejects_invalid_version() {
        let mut bytes = FileHeader::new().to_bytes();
        bytes[4] = 0x02;
        bytes[5] = 0x00;
        let err = FileHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn header_rejects_non_zero_flags() {
        let mut bytes = FileHeader::new().to_bytes();
        bytes[6] = 0x01;
        assert!(FileHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn frame_round_trip() {
        let frame = OpFrame::new(FrameKind::OpJson, 1024).unwrap();
        let bytes = frame.to_bytes();
        let restored = OpFrame::from_bytes(&bytes).unwrap();
        assert_eq!(frame, restored);
    }

    #[test]
    fn frame_rejects_oversized_payload() {
        assert!(OpFrame::new(FrameKind::OpJson, MAX_PAYLOAD_SIZE + 1).is_err());
    }

    #[test]
    fn frame_rejects_non_zero_reserved() {
        let mut bytes = OpFrame::new(FrameKind::OpJson, 100).unwrap().to_bytes();
        bytes[1] = 0x01;
        assert!(OpFrame::from_bytes(&bytes).is_err());
    }

    #[test]
    fn frame_kind_unknown_round_trips() {
        let kind = FrameKind::from_byte(0xFF);
        assert_eq!(kind.to_byte(), 0xFF);
    }
}
