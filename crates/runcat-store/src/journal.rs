//! Operation journal reader and writer.
//!
//! [`FileStore`](crate::FileStore) durability is a framed, append-only
//! journal of store mutations. Each frame carries one [`JournalOp`] as UTF-8
//! JSON; replaying the frames in order rebuilds the store contents.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::doc::DocJson;
use crate::errors::StoreError;
use crate::frame::{FileHeader, FrameKind, OpFrame, FILE_HEADER_SIZE, FRAME_HEADER_SIZE};

/// One journaled store mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalOp {
    /// A document was inserted into a collection. The document carries its
    /// assigned `_id`.
    Insert {
        /// Collection the document was inserted into.
        collection: String,
        /// The full document, id included.
        doc: DocJson,
    },
    /// A document replaced the stored document with the same `_id`.
    Replace {
        /// Collection the replacement happened in.
        collection: String,
        /// The full replacement document, id included.
        doc: DocJson,
    },
}

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
    /// Whether to append to an existing file (default: true).
    pub append: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
            append: true,
        }
    }
}

/// Appends operations to a store file.
///
/// # Example
///
/// ```rust
/// use runcat_store::journal::{JournalOp, OpWriter, WriteOptions};
/// use serde_json::json;
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("catalog.rcat");
///
/// let mut writer = OpWriter::open(&path, WriteOptions::default())?;
/// writer.append(&JournalOp::Insert {
///     collection: "headers".to_string(),
///     doc: json!({"_id": "h1", "scan_id": 1}),
/// })?;
/// writer.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct OpWriter {
    file: File,
    sync: bool,
    header_written: bool,
}

impl OpWriter {
    /// Opens or creates a store file for appending.
    ///
    /// An empty file gets a fresh [`FileHeader`]; an existing file must start
    /// with a valid one. With `options.append` unset the file is reset to
    /// just its header before writing.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(options.create)
            .write(true)
            .read(true)
            .open(path)?;

        let mut writer = Self {
            file,
            sync: options.sync,
            header_written: false,
        };

        let metadata = writer.file.metadata()?;
        if metadata.len() == 0 {
            writer.write_header()?;
        } else if metadata.len() < FILE_HEADER_SIZE as u64 {
            return Err(StoreError::InvalidHeader(format!(
                "existing file too short for a header: {} bytes",
                metadata.len()
            )));
        } else {
            let mut header_bytes = [0u8; FILE_HEADER_SIZE];
            writer.file.seek(io::SeekFrom::Start(0))?;
            writer.file.read_exact(&mut header_bytes)?;
            FileHeader::from_bytes(&header_bytes)?;
            writer.header_written = true;
            if options.append {
                writer.file.seek(io::SeekFrom::End(0))?;
            } else {
                writer.file.set_len(FILE_HEADER_SIZE as u64)?;
                writer.file.seek(io::SeekFrom::Start(FILE_HEADER_SIZE as u64))?;
            }
        }

        Ok(writer)
    }

    fn write_header(&mut self) -> Result<(), StoreError> {
        let bytes = FileHeader::new().to_bytes();
        self.file.write_all(&bytes)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        self.header_written = true;
        Ok(())
    }

    /// Appends one operation to the journal.
    pub fn append(&mut self, op: &JournalOp) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(op)?;
        self.append_raw(FrameKind::OpJson, &payload)
    }

    /// Appends a raw frame with the given kind and payload.
    pub fn append_raw(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), StoreError> {
        if !self.header_written {
            return Err(StoreError::InvalidHeader("header not written".to_string()));
        }

        let frame = OpFrame::new(kind, payload.len() as u32)?;
        self.file.write_all(&frame.to_bytes())?;
        self.file.write_all(payload)?;
        self.file.flush()?;

        if self.sync {
            self.file.sync_all()?;
        }

        Ok(())
    }

    /// Finishes writing and closes the file.
    pub fn finish(mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for OpWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.sync_all();
        }
    }
}

/// Read mode for handling truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Strict mode: truncated frames are errors.
    Strict,
    /// Permissive mode: truncation is treated as end-of-file.
    Permissive,
}

/// Reads operations back from a store file.
pub struct OpReader {
    file: File,
    mode: ReadMode,
    position: u64,
}

impl OpReader {
    /// Opens a store file for reading.
    ///
    /// The file header is validated and the reader is positioned at the
    /// first frame after it.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, StoreError> {
        let mut file = File::open(path)?;
        file.seek(io::SeekFrom::Start(0))?;
        let mut header_bytes = [0u8; FILE_HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        FileHeader::from_bytes(&header_bytes)?;

        Ok(Self {
            file,
            mode,
            position: FILE_HEADER_SIZE as u64,
        })
    }

    /// Returns the offset of the first unconsumed frame.
    ///
    /// A torn tail frame is never consumed, so after a permissive read
    /// runs dry this is exactly the length of the intact prefix.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` at end-of-file, or on truncation in permissive
    /// mode. The position only advances past whole frames.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, StoreError> {
        self.file.seek(io::SeekFrom::Start(self.position))?;

        let file_size = self.file.metadata()?.len();
        if self.position >= file_size {
            return Ok(None);
        }

        let mut frame_header_bytes = [0u8; FRAME_HEADER_SIZE];
        match self.file.read_exact(&mut frame_header_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if self.mode == ReadMode::Permissive {
                    return Ok(None);
                }
                return Err(StoreError::TruncatedFrame {
                    offset: self.position,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let frame = OpFrame::from_bytes(&frame_header_bytes).map_err(|e| match e {
            StoreError::InvalidFrame { offset: _, reason } => StoreError::InvalidFrame {
                offset: self.position,
                reason,
            },
            other => other,
        })?;

        let mut payload = vec![0u8; frame.len as usize];
        match self.file.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if self.mode == ReadMode::Permissive {
                    return Ok(None);
                }
                return Err(StoreError::TruncatedFrame {
                    offset: self.position,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.position += FRAME_HEADER_SIZE as u64 + frame.len as u64;

        Ok(Some((frame.kind, payload)))
    }

    /// Reads the next operation, skipping unknown frame kinds.
    ///
    /// Returns `Ok(None)` at end-of-file.
    pub fn read_op(&mut self) -> Result<Option<JournalOp>, StoreError> {
        loop {
            match self.read_frame()? {
                None => return Ok(None),
                Some((FrameKind::OpJson, payload)) => {
                    let text = std::str::from_utf8(&payload)?;
                    let op: JournalOp = serde_json::from_str(text)?;
                    return Ok(Some(op));
                }
                Some((FrameKind::Unknown(_), _)) => {
                    continue;
                }
            }
        }
    }
}
