use chrono::Utc;
use runcat_model::RecordId;

/// A stored document: arbitrary JSON with a string `_id` field once inserted.
pub type DocJson = serde_json::Value;

/// Field every stored document is keyed by.
pub const ID_FIELD: &str = "_id";

/// Returns the document's record id, if it has one.
pub fn doc_id(doc: &DocJson) -> Option<&str> {
    doc.get(ID_FIELD).and_then(|v| v.as_str())
}

/// Generates 24-hex-char record ids: 4 bytes of epoch seconds, 5 bytes of
/// per-process entropy, 3 bytes of counter.
///
/// Ids sort roughly by creation time and stay unique across processes as
/// long as the entropy differs, without any coordination between them.
#[derive(Debug)]
pub(crate) struct IdGenerator {
    entropy: [u8; 5],
    counter: u32,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self {
            entropy: rand::random(),
            counter: rand::random::<u32>() & 0x00ff_ffff,
        }
    }

    pub(crate) fn next_id(&mut self) -> RecordId {
        let secs = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let mut out = format!("{:08x}", secs);
        for byte in &self.entropy {
            out.push_str(&format!("{:02x}", byte));
        }
        out.push_str(&format!("{:06x}", self.counter & 0x00ff_ffff));
        self.counter = self.counter.wrapping_add(1);
        RecordId::new(out)
    }
}
