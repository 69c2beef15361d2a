use std::io::Read;

use crate::format::Format;

/// Core compression abstraction.
///
/// Each `Codec` implementation:
/// - Is identified by the [`Format`] it reads and writes.
/// - Works on a single self-contained blob; no state is carried between
///   records, so a codec can be reused for every row of a run.
/// - Exposes decompression as a `Read` adapter so callers can pump a blob
///   straight into another codec's encoder without buffering it whole.
pub trait Codec: Send + Sync {
    fn format(&self) -> Format;

    /// Human-readable codec name for logs and CLI display.
    fn name(&self) -> &'static str {
        self.format().name()
    }

    /// Cheap header sniff: does `data` look like it was written in this format?
    ///
    /// Formats without any framing (raw deflate) cannot tell and return `true`.
    fn recognizes(&self, data: &[u8]) -> bool {
        let _ = data;
        true
    }

    /// Wrap `compressed` so that reads yield the decompressed bytes.
    ///
    /// Header, checksum, and truncation errors surface from `read`.
    fn decoder<'a>(&self, compressed: &'a [u8]) -> std::io::Result<Box<dyn Read + 'a>>;

    /// Compress everything `src` yields into a fresh buffer.
    fn encode_from(&self, src: &mut dyn Read) -> std::io::Result<Vec<u8>>;
}
