use std::io::{self, Read};

use schemapart_core::codec::Codec;
use schemapart_core::format::{Format, DEFAULT_ZSTD_LEVEL, ZSTD_MAGIC};

/// Zstandard codec.
///
/// Single-threaded compression at a fixed level, so identical input always
/// yields identical frames.
pub struct ZstdCodec {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Codec for ZstdCodec {
    fn format(&self) -> Format {
        Format::Zstd
    }

    fn recognizes(&self, data: &[u8]) -> bool {
        data.starts_with(&ZSTD_MAGIC)
    }

    fn decoder<'a>(&self, compressed: &'a [u8]) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(zstd::stream::read::Decoder::with_buffer(compressed)?))
    }

    fn encode_from(&self, src: &mut dyn Read) -> io::Result<Vec<u8>> {
        let mut encoder = zstd::stream::write::Encoder::new(Vec::new(), self.level)?;
        io::copy(src, &mut encoder)?;
        encoder.finish()
    }
}
