use std::io::{self, Read};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use schemapart_core::codec::Codec;
use schemapart_core::format::{Format, DEFAULT_GZIP_LEVEL, GZIP_MAGIC};

/// Gzip container codec.
///
/// Decoding reads every member of a multi-member stream, so concatenated gzip
/// blobs inflate to the concatenation of their payloads. The header written on
/// encode carries no timestamp or file name, which keeps output deterministic.
pub struct GzipCodec {
    /// Compression level (0 = store, 9 = smallest).
    pub level: u32,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_GZIP_LEVEL,
        }
    }
}

impl GzipCodec {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Codec for GzipCodec {
    fn format(&self) -> Format {
        Format::Gzip
    }

    fn recognizes(&self, data: &[u8]) -> bool {
        data.starts_with(&GZIP_MAGIC)
    }

    fn decoder<'a>(&self, compressed: &'a [u8]) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(MultiGzDecoder::new(compressed)))
    }

    fn encode_from(&self, src: &mut dyn Read) -> io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        io::copy(src, &mut encoder)?;
        encoder.finish()
    }
}
