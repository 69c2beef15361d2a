use std::io::{self, Read};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use schemapart_core::codec::Codec;
use schemapart_core::format::{Format, DEFAULT_DEFLATE_LEVEL};

/// Raw deflate codec: the bare RFC 1951 stream with no header or trailer.
///
/// This is what is left of a gzip blob once its container is dropped, and it
/// must be read back with a raw inflater. There is no checksum, so corruption
/// inside the body is only caught when it breaks the deflate block structure.
pub struct DeflateCodec {
    pub level: u32,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_DEFLATE_LEVEL,
        }
    }
}

impl DeflateCodec {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Codec for DeflateCodec {
    fn format(&self) -> Format {
        Format::Deflate
    }

    fn decoder<'a>(&self, compressed: &'a [u8]) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(DeflateDecoder::new(compressed)))
    }

    fn encode_from(&self, src: &mut dyn Read) -> io::Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        io::copy(src, &mut encoder)?;
        encoder.finish()
    }
}
