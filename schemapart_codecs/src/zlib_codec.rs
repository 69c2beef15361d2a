use std::io::{self, Read};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use schemapart_core::codec::Codec;
use schemapart_core::format::{Format, DEFAULT_ZLIB_LEVEL};

/// Zlib container codec (2-byte header, Adler-32 trailer).
pub struct ZlibCodec {
    pub level: u32,
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_ZLIB_LEVEL,
        }
    }
}

impl ZlibCodec {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Codec for ZlibCodec {
    fn format(&self) -> Format {
        Format::Zlib
    }

    /// CM must be 8 (deflate) and CMF/FLG must be a multiple of 31.
    fn recognizes(&self, data: &[u8]) -> bool {
        match data {
            [cmf, flg, ..] => cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
            _ => false,
        }
    }

    fn decoder<'a>(&self, compressed: &'a [u8]) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(ZlibDecoder::new(compressed)))
    }

    fn encode_from(&self, src: &mut dyn Read) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        io::copy(src, &mut encoder)?;
        encoder.finish()
    }
}
