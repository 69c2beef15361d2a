use std::io::{self, Read};

use xxhash_rust::xxh3::{xxh3_64, Xxh3};

use crate::codec::Codec;
use crate::error::CodecError;

/// Inflate `compressed` fully into memory.
pub fn decode(codec: &dyn Codec, compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    let decode_err = |source| CodecError::Decode {
        format: codec.format(),
        source,
    };
    let mut reader = codec.decoder(compressed).map_err(decode_err)?;
    let mut plain = Vec::new();
    reader.read_to_end(&mut plain).map_err(decode_err)?;
    Ok(plain)
}

/// Compress `plain` in one call.
pub fn encode(codec: &dyn Codec, plain: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut src = plain;
    codec.encode_from(&mut src).map_err(|source| CodecError::Encode {
        format: codec.format(),
        source,
    })
}

/// Result of a streaming transcode.
#[derive(Debug, Clone)]
pub struct Transcoded {
    /// Output in the target format.
    pub bytes: Vec<u8>,
    /// Number of decompressed bytes that passed through.
    pub plain_len: u64,
    /// xxh3-64 of the decompressed bytes.
    pub digest: u64,
}

/// Decode `compressed` with `from` and re-encode it with `to` in a single pass.
///
/// The decoder is pumped straight into the encoder, so the decompressed
/// payload is never held in one piece.
pub fn transcode(
    compressed: &[u8],
    from: &dyn Codec,
    to: &dyn Codec,
) -> Result<Transcoded, CodecError> {
    let inner = from.decoder(compressed).map_err(|source| CodecError::Decode {
        format: from.format(),
        source,
    })?;
    let mut src = DigestReader::new(inner);

    match to.encode_from(&mut src) {
        Ok(bytes) => Ok(Transcoded {
            bytes,
            plain_len: src.len,
            digest: src.hasher.digest(),
        }),
        // A failed read came from the source stream, anything else from the encoder.
        Err(source) if src.failed => Err(CodecError::Decode {
            format: from.format(),
            source,
        }),
        Err(source) => Err(CodecError::Encode {
            format: to.format(),
            source,
        }),
    }
}

/// Read adapter that hashes everything passing through and remembers whether
/// the underlying stream ever failed.
struct DigestReader<'a> {
    inner: Box<dyn Read + 'a>,
    hasher: Xxh3,
    len: u64,
    failed: bool,
}

impl<'a> DigestReader<'a> {
    fn new(inner: Box<dyn Read + 'a>) -> Self {
        Self {
            inner,
            hasher: Xxh3::new(),
            len: 0,
            failed: false,
        }
    }
}

impl Read for DigestReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.hasher.update(&buf[..n]);
                self.len += n as u64;
                Ok(n)
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.failed = true;
                }
                Err(e)
            }
        }
    }
}

/// A fixed source → target codec pair, applied to one blob field of every record.
pub struct Transcoder {
    from: Box<dyn Codec>,
    to: Box<dyn Codec>,
}

impl Transcoder {
    pub fn new(from: Box<dyn Codec>, to: Box<dyn Codec>) -> Self {
        Self { from, to }
    }

    pub fn source(&self) -> &dyn Codec {
        self.from.as_ref()
    }

    pub fn target(&self) -> &dyn Codec {
        self.to.as_ref()
    }

    pub fn decode(&self, compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
        decode(self.from.as_ref(), compressed)
    }

    /// Encode an already decoded buffer, returning the output and the plain digest.
    pub fn encode(&self, plain: &[u8]) -> Result<Transcoded, CodecError> {
        Ok(Transcoded {
            bytes: encode(self.to.as_ref(), plain)?,
            plain_len: plain.len() as u64,
            digest: xxh3_64(plain),
        })
    }

    pub fn transcode(&self, compressed: &[u8]) -> Result<Transcoded, CodecError> {
        transcode(compressed, self.from.as_ref(), self.to.as_ref())
    }

    /// Decode `output` with the target codec and return its xxh3-64 digest.
    pub fn redecode_digest(&self, output: &[u8]) -> Result<u64, CodecError> {
        Ok(xxh3_64(&decode(self.to.as_ref(), output)?))
    }
}

impl std::fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transcoder({} -> {})", self.from.name(), self.to.name())
    }
}
