mod deflate_codec;
mod gzip_codec;
mod zlib_codec;
mod zstd_codec;

pub use deflate_codec::DeflateCodec;
pub use gzip_codec::GzipCodec;
pub use zlib_codec::ZlibCodec;
pub use zstd_codec::ZstdCodec;

use schemapart_core::error::CodecError;
use schemapart_core::format::{Format, LegacyFormat, TargetFormat};
use schemapart_core::transcode;
use schemapart_core::{Codec, Transcoder};

fn flate_level(format: Format, level: i32) -> Result<u32, CodecError> {
    u32::try_from(level)
        .ok()
        .filter(|l| *l <= 9)
        .ok_or(CodecError::InvalidLevel { format, level })
}

/// Resolve a codec for `format`, at `level` or the format's default.
pub fn codec_for(format: Format, level: Option<i32>) -> Result<Box<dyn Codec>, CodecError> {
    let codec: Box<dyn Codec> = match (format, level) {
        (Format::Gzip, None) => Box::new(GzipCodec::default()),
        (Format::Gzip, Some(l)) => Box::new(GzipCodec::new(flate_level(format, l)?)),
        (Format::Zlib, None) => Box::new(ZlibCodec::default()),
        (Format::Zlib, Some(l)) => Box::new(ZlibCodec::new(flate_level(format, l)?)),
        (Format::Deflate, None) => Box::new(DeflateCodec::default()),
        (Format::Deflate, Some(l)) => Box::new(DeflateCodec::new(flate_level(format, l)?)),
        (Format::Zstd, None) => Box::new(ZstdCodec::default()),
        (Format::Zstd, Some(l)) => {
            if !zstd::compression_level_range().contains(&l) {
                return Err(CodecError::InvalidLevel { format, level: l });
            }
            Box::new(ZstdCodec::new(l))
        }
    };
    Ok(codec)
}

/// Codec pair for one blob field. The level applies to the target only.
pub fn transcoder(
    from: LegacyFormat,
    to: TargetFormat,
    level: Option<i32>,
) -> Result<Transcoder, CodecError> {
    Ok(Transcoder::new(
        codec_for(from.into(), None)?,
        codec_for(to.into(), level)?,
    ))
}

/// Inflate a blob written in a legacy format.
pub fn decode(compressed: &[u8], format: LegacyFormat) -> Result<Vec<u8>, CodecError> {
    transcode::decode(codec_for(format.into(), None)?.as_ref(), compressed)
}

/// Compress `plain` in a target format; `None` picks the format's default level.
pub fn encode(plain: &[u8], format: TargetFormat, level: Option<i32>) -> Result<Vec<u8>, CodecError> {
    transcode::encode(codec_for(format.into(), level)?.as_ref(), plain)
}

/// Decode then re-encode in one streaming pass, at the target's default level.
pub fn transcode(
    compressed: &[u8],
    from: LegacyFormat,
    to: TargetFormat,
) -> Result<Vec<u8>, CodecError> {
    Ok(transcoder(from, to, None)?.transcode(compressed)?.bytes)
}
