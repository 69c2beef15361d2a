use std::io::Read;

use flate2::read::DeflateDecoder;
use xxhash_rust::xxh3::xxh3_64;

use schemapart_codecs::{codec_for, decode, encode, transcode, transcoder, GzipCodec, ZlibCodec};
use schemapart_core::format::{Format, LegacyFormat, TargetFormat};
use schemapart_core::transcode as pipeline;
use schemapart_core::{Codec, CodecError};

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// A mapblock-like buffer: mostly air with a few repeating node ids.
fn mapblock_like(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size * 4];
    for i in 0..size {
        let id = (i % 7) as u16 * 3;
        buf[2 * i..2 * i + 2].copy_from_slice(&id.to_le_bytes());
        buf[2 * size + i] = if i % 16 == 0 { 0x0f } else { 0 };
    }
    buf
}

fn compress(format: Format, plain: &[u8]) -> Vec<u8> {
    pipeline::encode(codec_for(format, None).unwrap().as_ref(), plain).unwrap()
}

#[test]
fn test_roundtrip_every_format() {
    let inputs = [
        Vec::new(),
        b"x".to_vec(),
        mapblock_like(4096),
        pseudo_random_bytes(100_000, 0xDEAD_BEEF),
    ];
    for format in Format::ALL {
        let codec = codec_for(format, None).unwrap();
        for plain in &inputs {
            let compressed = pipeline::encode(codec.as_ref(), plain).unwrap();
            let restored = pipeline::decode(codec.as_ref(), &compressed).unwrap();
            assert_eq!(&restored, plain, "{format} round-trip should be byte-exact");
        }
    }
}

#[test]
fn test_encode_is_deterministic() {
    let plain = mapblock_like(4096);
    for target in [TargetFormat::Deflate, TargetFormat::Zstd] {
        let a = encode(&plain, target, Some(5)).unwrap();
        let b = encode(&plain, target, Some(5)).unwrap();
        assert_eq!(a, b, "{target} output should not vary between runs");
    }
}

#[test]
fn test_gzip_to_deflate_drops_container() {
    let plain = mapblock_like(4096);
    let gz = compress(Format::Gzip, &plain);
    assert!(GzipCodec::default().recognizes(&gz));

    let raw = transcode(&gz, LegacyFormat::Gzip, TargetFormat::Deflate).unwrap();
    assert!(!GzipCodec::default().recognizes(&raw), "output must not keep the gzip header");

    // Readable by a plain raw inflater with no header handling.
    let mut restored = Vec::new();
    DeflateDecoder::new(raw.as_slice())
        .read_to_end(&mut restored)
        .unwrap();
    assert_eq!(restored, plain);
}

#[test]
fn test_zlib_to_zstd_transcode() {
    let plain = pseudo_random_bytes(50_000, 7);
    let zl = compress(Format::Zlib, &plain);
    assert!(ZlibCodec::default().recognizes(&zl));

    let out = transcode(&zl, LegacyFormat::Zlib, TargetFormat::Zstd).unwrap();
    assert_eq!(&out[..4], &[0x28, 0xb5, 0x2f, 0xfd]);
    assert_eq!(zstd::decode_all(out.as_slice()).unwrap(), plain);
}

#[test]
fn test_transcode_matches_decode_then_encode() {
    let plain = mapblock_like(1024);
    let gz = compress(Format::Gzip, &plain);

    let streamed = transcode(&gz, LegacyFormat::Gzip, TargetFormat::Deflate).unwrap();
    let stepwise = encode(
        &decode(&gz, LegacyFormat::Gzip).unwrap(),
        TargetFormat::Deflate,
        None,
    )
    .unwrap();
    assert_eq!(streamed, stepwise);
}

#[test]
fn test_transcode_digest_covers_plain_bytes() {
    let plain = pseudo_random_bytes(10_000, 99);
    let gz = compress(Format::Gzip, &plain);

    let t = transcoder(LegacyFormat::Gzip, TargetFormat::Zstd, None).unwrap();
    let out = t.transcode(&gz).unwrap();
    assert_eq!(out.plain_len, plain.len() as u64);
    assert_eq!(out.digest, xxh3_64(&plain));
    assert_eq!(t.redecode_digest(&out.bytes).unwrap(), out.digest);
}

#[test]
fn test_multi_member_gzip_reads_all_members() {
    let mut gz = compress(Format::Gzip, b"hello ");
    gz.extend(compress(Format::Gzip, b"world"));
    assert_eq!(decode(&gz, LegacyFormat::Gzip).unwrap(), b"hello world");
}

#[test]
fn test_bad_header_is_decode_error() {
    let err = decode(b"definitely not gzip", LegacyFormat::Gzip).unwrap_err();
    assert!(
        matches!(err, CodecError::Decode { format: Format::Gzip, .. }),
        "expected gzip decode error, got: {err}"
    );

    let err = transcode(b"\x00\x00garbage", LegacyFormat::Zlib, TargetFormat::Zstd).unwrap_err();
    assert!(
        matches!(err, CodecError::Decode { format: Format::Zlib, .. }),
        "a failing source stream must be reported as a decode error, got: {err}"
    );
}

#[test]
fn test_truncated_gzip_is_decode_error() {
    let gz = compress(Format::Gzip, &pseudo_random_bytes(20_000, 3));
    let truncated = &gz[..gz.len() / 2];
    let err = transcode(truncated, LegacyFormat::Gzip, TargetFormat::Deflate).unwrap_err();
    assert!(matches!(err, CodecError::Decode { format: Format::Gzip, .. }));
}

#[test]
fn test_corrupt_gzip_checksum_is_decode_error() {
    let mut gz = compress(Format::Gzip, b"payload whose crc will not match");
    let crc_at = gz.len() - 8;
    gz[crc_at] ^= 0xff;
    assert!(matches!(
        decode(&gz, LegacyFormat::Gzip),
        Err(CodecError::Decode { .. })
    ));
}

#[test]
fn test_invalid_levels_rejected() {
    assert!(matches!(
        codec_for(Format::Deflate, Some(10)),
        Err(CodecError::InvalidLevel { level: 10, .. })
    ));
    assert!(matches!(
        codec_for(Format::Gzip, Some(-1)),
        Err(CodecError::InvalidLevel { .. })
    ));
    assert!(matches!(
        codec_for(Format::Zstd, Some(1000)),
        Err(CodecError::InvalidLevel { .. })
    ));
    assert!(codec_for(Format::Zstd, Some(19)).is_ok());
    assert!(codec_for(Format::Deflate, Some(0)).is_ok());
}

#[test]
fn test_format_roles() {
    assert_eq!("gzip".parse::<LegacyFormat>().unwrap(), LegacyFormat::Gzip);
    assert_eq!("ZSTD".parse::<TargetFormat>().unwrap(), TargetFormat::Zstd);
    assert!(matches!(
        "deflate".parse::<LegacyFormat>(),
        Err(CodecError::WrongRole { .. })
    ));
    assert!(matches!(
        "lzma".parse::<TargetFormat>(),
        Err(CodecError::UnknownFormat(_))
    ));
}

#[test]
fn test_header_sniffing() {
    let plain = b"some metadata";
    for format in Format::ALL {
        let codec = codec_for(format, None).unwrap();
        assert!(codec.recognizes(&compress(format, plain)), "{format} should recognize its own output");
    }
    let gzip = codec_for(Format::Gzip, None).unwrap();
    let zstd_codec = codec_for(Format::Zstd, None).unwrap();
    assert!(!gzip.recognizes(&compress(Format::Zstd, plain)));
    assert!(!zstd_codec.recognizes(&compress(Format::Gzip, plain)));
    assert!(!gzip.recognizes(&[]));
}
