use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

// ── Mapblock layout constants ────────────────────────────────────────────────

/// Offset added to every node identifier by the layout migration.
/// Moves the legacy identifier space into the upper half of `u16`.
pub const ID_OFFSET: u32 = 0x8000;

/// Offset added (wrapping) to every param1 and param2 byte.
pub const PARAM_SHIFT: u8 = 0x80;

/// Number of byte regions a decoded mapblock buffer is split into:
/// identifier pairs (two regions), param1, param2.
pub const REGION_COUNT: usize = 4;

// ── Magic bytes ──────────────────────────────────────────────────────────────

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

// ── Default levels ───────────────────────────────────────────────────────────

/// Level the schemapart data was re-encoded with when it first moved to raw deflate.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 3;
pub const DEFAULT_ZLIB_LEVEL: u32 = 6;
pub const DEFAULT_GZIP_LEVEL: u32 = 6;
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

// ── Formats ──────────────────────────────────────────────────────────────────

/// Every compression format a codec exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// RFC 1952 container: header, deflate body, CRC32 + ISIZE trailer.
    Gzip,
    /// RFC 1950 container: 2-byte header, deflate body, Adler-32 trailer.
    Zlib,
    /// Bare RFC 1951 stream with no container at all.
    Deflate,
    Zstd,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Gzip, Format::Zlib, Format::Deflate, Format::Zstd];

    pub fn name(self) -> &'static str {
        match self {
            Format::Gzip => "gzip",
            Format::Zlib => "zlib",
            Format::Deflate => "deflate",
            Format::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Format::Gzip),
            "zlib" => Ok(Format::Zlib),
            "deflate" | "raw" => Ok(Format::Deflate),
            "zstd" | "zst" => Ok(Format::Zstd),
            _ => Err(CodecError::UnknownFormat(s.to_string())),
        }
    }
}

/// Formats rows are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyFormat {
    Gzip,
    Zlib,
}

/// Formats rows are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Deflate,
    Zstd,
}

impl From<LegacyFormat> for Format {
    fn from(f: LegacyFormat) -> Self {
        match f {
            LegacyFormat::Gzip => Format::Gzip,
            LegacyFormat::Zlib => Format::Zlib,
        }
    }
}

impl From<TargetFormat> for Format {
    fn from(f: TargetFormat) -> Self {
        match f {
            TargetFormat::Deflate => Format::Deflate,
            TargetFormat::Zstd => Format::Zstd,
        }
    }
}

impl fmt::Display for LegacyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Format::from(*self), f)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Format::from(*self), f)
    }
}

impl FromStr for LegacyFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Format>()? {
            Format::Gzip => Ok(LegacyFormat::Gzip),
            Format::Zlib => Ok(LegacyFormat::Zlib),
            other => Err(CodecError::WrongRole {
                format: other,
                role: "legacy",
            }),
        }
    }
}

impl FromStr for TargetFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Format>()? {
            Format::Deflate => Ok(TargetFormat::Deflate),
            Format::Zstd => Ok(TargetFormat::Zstd),
            other => Err(CodecError::WrongRole {
                format: other,
                role: "target",
            }),
        }
    }
}

// ── Overflow policy ──────────────────────────────────────────────────────────

/// What the layout migration does when `id + ID_OFFSET` no longer fits in 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Reject the buffer before touching it.
    #[default]
    Error,
    /// Keep the low 16 bits, as fixed-width arithmetic would.
    Wrap,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Error => f.write_str("error"),
            OverflowPolicy::Wrap => f.write_str("wrap"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" | "fail" => Ok(OverflowPolicy::Error),
            "wrap" => Ok(OverflowPolicy::Wrap),
            other => Err(format!("unknown overflow policy '{other}'. Valid options: error, wrap")),
        }
    }
}
