//! Mapblock layout migration.
//!
//! A decoded mapblock buffer of `4 * size` bytes is laid out as
//!
//! ```text
//! [ id pairs: 2 * size ][ param1: size ][ param2: size ]
//! ```
//!
//! where element `i` owns the identifier bytes at `2i` and `2i + 1`.
//! The migration shifts every identifier by [`ID_OFFSET`], writes it back with
//! the high byte first, and adds [`PARAM_SHIFT`] to both param bytes.
//!
//! The migration is not idempotent: running it twice over the same buffer
//! does not give the result of running it once.

use crate::error::LayoutError;
use crate::format::{OverflowPolicy, ID_OFFSET, PARAM_SHIFT, REGION_COUNT};

/// Number of elements in a buffer of `len` bytes, or `NotAligned`.
pub fn element_count(len: usize) -> Result<usize, LayoutError> {
    if len % REGION_COUNT != 0 {
        return Err(LayoutError::NotAligned { len });
    }
    Ok(len / REGION_COUNT)
}

#[inline]
fn read_id(buf: &[u8], i: usize) -> u16 {
    u16::from(buf[2 * i]) | (u16::from(buf[2 * i + 1]) << 8)
}

/// Rewrite `buf` in place.
///
/// With [`OverflowPolicy::Error`] every identifier is checked before the first
/// byte is written, so a rejected buffer is left exactly as it was.
pub fn migrate(buf: &mut [u8], policy: OverflowPolicy) -> Result<(), LayoutError> {
    let size = element_count(buf.len())?;

    if policy == OverflowPolicy::Error {
        let max_id = (u16::MAX as u32 - ID_OFFSET) as u16;
        if let Some(index) = (0..size).find(|&i| read_id(buf, i) > max_id) {
            return Err(LayoutError::Range {
                index,
                id: read_id(buf, index),
            });
        }
    }

    for i in 0..size {
        let shifted = (u32::from(read_id(buf, i)) + ID_OFFSET) as u16;
        let [low, high] = shifted.to_le_bytes();
        // written high byte first
        buf[2 * i] = high;
        buf[2 * i + 1] = low;

        buf[2 * size + i] = buf[2 * size + i].wrapping_add(PARAM_SHIFT);
        buf[3 * size + i] = buf[3 * size + i].wrapping_add(PARAM_SHIFT);
    }

    Ok(())
}

/// Read-only statistics of a decoded mapblock buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSummary {
    pub elements: usize,
    pub min_id: Option<u16>,
    pub max_id: Option<u16>,
    /// Identifiers that would not fit in 16 bits after the shift.
    pub overflowing: usize,
}

impl LayoutSummary {
    pub fn scan(buf: &[u8]) -> Result<Self, LayoutError> {
        let size = element_count(buf.len())?;
        let max_safe = (u16::MAX as u32 - ID_OFFSET) as u16;

        let mut summary = Self {
            elements: size,
            ..Self::default()
        };
        for i in 0..size {
            let id = read_id(buf, i);
            summary.min_id = Some(summary.min_id.map_or(id, |m| m.min(id)));
            summary.max_id = Some(summary.max_id.map_or(id, |m| m.max(id)));
            if id > max_safe {
                summary.overflowing += 1;
            }
        }
        Ok(summary)
    }

    /// Whether [`migrate`] with [`OverflowPolicy::Error`] would accept the buffer.
    pub fn migratable(&self) -> bool {
        self.overflowing == 0
    }
}
