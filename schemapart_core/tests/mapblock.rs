/// Layout migration properties: byte-exact output, alignment, wraparound,
/// overflow handling, and the non-idempotence hazard.
use schemapart_core::mapblock::{element_count, migrate};
use schemapart_core::{LayoutError, LayoutSummary, OverflowPolicy};

fn migrated(mut buf: Vec<u8>, policy: OverflowPolicy) -> Vec<u8> {
    migrate(&mut buf, policy).unwrap();
    buf
}

#[test]
fn test_single_element_byte_exact() {
    // id = 1 -> 32769 = 0x8001, written high byte first.
    let out = migrated(vec![0x01, 0x00, 0x10, 0x20], OverflowPolicy::Error);
    assert_eq!(out, vec![0x80, 0x01, 0x90, 0xA0]);
}

#[test]
fn test_two_elements_byte_exact() {
    // id0 = 0x0100 -> 0x8100, id1 = 0 -> 0x8000
    let out = migrated(
        vec![0x00, 0x01, 0x00, 0x00, 0x05, 0x06, 0x07, 0x08],
        OverflowPolicy::Error,
    );
    assert_eq!(out, vec![0x81, 0x00, 0x80, 0x00, 0x85, 0x86, 0x87, 0x88]);
}

#[test]
fn test_param_bytes_wrap() {
    let out = migrated(vec![0x00, 0x00, 0xFF, 0x80], OverflowPolicy::Error);
    assert_eq!(out[2], 0x7F, "0xFF + 0x80 wraps modulo 256");
    assert_eq!(out[3], 0x00, "0x80 + 0x80 wraps modulo 256");
}

#[test]
fn test_empty_buffer_is_trivially_aligned() {
    let mut buf: Vec<u8> = Vec::new();
    migrate(&mut buf, OverflowPolicy::Error).unwrap();
    assert!(buf.is_empty());
    assert_eq!(element_count(0), Ok(0));
}

#[test]
fn test_unaligned_lengths_rejected() {
    for len in [1usize, 2, 3, 5, 6, 7, 4095] {
        let mut buf = vec![0u8; len];
        assert_eq!(
            migrate(&mut buf, OverflowPolicy::Wrap),
            Err(LayoutError::NotAligned { len }),
            "length {len} is not a multiple of 4"
        );
        assert!(buf.iter().all(|&b| b == 0), "rejected buffer must be untouched");
    }
}

#[test]
fn test_migrating_twice_differs_from_once() {
    let original = vec![0x01, 0x00, 0x10, 0x20];
    let once = migrated(original.clone(), OverflowPolicy::Error);
    let twice = migrated(once.clone(), OverflowPolicy::Error);

    assert_ne!(twice, once, "the migration is not idempotent");
    // The param shift cancels out after two passes; the ids do not.
    assert_eq!(&twice[2..], &original[2..]);
    assert_eq!(&twice[..2], &[0x81, 0x80]);
}

#[test]
fn test_overflow_error_leaves_buffer_untouched() {
    // element 0 is fine, element 1 holds 0x8000 which cannot be shifted.
    let original = vec![0x05, 0x00, 0x00, 0x80, 0x01, 0x02, 0x03, 0x04];
    let mut buf = original.clone();
    assert_eq!(
        migrate(&mut buf, OverflowPolicy::Error),
        Err(LayoutError::Range {
            index: 1,
            id: 0x8000
        })
    );
    assert_eq!(buf, original);
}

#[test]
fn test_largest_safe_id_accepted() {
    // 0x7FFF + 0x8000 = 0xFFFF
    let out = migrated(vec![0xFF, 0x7F, 0x00, 0x00], OverflowPolicy::Error);
    assert_eq!(&out[..2], &[0xFF, 0xFF]);
}

#[test]
fn test_overflow_wrap_keeps_low_sixteen_bits() {
    // 0x8001 + 0x8000 = 0x1_0001 -> 0x0001, written high first.
    let out = migrated(vec![0x01, 0x80, 0x00, 0x00], OverflowPolicy::Wrap);
    assert_eq!(out, vec![0x00, 0x01, 0x80, 0x80]);
}

#[test]
fn test_full_mapblock() {
    // 16^3 nodes, the size of a real mapblock.
    let size = 4096;
    let mut buf = vec![0u8; size * 4];
    for i in 0..size {
        let id = (i % 300) as u16;
        buf[2 * i..2 * i + 2].copy_from_slice(&id.to_le_bytes());
        buf[2 * size + i] = (i % 256) as u8;
        buf[3 * size + i] = 0xF0;
    }
    let before = buf.clone();
    migrate(&mut buf, OverflowPolicy::Error).unwrap();

    for i in 0..size {
        let id = u16::from_le_bytes([before[2 * i], before[2 * i + 1]]);
        let expected = (id + 0x8000).to_be_bytes();
        assert_eq!(&buf[2 * i..2 * i + 2], &expected, "id at element {i}");
        assert_eq!(buf[2 * size + i], before[2 * size + i].wrapping_add(0x80));
        assert_eq!(buf[3 * size + i], 0x70);
    }
}

#[test]
fn test_summary_scan() {
    let buf = vec![0x05, 0x00, 0x00, 0x80, 0x01, 0x02, 0x03, 0x04];
    let summary = LayoutSummary::scan(&buf).unwrap();
    assert_eq!(summary.elements, 2);
    assert_eq!(summary.min_id, Some(5));
    assert_eq!(summary.max_id, Some(0x8000));
    assert_eq!(summary.overflowing, 1);
    assert!(!summary.migratable());

    let empty = LayoutSummary::scan(&[]).unwrap();
    assert_eq!(empty.elements, 0);
    assert_eq!(empty.min_id, None);
    assert!(empty.migratable());

    assert!(LayoutSummary::scan(&[0u8; 6]).is_err());
}
