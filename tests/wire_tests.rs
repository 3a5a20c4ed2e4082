use halo_life::algs::communicator::CommTag;
use halo_life::algs::halo::HALO_TAG;
use halo_life::algs::collect::COLLECT_TAG;
use halo_life::algs::wire::{Expect, WireHdr, decode_row, encode_row, expect_exact_len, kind};

#[test]
fn commtag_offset_wrap() {
    let t = CommTag::new(u16::MAX).offset(1);
    assert_eq!(t.as_u16(), 0);
}

#[test]
fn protocol_tags_do_not_overlap() {
    let halo = [HALO_TAG.as_u16(), HALO_TAG.offset(1).as_u16()];
    let collect = [COLLECT_TAG.as_u16(), COLLECT_TAG.offset(1).as_u16()];
    assert!(halo.iter().all(|t| !collect.contains(t)));
}

#[test]
fn header_fields_are_little_endian_on_the_wire() {
    let msg = encode_row(WireHdr::new(kind::ROW_DOWN, 0x0102_0304, 0x0A0B), &[1]);
    assert_eq!(&msg[0..2], &[1, 0]); // version
    assert_eq!(&msg[2..4], &[2, 0]); // kind
    assert_eq!(&msg[4..8], &[4, 3, 2, 1]);
    assert_eq!(&msg[8..10], &[0x0B, 0x0A]);
    assert_eq!(msg[16], 1);
}

#[test]
fn decode_borrows_the_payload() {
    let msg = encode_row(WireHdr::new(kind::ROW_UP, 2, 0), &[0, 1, 1]);
    let want = Expect {
        kind: kind::ROW_UP,
        sender: 2,
        generation: 0,
    };
    let row = decode_row(&msg, 3, &want).unwrap();
    assert_eq!(row.as_ptr(), msg[16..].as_ptr());
}

#[test]
fn expect_exact_len_err() {
    assert!(expect_exact_len(3, 4).is_err());
    assert!(expect_exact_len(4, 4).is_ok());
}
