//! Halo records that do not match the receiver's expectations are rejected.
use halo_life::algs::communicator::{Communicator, RayonComm};
use halo_life::algs::halo::HALO_TAG;
use halo_life::algs::wire::{WireHdr, encode_row, kind};
use halo_life::prelude::*;

/// Rank 0 of a fresh 3-rank ring, with `forged` already queued from rank 1
/// on the upward halo tag.
fn rank_zero_with(forged: Vec<u8>) -> Partition<RayonComm> {
    let cfg = LifeConfig::new(6, 4, 1).with_workers(3);
    let mut group = RayonComm::group(3);
    group[1].isend(0, HALO_TAG.as_u16(), &forged);
    Partition::new(cfg.clone(), group.remove(0), &InitialState::random(&cfg)).unwrap()
}

fn mismatch_reason(err: LifeError) -> String {
    match err {
        LifeError::HaloMismatch { neighbor: 1, reason } => reason,
        other => panic!("expected a halo mismatch from rank 1, got {other:?}"),
    }
}

#[test]
fn wrong_generation() {
    let mut p = rank_zero_with(encode_row(WireHdr::new(kind::ROW_UP, 1, 7), &[0; 4]));
    let reason = mismatch_reason(p.step().unwrap_err());
    assert!(reason.contains("generation 7"), "{reason}");
    assert_eq!(p.generation(), 0);
}

#[test]
fn wrong_sender() {
    let mut p = rank_zero_with(encode_row(WireHdr::new(kind::ROW_UP, 2, 0), &[0; 4]));
    let reason = mismatch_reason(p.step().unwrap_err());
    assert!(reason.contains("sent by rank 2"), "{reason}");
}

#[test]
fn wrong_direction() {
    let mut p = rank_zero_with(encode_row(WireHdr::new(kind::ROW_DOWN, 1, 0), &[0; 4]));
    let reason = mismatch_reason(p.step().unwrap_err());
    assert!(reason.contains("record kind 2"), "{reason}");
}

#[test]
fn short_row() {
    let mut p = rank_zero_with(encode_row(WireHdr::new(kind::ROW_UP, 1, 0), &[0; 3]));
    let err = p.step().unwrap_err();
    assert!(err.is_communication());
    assert!(mismatch_reason(err).contains("expected 20 bytes"));
}
