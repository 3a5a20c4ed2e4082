//! Halo exchange: fill a partition's ghost frame before each update.
//!
//! Two sub-phases run once per generation:
//!
//! 1. **Vertical** ([`exchange_ghost_rows`]): two paired send/receives over
//!    the ring. The first interior row goes up while the bottom ghost row is
//!    received from below; then the last interior row goes down while the top
//!    ghost row is received from above. Every rank sends and receives in each
//!    round, so the ring never waits on a one-directional chain.
//! 2. **Horizontal** ([`wrap_ghost_columns`]): purely local periodic copy of
//!    columns `cols` and `1` into the ghost columns of every framed row,
//!    ghost rows included (this also fills the four corners).
//!
//! The exchange is the only synchronization point between partitions: a
//! partition cannot finish generation `g`'s exchange before both neighbors
//! have finished generation `g - 1`.

use crate::algs::communicator::{CommTag, Communicator, WaitBound, WaitFailure};
use crate::algs::ring::RingTopology;
use crate::algs::wire::{Expect, HDR_LEN, WireHdr, decode_row, encode_row, kind};
use crate::grid::local::LocalGrid;
use crate::life_error::LifeError;
use rayon::prelude::*;

/// Tag base reserved for halo rows; `+0` carries rows going up, `+1` rows going down.
pub const HALO_TAG: CommTag = CommTag::new(0x4A10);

pub(crate) fn wait_error(failure: WaitFailure, neighbor: usize, generation: u64, what: &str) -> LifeError {
    match failure {
        WaitFailure::TimedOut => LifeError::ExchangeTimeout {
            neighbor,
            generation,
        },
        WaitFailure::Cancelled => LifeError::Cancelled,
        WaitFailure::Missing => LifeError::CommError {
            neighbor,
            source: format!("no {what} received in generation {generation}").into(),
        },
    }
}

/// One paired exchange: send interior row `send_row` to `dest` and receive
/// ghost row `recv_row` from `source`.
#[allow(clippy::too_many_arguments)]
fn paired_row_exchange<C: Communicator>(
    grid: &mut LocalGrid,
    comm: &C,
    me: usize,
    dest: usize,
    source: usize,
    send_row: usize,
    recv_row: usize,
    row_kind: u16,
    tag: CommTag,
    generation: u64,
    bound: &WaitBound,
) -> Result<(), LifeError> {
    let cols = grid.cols();
    let msg = encode_row(WireHdr::new(row_kind, me, generation), grid.row(send_row));
    let mut recv = vec![0u8; HDR_LEN + cols];
    let got = comm
        .sendrecv(dest, tag.as_u16(), &msg, source, tag.as_u16(), &mut recv, bound)
        .map_err(|f| wait_error(f, source, generation, "halo row"))?;
    let want = Expect {
        kind: row_kind,
        sender: source,
        generation,
    };
    let row = decode_row(&got, cols, &want).map_err(|reason| LifeError::HaloMismatch {
        neighbor: source,
        reason,
    })?;
    grid.row_mut(recv_row).copy_from_slice(row);
    Ok(())
}

/// Fill ghost rows `0` and `local_rows + 1` from the up and down neighbors.
///
/// Each received row is checked for kind, sender and `generation`, so a
/// miswired ring or a neighbor running a different generation is reported as
/// [`LifeError::HaloMismatch`] instead of silently corrupting the grid.
///
/// # Errors
/// - `ExchangeTimeout` / `Cancelled` when `bound` cuts a wait short.
/// - `CommError` when a backend completes without data.
/// - `HaloMismatch` when a row fails validation.
pub fn exchange_ghost_rows<C: Communicator>(
    grid: &mut LocalGrid,
    comm: &C,
    ring: &RingTopology,
    generation: u64,
    bound: &WaitBound,
) -> Result<(), LifeError> {
    let last = grid.local_rows();
    let me = ring.rank();
    log::trace!(
        "rank {me} gen {generation}: halo up={} down={}",
        ring.up(),
        ring.down()
    );
    // first interior row goes up; bottom ghost row arrives from below
    paired_row_exchange(
        grid,
        comm,
        me,
        ring.up(),
        ring.down(),
        1,
        last + 1,
        kind::ROW_UP,
        HALO_TAG,
        generation,
        bound,
    )?;
    // last interior row goes down; top ghost row arrives from above
    paired_row_exchange(
        grid,
        comm,
        me,
        ring.down(),
        ring.up(),
        last,
        0,
        kind::ROW_DOWN,
        HALO_TAG.offset(1),
        generation,
        bound,
    )
}

/// Copy column `cols` into ghost column `0` and column `1` into ghost column
/// `cols + 1`, for every framed row.
pub fn wrap_ghost_columns(grid: &mut LocalGrid) {
    let cols = grid.cols();
    let stride = grid.stride();
    grid.as_mut_slice()
        .par_chunks_mut(stride)
        .for_each(|row| {
            row[0] = row[cols];
            row[cols + 1] = row[1];
        });
}

/// Full halo refresh: ring exchange followed by the column wrap.
pub fn exchange_halo<C: Communicator>(
    grid: &mut LocalGrid,
    comm: &C,
    ring: &RingTopology,
    generation: u64,
    bound: &WaitBound,
) -> Result<(), LifeError> {
    exchange_ghost_rows(grid, comm, ring, generation, bound)?;
    wrap_ghost_columns(grid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, RayonComm};
    use crate::algs::rule::count_neighbors;
    use crate::grid::cell::{ALIVE, DEAD};
    use std::time::Duration;

    #[test]
    fn single_partition_exchanges_with_itself() {
        let mut g = LocalGrid::new(3, 4);
        g.row_mut(1).copy_from_slice(&[1, 0, 0, 1]);
        g.row_mut(3).copy_from_slice(&[0, 1, 1, 0]);
        let ring = RingTopology::new(0, 1).unwrap();
        exchange_halo(&mut g, &NoComm, &ring, 0, &WaitBound::unbounded()).unwrap();
        assert_eq!(g.row(0), &[0, 1, 1, 0]);
        assert_eq!(g.row(4), &[1, 0, 0, 1]);
        // corners come from the wrapped ghost rows
        assert_eq!(g.get(0, 0), DEAD);
        assert_eq!(g.get(4, 0), ALIVE);
        assert_eq!(g.get(4, 5), ALIVE);
    }

    #[test]
    fn single_partition_over_mailbox_matches_no_comm() {
        let comm = RayonComm::group(1).remove(0);
        let ring = RingTopology::new(0, 1).unwrap();
        let mut a = LocalGrid::new(2, 3);
        a.row_mut(1).copy_from_slice(&[1, 1, 0]);
        a.row_mut(2).copy_from_slice(&[0, 0, 1]);
        let mut b = a.clone();
        exchange_halo(&mut a, &comm, &ring, 0, &WaitBound::unbounded()).unwrap();
        exchange_halo(&mut b, &NoComm, &ring, 0, &WaitBound::unbounded()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn column_wrap_is_periodic_on_every_row() {
        let mut g = LocalGrid::new(2, 5);
        for i in 0..4 {
            g.set(i, 1, ALIVE);
        }
        wrap_ghost_columns(&mut g);
        for i in 0..4 {
            assert_eq!(g.get(i, 6), ALIVE, "row {i}");
            assert_eq!(g.get(i, 0), DEAD, "row {i}");
        }
        // the last visible column sees the first as a neighbor
        assert_eq!(count_neighbors(&g, 1, 5), 3);
    }

    #[test]
    fn two_ranks_swap_boundary_rows() {
        let group = RayonComm::group(2);
        let handles: Vec<_> = group
            .into_iter()
            .map(|comm| {
                std::thread::spawn(move || {
                    let rank = comm.rank();
                    let ring = RingTopology::new(rank, 2).unwrap();
                    let mut g = LocalGrid::new(2, 3);
                    let fill = if rank == 0 { [1, 0, 0] } else { [0, 0, 1] };
                    g.row_mut(1).copy_from_slice(&fill);
                    g.row_mut(2).copy_from_slice(&fill);
                    exchange_ghost_rows(&mut g, &comm, &ring, 0, &WaitBound::unbounded()).unwrap();
                    (rank, g)
                })
            })
            .collect();
        for h in handles {
            let (rank, g) = h.join().unwrap();
            let other = if rank == 0 { [0, 0, 1] } else { [1, 0, 0] };
            assert_eq!(g.row(0), &other);
            assert_eq!(g.row(3), &other);
        }
    }

    #[test]
    fn missing_neighbor_times_out() {
        let group = RayonComm::group(2);
        let ring = RingTopology::new(0, 2).unwrap();
        let mut g = LocalGrid::new(1, 2);
        let bound = WaitBound::new(Some(Duration::from_millis(30)), None);
        let err = exchange_ghost_rows(&mut g, &group[0], &ring, 4, &bound).unwrap_err();
        assert!(matches!(
            err,
            LifeError::ExchangeTimeout {
                neighbor: 1,
                generation: 4
            }
        ));
    }

    #[test]
    fn wrong_generation_is_a_mismatch() {
        let group = RayonComm::group(2);
        // rank 1 runs ahead and sends generation 1 rows
        let stale = encode_row(WireHdr::new(kind::ROW_UP, 1, 1), &[1, 1]);
        group[1].isend(0, HALO_TAG.as_u16(), &stale);
        let ring = RingTopology::new(0, 2).unwrap();
        let mut g = LocalGrid::new(1, 2);
        let err = exchange_ghost_rows(&mut g, &group[0], &ring, 0, &WaitBound::unbounded())
            .unwrap_err();
        match err {
            LifeError::HaloMismatch { neighbor, reason } => {
                assert_eq!(neighbor, 1);
                assert!(reason.contains("generation 1"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_comm_cannot_reach_other_ranks() {
        let ring = RingTopology::new(0, 2).unwrap();
        let mut g = LocalGrid::new(1, 2);
        assert!(matches!(
            exchange_ghost_rows(&mut g, &NoComm, &ring, 0, &WaitBound::unbounded()),
            Err(LifeError::CommError { neighbor: 1, .. })
        ));
    }
}
