//! Collection of every partition's visible cells into one [`GlobalGrid`].
//!
//! Non-root ranks send one block record (header, shape, cells) to the root;
//! the root places its own cells, then receives the others in rank order, so
//! the assembled grid is row-major in global row order regardless of arrival
//! order. Ghost cells never travel.

use crate::algs::communicator::{CommTag, Communicator, Wait, WaitBound};
use crate::algs::halo::wait_error;
use crate::algs::wire::{Expect, HDR_LEN, SHAPE_LEN, WireHdr, decode_block, encode_block, kind};
use crate::config::LifeConfig;
use crate::grid::cell::Cell;
use crate::grid::global::GlobalGrid;
use crate::life_error::LifeError;

/// Tag base for collections; `+0` gathers, `+1` broadcasts.
pub const COLLECT_TAG: CommTag = CommTag::new(0x4A20);

fn check_rank(rank: usize, size: usize) -> Result<(), LifeError> {
    if rank >= size {
        return Err(LifeError::RankOutOfRange { rank, size });
    }
    Ok(())
}

/// Gather `visible` from every rank to `root`.
///
/// Returns `Some(grid)` on `root` and `None` elsewhere. Every rank must call
/// this with the same `root` and `generation`.
///
/// # Errors
/// - `RankOutOfRange` for a bad `root`.
/// - `ShapeMismatch` if `visible` does not match this rank's layout.
/// - `HaloMismatch` if a block fails validation; wait failures as in the
///   halo exchange.
pub fn gather_grid<C: Communicator>(
    comm: &C,
    cfg: &LifeConfig,
    visible: &[Cell],
    root: usize,
    generation: u64,
    bound: &WaitBound,
) -> Result<Option<GlobalGrid>, LifeError> {
    let me = comm.rank();
    check_rank(root, comm.size())?;
    let layout = cfg.layout(me)?;
    if visible.len() != layout.visible_len() {
        return Err(LifeError::ShapeMismatch {
            expected_rows: layout.local_rows,
            expected_cols: cfg.cols,
            rows: visible.len() / cfg.cols.max(1),
            cols: cfg.cols,
        });
    }

    if me != root {
        let msg = encode_block(
            WireHdr::new(kind::GATHER, me, generation),
            layout.local_rows,
            cfg.cols,
            visible,
        );
        let _ = comm.isend(root, COLLECT_TAG.as_u16(), &msg).wait();
        return Ok(None);
    }

    let mut cells = Vec::with_capacity(cfg.simulated_rows() * cfg.cols);
    for peer in cfg.layouts() {
        if peer.rank == me {
            cells.extend_from_slice(visible);
            continue;
        }
        let mut buf = vec![0u8; HDR_LEN + SHAPE_LEN + peer.visible_len()];
        let got = comm
            .irecv(peer.rank, COLLECT_TAG.as_u16(), &mut buf)
            .wait_bounded(bound)
            .map_err(|f| wait_error(f, peer.rank, generation, "grid block"))?;
        let want = Expect {
            kind: kind::GATHER,
            sender: peer.rank,
            generation,
        };
        let block = decode_block(&got, peer.local_rows, cfg.cols, &want).map_err(|reason| {
            LifeError::HaloMismatch {
                neighbor: peer.rank,
                reason,
            }
        })?;
        cells.extend_from_slice(block);
    }
    log::debug!(
        "rank {me} collected generation {generation} from {} ranks",
        comm.size()
    );
    GlobalGrid::from_cells(cfg.simulated_rows(), cfg.cols, cells).map(Some)
}

/// Gather to rank 0, then hand the assembled grid to every rank.
pub fn all_gather_grid<C: Communicator>(
    comm: &C,
    cfg: &LifeConfig,
    visible: &[Cell],
    generation: u64,
    bound: &WaitBound,
) -> Result<GlobalGrid, LifeError> {
    const ROOT: usize = 0;
    let tag = COLLECT_TAG.offset(1).as_u16();
    let rows = cfg.simulated_rows();
    let me = comm.rank();

    if let Some(grid) = gather_grid(comm, cfg, visible, ROOT, generation, bound)? {
        let msg = encode_block(
            WireHdr::new(kind::BROADCAST, ROOT, generation),
            rows,
            cfg.cols,
            grid.cells(),
        );
        let pending: Vec<_> = (0..comm.size())
            .filter(|&r| r != ROOT)
            .map(|r| comm.isend(r, tag, &msg))
            .collect();
        for h in pending {
            let _ = h.wait();
        }
        return Ok(grid);
    }

    let mut buf = vec![0u8; HDR_LEN + SHAPE_LEN + rows * cfg.cols];
    let got = comm
        .irecv(ROOT, tag, &mut buf)
        .wait_bounded(bound)
        .map_err(|f| wait_error(f, ROOT, generation, "broadcast grid"))?;
    let want = Expect {
        kind: kind::BROADCAST,
        sender: ROOT,
        generation,
    };
    let cells = decode_block(&got, rows, cfg.cols, &want).map_err(|reason| {
        LifeError::HaloMismatch {
            neighbor: ROOT,
            reason,
        }
    })?;
    log::trace!("rank {me} received broadcast grid for generation {generation}");
    GlobalGrid::from_cells(rows, cfg.cols, cells.to_vec())
}
