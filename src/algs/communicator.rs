//! Thin façade over intra-process (mailbox) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! Handles are **waitable**; the halo exchange and the collectives call
//! `.wait()` (or [`Wait::wait_bounded`]) before they trust that a buffer is
//! ready, and drain every send handle before returning.

use crate::cancel::CancelToken;
use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A message tag namespace. Protocols reserve a base and use small offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(base: u16) -> Self {
        Self(base)
    }
    pub const fn base(self) -> u16 {
        self.0
    }
    pub const fn as_u16(self) -> u16 {
        self.0
    }
    /// The tag `k` slots after this one.
    pub const fn offset(self, k: u16) -> Self {
        Self(self.0.wrapping_add(k))
    }
}

/// Limits on how long a wait may block.
#[derive(Clone, Debug, Default)]
pub struct WaitBound {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelToken>,
}

impl WaitBound {
    /// Wait for as long as it takes.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now (if any), observing `cancel` (if any).
    pub fn new(timeout: Option<Duration>, cancel: Option<&CancelToken>) -> Self {
        Self {
            deadline: timeout.map(|t| Instant::now() + t),
            cancel: cancel.cloned(),
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Why a bounded wait returned without data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitFailure {
    /// The backend completed without delivering data.
    Missing,
    /// The deadline passed first.
    TimedOut,
    /// The cancellation token fired first.
    Cancelled,
}

/// Anything that can be waited on.
pub trait Wait: Sized {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;

    /// Wait within `bound`. Backends that cannot interrupt a wait ignore the
    /// bound and block.
    fn wait_bounded(self, bound: &WaitBound) -> Result<Vec<u8>, WaitFailure> {
        let _ = bound;
        self.wait().ok_or(WaitFailure::Missing)
    }
}

/// Point-to-point messaging between the ranks of one group.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// This process's rank in the group.
    fn rank(&self) -> usize;
    /// Number of ranks in the group.
    fn size(&self) -> usize;

    fn is_no_comm(&self) -> bool {
        false
    }

    /// Send `send` to `dest` and receive up to `recv.len()` bytes from
    /// `source` as one paired operation.
    ///
    /// The receive is posted before the send, so a ring of ranks all calling
    /// `sendrecv` in the same direction cannot deadlock.
    #[allow(clippy::too_many_arguments)]
    fn sendrecv(
        &self,
        dest: usize,
        send_tag: u16,
        send: &[u8],
        source: usize,
        recv_tag: u16,
        recv: &mut [u8],
        bound: &WaitBound,
    ) -> Result<Vec<u8>, WaitFailure> {
        let r = self.irecv(source, recv_tag, recv);
        let s = self.isend(dest, send_tag, send);
        let got = r.wait_bounded(bound);
        let _ = s.wait();
        got
    }
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Single-rank communicator for serial runs.
///
/// `isend`/`irecv` are no-ops; the fused [`Communicator::sendrecv`] loops a
/// rank-0-to-rank-0 message straight back, which is all a one-partition
/// ring ever sends.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn is_no_comm(&self) -> bool {
        true
    }

    fn sendrecv(
        &self,
        dest: usize,
        _send_tag: u16,
        send: &[u8],
        source: usize,
        _recv_tag: u16,
        recv: &mut [u8],
        _bound: &WaitBound,
    ) -> Result<Vec<u8>, WaitFailure> {
        if dest != 0 || source != 0 {
            return Err(WaitFailure::Missing);
        }
        let n = recv.len().min(send.len());
        recv[..n].copy_from_slice(&send[..n]);
        Ok(send[..n].to_vec())
    }
}

// --- RayonComm: intra-process / multi-thread ---
type Key = (u64, usize, usize, u16); // (universe, src, dst, tag)

static MAILBOX: Lazy<DashMap<Key, VecDeque<Bytes>>> = Lazy::new(DashMap::new);
static NEXT_UNIVERSE: AtomicU64 = AtomicU64::new(1);

fn take_message(key: &Key) -> Option<Bytes> {
    let msg = MAILBOX.get_mut(key).and_then(|mut q| q.pop_front());
    if msg.is_some() {
        MAILBOX.remove_if(key, |_, q| q.is_empty());
    }
    msg
}

/// Pending receive on the in-process mailbox.
pub struct LocalHandle {
    key: Key,
    len: usize,
}

impl LocalHandle {
    fn poll(&self, bound: &WaitBound) -> Result<Vec<u8>, WaitFailure> {
        let mut spins = 0u32;
        loop {
            if let Some(bytes) = take_message(&self.key) {
                let n = self.len.min(bytes.len());
                return Ok(bytes[..n].to_vec());
            }
            if bound.is_cancelled() {
                return Err(WaitFailure::Cancelled);
            }
            if bound.is_expired() {
                return Err(WaitFailure::TimedOut);
            }
            spins = spins.saturating_add(1);
            if spins < 64 {
                std::hint::spin_loop();
            } else if spins < 256 {
                std::thread::yield_now();
            } else {
                std::thread::sleep(Duration::from_micros(50));
            }
        }
    }
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        self.poll(&WaitBound::unbounded()).ok()
    }

    fn wait_bounded(self, bound: &WaitBound) -> Result<Vec<u8>, WaitFailure> {
        self.poll(bound)
    }
}

/// In-process communicator: ranks are threads sharing a mailbox.
///
/// Messages between the same `(src, dst, tag)` are delivered in FIFO order.
/// A message longer than the receive buffer is truncated to the buffer's
/// length.
#[derive(Clone, Debug)]
pub struct RayonComm {
    universe: u64,
    rank: usize,
    size: usize,
}

impl RayonComm {
    /// Rank `rank` of `size` in the process-wide default group.
    pub fn new(rank: usize, size: usize) -> Self {
        Self {
            universe: 0,
            rank,
            size,
        }
    }

    /// A fresh, isolated group of `size` ranks; messages never cross groups.
    pub fn group(size: usize) -> Vec<Self> {
        let universe = NEXT_UNIVERSE.fetch_add(1, Ordering::Relaxed);
        (0..size)
            .map(|rank| Self {
                universe,
                rank,
                size,
            })
            .collect()
    }

    /// Messages queued in this rank's group and not yet received.
    pub fn pending(&self) -> usize {
        MAILBOX
            .iter()
            .filter(|e| e.key().0 == self.universe)
            .map(|e| e.value().len())
            .sum()
    }

    /// Drop every message still queued in this rank's group.
    ///
    /// A group whose run was cancelled or timed out leaves its in-flight
    /// messages behind; call this once no rank of the group will receive
    /// again.
    pub fn discard_pending(&self) -> usize {
        let dropped = self.pending();
        MAILBOX.retain(|k, _| k.0 != self.universe);
        dropped
    }
}

impl Communicator for RayonComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        let key = (self.universe, self.rank, peer, tag);
        MAILBOX
            .entry(key)
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            key: (self.universe, peer, self.rank, tag),
            len: buf.len(),
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use crate::life_error::LifeError;
    use mpi::datatype::Equivalence;
    use mpi::environment::Universe;
    use mpi::point_to_point::{Destination, Source, send_receive_into_with_tags};
    use mpi::topology::Communicator as MpiCommunicator;
    use mpi::topology::SimpleCommunicator;

    /// One MPI process per rank over `MPI_COMM_WORLD`.
    ///
    /// Sends are standard-mode and receives complete eagerly inside
    /// `irecv`; the halo exchange goes through the fused `MPI_Sendrecv`.
    /// Wait bounds are not honoured: MPI calls block until they complete.
    pub struct MpiComm {
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
        // dropped after `world`; finalizes MPI
        _universe: Universe,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, LifeError> {
            let universe = mpi::initialize().ok_or(LifeError::MpiInit)?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }
    }

    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
            MpiHandle(None)
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let status = self
                .world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(buf, i32::from(tag));
            let n = (status.count(u8::equivalent_datatype()) as usize).min(buf.len());
            MpiHandle(Some(buf[..n].to_vec()))
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn sendrecv(
            &self,
            dest: usize,
            send_tag: u16,
            send: &[u8],
            source: usize,
            recv_tag: u16,
            recv: &mut [u8],
            _bound: &WaitBound,
        ) -> Result<Vec<u8>, WaitFailure> {
            let d = self.world.process_at_rank(dest as i32);
            let s = self.world.process_at_rank(source as i32);
            let status = send_receive_into_with_tags(
                send,
                &d,
                i32::from(send_tag),
                recv,
                &s,
                i32::from(recv_tag),
            );
            let n = (status.count(u8::equivalent_datatype()) as usize).min(recv.len());
            Ok(recv[..n].to_vec())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
