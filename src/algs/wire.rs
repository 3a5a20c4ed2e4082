//! Fixed, versioned, little-endian wire records for halo rows and collections.
//!
//! A halo message is one [`WireHdr`] followed by `cols` cell bytes. A
//! collection message is one [`WireHdr`] plus a [`WireShape`] followed by the
//! sender's visible cells. Every receiver checks the header against what it
//! expects before touching its buffers.

use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

/// Record kinds carried in [`WireHdr::kind`].
pub mod kind {
    /// First interior row travelling to the up neighbor.
    pub const ROW_UP: u16 = 1;
    /// Last interior row travelling to the down neighbor.
    pub const ROW_DOWN: u16 = 2;
    /// Visible cells travelling to the collecting rank.
    pub const GATHER: u16 = 3;
    /// Collected grid fanned back out to every rank.
    pub const BROADCAST: u16 = 4;
}

/// All multi-byte integers are stored pre-LE with `.to_le()` and decoded
/// with `.from_le()`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireHdr {
    pub version_le: u16,
    pub kind_le: u16,
    pub sender_le: u32, // never usize on the wire
    pub generation_le: u64,
}

impl WireHdr {
    pub fn new(kind: u16, sender: usize, generation: u64) -> Self {
        Self {
            version_le: WIRE_VERSION.to_le(),
            kind_le: kind.to_le(),
            sender_le: (sender as u32).to_le(),
            generation_le: generation.to_le(),
        }
    }
    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }
    pub fn kind(&self) -> u16 {
        u16::from_le(self.kind_le)
    }
    pub fn sender(&self) -> usize {
        u32::from_le(self.sender_le) as usize
    }
    pub fn generation(&self) -> u64 {
        u64::from_le(self.generation_le)
    }
}

/// Extent of a block of cells following a collection header.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireShape {
    pub rows_le: u32,
    pub cols_le: u32,
}

impl WireShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows_le: (rows as u32).to_le(),
            cols_le: (cols as u32).to_le(),
        }
    }
    pub fn rows(&self) -> usize {
        u32::from_le(self.rows_le) as usize
    }
    pub fn cols(&self) -> usize {
        u32::from_le(self.cols_le) as usize
    }
}

pub const HDR_LEN: usize = size_of::<WireHdr>();
pub const SHAPE_LEN: usize = size_of::<WireShape>();

/// What a receiver requires of an incoming header.
#[derive(Clone, Copy, Debug)]
pub struct Expect {
    pub kind: u16,
    pub sender: usize,
    pub generation: u64,
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

fn check_hdr(hdr: &WireHdr, want: &Expect) -> Result<(), String> {
    if hdr.version() != WIRE_VERSION {
        return Err(format!(
            "wire version {} (expected {WIRE_VERSION})",
            hdr.version()
        ));
    }
    if hdr.kind() != want.kind {
        return Err(format!("record kind {} (expected {})", hdr.kind(), want.kind));
    }
    if hdr.sender() != want.sender {
        return Err(format!(
            "sent by rank {} (expected rank {})",
            hdr.sender(),
            want.sender
        ));
    }
    if hdr.generation() != want.generation {
        return Err(format!(
            "generation {} (expected {})",
            hdr.generation(),
            want.generation
        ));
    }
    Ok(())
}

/// Header followed by one row of cells.
pub fn encode_row(hdr: WireHdr, row: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HDR_LEN + row.len());
    out.extend_from_slice(bytemuck::bytes_of(&hdr));
    out.extend_from_slice(row);
    out
}

/// Validate a halo message and return its `cols` cells.
pub fn decode_row<'a>(bytes: &'a [u8], cols: usize, want: &Expect) -> Result<&'a [u8], String> {
    expect_exact_len(bytes.len(), HDR_LEN + cols)?;
    let hdr: WireHdr = bytemuck::pod_read_unaligned(&bytes[..HDR_LEN]);
    check_hdr(&hdr, want)?;
    Ok(&bytes[HDR_LEN..])
}

/// Header, shape, then `rows * cols` cells.
pub fn encode_block(hdr: WireHdr, rows: usize, cols: usize, cells: &[u8]) -> Vec<u8> {
    let shape = WireShape::new(rows, cols);
    let mut out = Vec::with_capacity(HDR_LEN + SHAPE_LEN + cells.len());
    out.extend_from_slice(bytemuck::bytes_of(&hdr));
    out.extend_from_slice(bytemuck::bytes_of(&shape));
    out.extend_from_slice(cells);
    out
}

/// Validate a collection message of exactly `rows x cols` cells.
pub fn decode_block<'a>(
    bytes: &'a [u8],
    rows: usize,
    cols: usize,
    want: &Expect,
) -> Result<&'a [u8], String> {
    expect_exact_len(bytes.len(), HDR_LEN + SHAPE_LEN + rows * cols)?;
    let hdr: WireHdr = bytemuck::pod_read_unaligned(&bytes[..HDR_LEN]);
    check_hdr(&hdr, want)?;
    let shape: WireShape = bytemuck::pod_read_unaligned(&bytes[HDR_LEN..HDR_LEN + SHAPE_LEN]);
    if shape.rows() != rows || shape.cols() != cols {
        return Err(format!(
            "block is {}x{} (expected {rows}x{cols})",
            shape.rows(),
            shape.cols()
        ));
    }
    Ok(&bytes[HDR_LEN + SHAPE_LEN..])
}
