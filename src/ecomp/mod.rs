//! The e-compression codec: differencing plus variable-width bit-packing of
//! 32-bit integer sample blocks, and the stream-level framing around them.
//!
//! Grounded on `e_compression.c`/`e_compression.h`. Submodules mirror the
//! three layers of the original file: [`header`] (the 8-byte block header
//! and its check-value arithmetic), [`packet`] (the six packed sample
//! layouts), [`block`] (one complete block, decode and encode), and
//! [`stream`] (seeking and concatenating blocks, and the public
//! `e_decomp`/`e_comp`/`*_inplace` entry points).

pub mod block;
pub mod header;
pub mod packet;
pub mod stream;

pub use block::{block_e_decomp, DecodedBlock, EncodedBlock};
pub use header::{EC_MAX_BUFFER, EC_MAX_NDIFF};
pub use stream::{e_comp, e_comp_inplace, e_decomp, e_decomp_inplace, BlockFlag};
