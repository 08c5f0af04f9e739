mod block;
mod encoder;
mod galois;
mod poly;

pub(crate) use block::*;
pub use galois::{gexp, glog};

// Largest block in the table is 153 codewords
pub const MAX_BLOCK_SIZE: usize = 256;
