pub mod encoder;
pub mod types;

pub use encoder::*;
pub use types::*;

pub(crate) static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

// Codec proptesting
//------------------------------------------------------------------------------
