//! # qrism-core
//!
//! The encoding core of a QR code generator: byte mode payloads, Reed-Solomon error
//! correction, structural pattern placement and penalty based mask selection.
//! The produced module grid is bit for bit what the widely used `qrcode-generator`
//! library renders for the same input.
//!
//! ## Quick Start
//!
//! ```rust
//! use qrism_core::{encode, select_minimum_version, str_to_bytes, ECLevel, LocationKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = str_to_bytes("https://gksander.com");
//! let version = select_minimum_version(&data, ECLevel::M)?;
//! let qr = encode(&data, *version, ECLevel::M)?;
//!
//! assert_eq!(qr.dimension(), 25);
//! assert!(qr.is_filled(0, 0));
//! assert_eq!(qr.location_type(3, 3), LocationKind::PositionProbeInner);
//! # Ok(())
//! # }
//! ```
//!
//! ## Full Configuration
//!
//! ```rust
//! use qrism_core::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Meow")
//!     .version(Version::new(2)?)      // If not provided, finds smallest version to fit data
//!     .ec_level(ECLevel::Q)           // If not provided, defaults to ECLevel::M
//!     .mask(MaskPattern::new(3)?)     // If not provided, finds best mask based on penalty score
//!     .build()?;
//!
//! assert_eq!(qr.format_info()?, (ECLevel::Q, MaskPattern::new(3)?));
//! # Ok(())
//! # }
//! ```
//!
//! ## Coordinates
//!
//! Queries take `(x, y)` with `x` the column and `y` the row. Anything outside the
//! symbol reads as light and empty.
//!
//! ## Text input
//!
//! Byte mode carries raw bytes. [`str_to_bytes`] keeps the low byte of every UTF-16
//! code unit, which is lossless for Latin-1 text only.

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;

pub use builder::{FinderLocation, FinderLocations, LocationKind, QRBuilder, QR};
pub use common::codec::str_to_bytes;
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};

use common::codec::find_min_version;

// Smallest version whose capacity at `ecl` holds `data` in byte mode
pub fn select_minimum_version(data: &[u8], ecl: ECLevel) -> QRResult<Version> {
    find_min_version(data, ecl)
}

// Builds the symbol for a fixed version with the lowest penalty mask
pub fn encode(data: &[u8], version: usize, ecl: ECLevel) -> QRResult<QR> {
    let version = Version::new(version)?;
    QRBuilder::new(data).version(version).ec_level(ecl).build()
}
