use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Version;

// Mode
//------------------------------------------------------------------------------

// Only byte mode is encoded. The other indicators exist so a request for them can be
// rejected explicitly instead of being silently treated as bytes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
}

impl Mode {
    pub const INDICATOR_BITS: usize = 4;

    pub fn indicator(self) -> u8 {
        self as u8
    }

    pub fn encoded_len(self, len: usize) -> QRResult<usize> {
        match self {
            Self::Byte => Ok(len * 8),
            _ => Err(QRError::UnsupportedMode),
        }
    }
}

#[cfg(test)]
mod mode_tests {

    use super::Mode;
    use crate::common::error::QRError;

    #[test]
    fn test_indicator() {
        assert_eq!(Mode::Numeric.indicator(), 0b0001);
        assert_eq!(Mode::Alphanumeric.indicator(), 0b0010);
        assert_eq!(Mode::Byte.indicator(), 0b0100);
        assert_eq!(Mode::Kanji.indicator(), 0b1000);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(Mode::Byte.encoded_len(0), Ok(0));
        assert_eq!(Mode::Byte.encoded_len(13), Ok(104));
        assert_eq!(Mode::Numeric.encoded_len(3), Err(QRError::UnsupportedMode));
        assert_eq!(Mode::Alphanumeric.encoded_len(2), Err(QRError::UnsupportedMode));
        assert_eq!(Mode::Kanji.encoded_len(2), Err(QRError::UnsupportedMode));
    }
}

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Segment<'a> {
    pub mode: Mode,
    pub len_bits: usize,
    pub data: &'a [u8],
}

impl<'a> Segment<'a> {
    pub fn new(mode: Mode, ver: Version, data: &'a [u8]) -> QRResult<Self> {
        let len_bits = ver.char_cnt_bits(mode)?;
        Ok(Self { mode, len_bits, data })
    }

    // Header plus payload, without terminator or padding
    pub fn bit_len(&self) -> QRResult<usize> {
        Ok(Mode::INDICATOR_BITS + self.len_bits + self.mode.encoded_len(self.data.len())?)
    }
}
