use std::ops::{Deref, Not};

use super::codec::Mode;
use super::error::{QRError, QRResult};
use super::mask::MaskPattern;
use super::version_db::{ALIGNMENT_PATTERN_POSITIONS, G15, G15_MASK, G18, RS_BLOCK_TABLE};

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

impl From<bool> for Color {
    fn from(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [Self::L, Self::M, Self::Q, Self::H];

    // Two bit indicator written into the format info. It is intentionally not the
    // declaration order: L=01, M=00, Q=11, H=10.
    pub fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }

    pub fn from_format_bits(bits: u32) -> QRResult<Self> {
        match bits {
            0b01 => Ok(Self::L),
            0b00 => Ok(Self::M),
            0b11 => Ok(Self::Q),
            0b10 => Ok(Self::H),
            _ => Err(QRError::InvalidFormatInfo),
        }
    }
}

// Reed-Solomon block descriptor
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct RSBlock {
    pub total_count: usize,
    pub data_count: usize,
}

impl RSBlock {
    pub fn ec_count(&self) -> usize {
        self.total_count - self.data_count
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct Version(usize);

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(version: usize) -> QRResult<Self> {
        match version {
            1..=40 => Ok(Self(version)),
            _ => Err(QRError::InvalidVersion),
        }
    }

    pub fn all() -> impl Iterator<Item = Version> {
        (1..=40).map(Version)
    }

    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    pub fn alignment_pattern(self) -> &'static [i32] {
        ALIGNMENT_PATTERN_POSITIONS[self.0 - 1]
    }

    // Expands the block table row into one descriptor per block, first group first
    pub fn rs_blocks(self, ecl: ECLevel) -> QRResult<Vec<RSBlock>> {
        let index = (self.0 - 1) * 4 + ecl as usize;
        let row = RS_BLOCK_TABLE.get(index).ok_or(QRError::IndexOutOfRange)?;

        let mut blocks = Vec::with_capacity(row[0] + row[3]);
        for group in row.chunks_exact(3) {
            let (count, total_count, data_count) = (group[0], group[1], group[2]);
            blocks.extend((0..count).map(|_| RSBlock { total_count, data_count }));
        }
        Ok(blocks)
    }

    pub fn data_capacity(self, ecl: ECLevel) -> QRResult<usize> {
        Ok(self.rs_blocks(ecl)?.iter().map(|b| b.data_count).sum())
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> QRResult<usize> {
        Ok(self.data_capacity(ecl)? << 3)
    }

    pub fn total_codewords(self) -> usize {
        let row = RS_BLOCK_TABLE[(self.0 - 1) * 4];
        row[0] * row[1] + row[3] * row[4]
    }

    pub fn remainder_bits(self) -> usize {
        match self.0 {
            2..=6 => 7,
            14..=20 | 28..=34 => 3,
            21..=27 => 4,
            _ => 0,
        }
    }

    pub fn char_cnt_bits(self, mode: Mode) -> QRResult<usize> {
        match mode {
            Mode::Byte => match self.0 {
                1..=9 => Ok(8),
                _ => Ok(16),
            },
            _ => Err(QRError::UnsupportedMode),
        }
    }

    // 18 bit BCH coded version info, only drawn for versions 7 and above
    pub fn info(self) -> u32 {
        let data = self.0 as u32;
        let rem = bch_remainder(data << 12, G18);
        (data << 12) | rem
    }

    pub fn from_info(info: u32) -> QRResult<Self> {
        Self::all()
            .skip(6)
            .map(|v| (v, (v.info() ^ info).count_ones()))
            .filter(|(_, d)| *d <= 3)
            .min_by_key(|(_, d)| *d)
            .map(|(v, _)| v)
            .ok_or(QRError::InvalidVersionInfo)
    }
}

// Format info
//------------------------------------------------------------------------------

// 15 bit BCH coded format info for the level and mask pair
pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    format_codeword((ecl.format_bits() << 3) | *mask as u32)
}

// Decodes to the nearest of the 32 valid codewords within a hamming distance of 3
pub fn parse_format_info(info: u32) -> QRResult<(ECLevel, MaskPattern)> {
    let (data, dist) = (0..32)
        .map(|data| (data, (format_codeword(data) ^ info).count_ones()))
        .min_by_key(|(_, d)| *d)
        .ok_or(QRError::InvalidFormatInfo)?;

    if dist > 3 {
        return Err(QRError::InvalidFormatInfo);
    }
    Ok((ECLevel::from_format_bits(data >> 3)?, MaskPattern::new((data & 0b111) as u8)?))
}

fn format_codeword(data: u32) -> u32 {
    ((data << 10) | bch_remainder(data << 10, G15)) ^ G15_MASK
}

fn bch_digit(mut data: u32) -> u32 {
    let mut digit = 0;
    while data != 0 {
        digit += 1;
        data >>= 1;
    }
    digit
}

fn bch_remainder(mut data: u32, gen: u32) -> u32 {
    let gen_digit = bch_digit(gen);
    while bch_digit(data) >= gen_digit {
        data ^= gen << (bch_digit(data) - gen_digit);
    }
    data
}
