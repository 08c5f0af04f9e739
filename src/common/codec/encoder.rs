pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use log::debug;

    use super::writer::{pad_remaining_capacity, push_segment, push_terminator};
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Mode, Segment};
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::{ECLevel, Version};

    // Smallest version whose data capacity holds the byte segment and a full terminator
    pub fn find_min_version(data: &[u8], ecl: ECLevel) -> QRResult<Version> {
        for ver in Version::all() {
            let sz = Segment::new(Mode::Byte, ver, data)?.bit_len()?;
            if sz + 4 <= ver.data_bit_capacity(ecl)? {
                debug!("Minimum version for {} bytes at level {ecl:?}: {}", data.len(), *ver);
                return Ok(ver);
            }
        }
        Err(QRError::DataTooLong)
    }

    // Byte mode segment, terminated and padded to exactly the data capacity of the
    // version and level
    pub fn encode_with_version(data: &[u8], ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
        let bcap = ver.data_bit_capacity(ecl)?;
        let seg = Segment::new(Mode::Byte, ver, data)?;
        if seg.bit_len()? > bcap {
            return Err(QRError::CapacityOverflow);
        }

        let mut bs = BitStream::with_capacity(bcap);
        push_segment(seg, &mut bs);
        push_terminator(&mut bs, bcap);
        pad_remaining_capacity(&mut bs, bcap);
        Ok(bs)
    }

    // Each UTF-16 code unit keeps only its low byte. Text outside Latin-1 is not
    // representable and loses information.
    pub fn str_to_bytes(text: &str) -> Vec<u8> {
        text.encode_utf16().map(|u| (u & 0xff) as u8).collect()
    }

}

// Writer
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Mode, Segment, PADDING_CODEWORDS};

    pub fn push_segment(seg: Segment, out: &mut BitStream) {
        push_header(&seg, out);
        match seg.mode {
            Mode::Byte => push_byte_data(seg.data, out),
            _ => unreachable!("Segment constructed for unsupported mode {:?}", seg.mode),
        }
    }

    fn push_header(seg: &Segment, out: &mut BitStream) {
        out.push_bits(seg.mode.indicator(), Mode::INDICATOR_BITS);
        let char_cnt = seg.data.len();
        debug_assert!(
            char_cnt < (1 << seg.len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {}",
            seg.len_bits
        );
        out.push_bits(char_cnt as u16, seg.len_bits);
    }

    fn push_byte_data(data: &[u8], out: &mut BitStream) {
        for &b in data {
            out.push_bits(b, 8);
        }
    }

    // Terminator is only written when all 4 bits fit
    pub fn push_terminator(out: &mut BitStream, bit_capacity: usize) {
        if out.len() + 4 <= bit_capacity {
            out.push_bits(0_u8, 4);
        }
    }

    pub fn pad_remaining_capacity(out: &mut BitStream, bit_capacity: usize) {
        push_padding_bits(out);
        push_padding_codewords(out, bit_capacity);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = 8 - offset;
            out.push_bits(0_u8, padding_bits_len);
        }
    }

    fn push_padding_codewords(out: &mut BitStream, bit_capacity: usize) {
        let offset = out.len() & 7;
        debug_assert!(
            offset == 0,
            "Bit offset should be zero before padding codewords: {}",
            offset
        );

        let remain_byte_capacity = bit_capacity.saturating_sub(out.len()) >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }

}
