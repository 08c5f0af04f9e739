mod qr;

pub use qr::{FinderLocation, FinderLocations, LocationKind, QR};
pub(crate) use qr::Module;

use std::ops::Deref;

use log::debug;

use crate::common::{
    bit_utils::BitStream,
    codec::{encode_with_version, find_min_version},
    ec::Block,
    error::{QRError, QRResult},
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

pub struct QRBuilder<'a> {
    data: &'a [u8],
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: None, ec_level: ECLevel::M, mask: None }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    pub fn metadata(&self) -> String {
        let version = self.version.map_or("None".to_string(), |v| (*v).to_string());
        let mask = self.mask.map_or("None".to_string(), |m| (*m).to_string());
        format!("{{ Version: {version}, Ec level: {:?}, Mask: {mask} }}", self.ec_level)
    }
}


impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        debug!("Generating QR {}...", self.metadata());

        let version = match self.version {
            Some(v) => v,
            None => {
                debug!("Finding minimum version...");
                find_min_version(self.data, self.ec_level)?
            }
        };

        debug!("Encoding data...");
        let encoded_data = encode_with_version(self.data, version, self.ec_level)?;

        debug!("Constructing payload with ecc & interleaving...");
        let blocks = Self::compute_ecc(encoded_data.data(), version, self.ec_level)?;
        let mut payload = BitStream::with_capacity(version.total_codewords() << 3);
        payload.extend(&Self::interleave(&blocks.iter().map(Block::data).collect::<Vec<_>>()));
        payload.extend(&Self::interleave(&blocks.iter().map(Block::ecc).collect::<Vec<_>>()));

        debug!("Drawing functional patterns...");
        let mut qr = QR::new(version, self.ec_level);
        qr.draw_all_function_patterns();

        debug!("Drawing encoding region...");
        qr.draw_encoding_region(payload);

        match self.mask {
            Some(m) => {
                debug!("Applying mask {}...", *m);
                qr.apply_mask(m);
            }
            None => {
                debug!("Finding & applying best mask...");
                apply_best_mask(&mut qr);
            }
        };

        let total_modules = version.width() * version.width();
        let dark_modules = qr.count_dark_modules();
        debug!(
            "QR generated: {}, Data capacity: {}, Error capacity: {}, Data size: {}, \
             Dark cells: {dark_modules}, Light cells: {}, Balance: {}%",
            qr.metadata(),
            version.data_capacity(self.ec_level)?,
            Self::ec_capacity(version, self.ec_level)?,
            self.data.len(),
            total_modules - dark_modules,
            dark_modules * 100 / total_modules
        );

        Ok(qr)
    }

    // Splits the padded data codewords into blocks and computes the error correction
    // codewords of each
    pub(crate) fn compute_ecc(
        data: &[u8],
        version: Version,
        ec_level: ECLevel,
    ) -> QRResult<Vec<Block>> {
        let rs_blocks = version.rs_blocks(ec_level)?;
        let mut offset = 0;
        let mut blocks = Vec::with_capacity(rs_blocks.len());
        for rsb in rs_blocks {
            let end = offset + rsb.data_count;
            let chunk = data.get(offset..end).ok_or(QRError::IndexOutOfRange)?;
            blocks.push(Block::new(chunk, rsb.total_count)?);
            offset = end;
        }
        Ok(blocks)
    }

    // Number of codeword errors the symbol can correct
    pub fn ec_capacity(version: Version, ec_level: ECLevel) -> QRResult<usize> {
        // Misdecode protection codewords
        let p = match (*version, ec_level) {
            (1, ECLevel::L) => 3,
            (2, ECLevel::L) | (1, ECLevel::M) => 2,
            (1, _) | (3, ECLevel::L) => 1,
            _ => 0,
        };

        let ec_bytes = version.rs_blocks(ec_level)?.iter().map(|b| b.ec_count()).sum::<usize>();
        Ok((ec_bytes - p) / 2)
    }

    pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
        let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
        let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
        let mut res = Vec::with_capacity(total_size);
        for i in 0..max_block_size {
            for b in blocks {
                if i < b.len() {
                    res.push(b[i]);
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod builder_tests {
    use test_case::test_case;

    use super::QRBuilder;
    use crate::common::codec::str_to_bytes;
    use crate::common::error::QRError;
    use crate::common::mask::MaskPattern;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_add_ec_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected_ecc = b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17";
        let blocks = QRBuilder::compute_ecc(msg, Version::MIN, ECLevel::M).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].data(), msg);
        assert_eq!(blocks[0].ecc(), expected_ecc);
    }

    #[test]
    fn test_add_ec_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let blocks = QRBuilder::compute_ecc(msg, Version::new(5).unwrap(), ECLevel::Q).unwrap();
        let data_lens = blocks.iter().map(|b| b.data_len()).collect::<Vec<_>>();
        assert_eq!(data_lens, [15, 15, 16, 16]);
        for (b, exp) in blocks.iter().zip(expected_ec.iter()) {
            assert_eq!(b.ecc(), *exp);
        }
    }

    #[test]
    fn test_compute_ecc_short_input() {
        let res = QRBuilder::compute_ecc(&[0; 18], Version::MIN, ECLevel::L);
        assert_eq!(res.map(|b| b.len()), Err(QRError::IndexOutOfRange));
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = QRBuilder::interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
        assert_eq!(QRBuilder::interleave::<u8, Vec<u8>>(&[]), Vec::<u8>::new());
    }

    #[test_case(1, ECLevel::L, 2)]
    #[test_case(1, ECLevel::M, 4)]
    #[test_case(1, ECLevel::H, 8)]
    #[test_case(5, ECLevel::Q, 36)]
    #[test_case(40, ECLevel::H, 1215)]
    fn test_ec_capacity(v: usize, ecl: ECLevel, exp: usize) {
        assert_eq!(QRBuilder::ec_capacity(Version::new(v).unwrap(), ecl), Ok(exp));
    }

    #[test_case("https://gksander.com", ECLevel::L, 2)]
    #[test_case("Meow", ECLevel::H, 1)]
    #[test_case("", ECLevel::M, 1)]
    #[test_case("1234567890", ECLevel::Q, 1)]
    fn test_build_picks_minimum_version(data: &str, ecl: ECLevel, exp: usize) {
        let data = str_to_bytes(data);
        let qr = QRBuilder::new(&data).ec_level(ecl).build().unwrap();
        assert_eq!(qr.version(), Version::new(exp).unwrap());
        assert_eq!(qr.ec_level(), ecl);
        let mask = qr.mask().unwrap();
        assert_eq!(qr.format_info(), Ok((ecl, mask)));
    }

    #[test]
    fn test_build_with_forced_mask() {
        for mask in MaskPattern::all() {
            let ver = Version::new(3).unwrap();
            let qr = QRBuilder::new(b"Meow").version(ver).mask(mask).build().unwrap();
            assert_eq!(qr.mask(), Some(mask));
            assert_eq!(qr.format_info(), Ok((ECLevel::M, mask)));
        }
    }

    #[test]
    fn test_build_version_info() {
        let ver = Version::new(7).unwrap();
        let qr = QRBuilder::new(b"Meow").version(ver).build().unwrap();
        assert_eq!(qr.version_info(), Ok(Some(ver)));
    }

    #[test]
    fn test_builder_data_overflow() {
        let data = "1234567890".repeat(128);
        let res =
            QRBuilder::new(data.as_bytes()).version(Version::MAX).ec_level(ECLevel::H).build();
        assert_eq!(res.err(), Some(QRError::CapacityOverflow));

        let data = "1234567890".repeat(300);
        let res = QRBuilder::new(data.as_bytes()).ec_level(ECLevel::L).build();
        assert_eq!(res.err(), Some(QRError::DataTooLong));
    }
}
