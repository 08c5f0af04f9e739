use super::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

// Walks every module in placement order: column pairs from the right edge leftwards,
// alternating upwards and downwards, right module before left, with the vertical
// timing column skipped. Callers filter out modules already taken by function patterns.
pub struct EncRegionIter {
    r: i32,
    c: i32,
    width: i32,
}

const VERT_TIMING_COL: i32 = 6;

impl EncRegionIter {
    pub fn new(version: Version) -> Self {
        let w = version.width() as i32;
        Self { r: w - 1, c: w - 1, width: w }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i32, i32);
    fn next(&mut self) -> Option<Self::Item> {
        if self.c < 0 {
            return None;
        }
        let adjusted_col = if self.c <= VERT_TIMING_COL { self.c + 1 } else { self.c };
        let res = (self.r, self.c);
        let col_type = (self.width - adjusted_col) % 4;
        match col_type {
            2 if self.r > 0 => {
                self.r -= 1;
                self.c += 1;
            }
            0 if self.r < self.width - 1 => {
                self.r += 1;
                self.c += 1;
            }
            0 | 2 if self.c == VERT_TIMING_COL + 1 => {
                self.c -= 2;
            }
            _ => {
                self.c -= 1;
            }
        }
        Some(res)
    }
}

#[cfg(test)]
mod iter_tests {
    use super::EncRegionIter;
    use crate::builder::{Module, QR};
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_start_zig_zag() {
        let coords = EncRegionIter::new(Version::MIN).take(6).collect::<Vec<_>>();
        assert_eq!(coords, [(20, 20), (20, 19), (19, 20), (19, 19), (18, 20), (18, 19)]);
    }

    #[test]
    fn test_turns_at_top_edge() {
        let coords = EncRegionIter::new(Version::MIN).skip(40).take(4).collect::<Vec<_>>();
        assert_eq!(coords, [(0, 20), (0, 19), (0, 18), (0, 17)]);
    }

    #[test]
    fn test_skips_timing_column() {
        let coords = EncRegionIter::new(Version::MIN).collect::<Vec<_>>();
        assert_eq!(coords.len(), 20 * 21);
        assert!(coords.iter().all(|&(_, c)| c != 6));
        // Pair (8, 7) ends going up, so the pair (5, 4) starts at the top
        let i = coords.iter().position(|&(_, c)| c == 5).unwrap();
        assert_eq!(coords[i..i + 3], [(0, 5), (0, 4), (1, 5)]);
        assert_eq!(coords.last(), Some(&(20, 0)));
    }

    #[test]
    fn test_enc_region_capacity() {
        for version in Version::all() {
            let mut qr = QR::new(version, ECLevel::L);
            qr.draw_all_function_patterns();
            qr.reserve_format_area();
            qr.reserve_version_area();
            let empty = EncRegionIter::new(version)
                .filter(|&(r, c)| matches!(qr.get(r, c), Module::Empty))
                .count();
            assert_eq!(empty, version.total_codewords() * 8 + version.remainder_bits());
        }
    }
}
