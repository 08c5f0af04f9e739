use std::ops::Deref;

use crate::common::bit_utils::BitStream;
use crate::common::error::QRResult;
use crate::common::iter::EncRegionIter;
use crate::common::mask::MaskPattern;
use crate::common::metadata::{format_info, parse_format_info, Color, ECLevel, Version};
use crate::common::version_db::{
    FORMAT_INFO_BIT_LEN, FORMAT_INFO_COORDS_QR_MAIN, FORMAT_INFO_COORDS_QR_SIDE,
    VERSION_INFO_BIT_LEN, VERSION_INFO_COORDS_BL, VERSION_INFO_COORDS_TR,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Module {
    Empty,
    Func(Color),
    Version(Color),
    Format(Color),
    Data(Color),
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Module::Empty => &Color::Light,
            Module::Func(c) => c,
            Module::Version(c) => c,
            Module::Format(c) => c,
            Module::Data(c) => c,
        }
    }
}

// Geometric role of a module, as seen by renderers
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LocationKind {
    PositionProbeOuter,
    PositionProbeInner,
    AlignmentPatternOuter,
    AlignmentPatternInner,
    Data,
    Empty,
}

// Top left corner of a finder pattern, x being the column and y the row
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FinderLocation {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FinderLocations {
    pub top_left: FinderLocation,
    pub top_right: FinderLocation,
    pub bottom_left: FinderLocation,
}

pub(crate) const FINDER_SIZE: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QR {
    grid: Box<[Module]>,
    w: usize,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

// QR type for builder
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn new(ver: Version, ecl: ECLevel) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::Empty; w * w].into_boxed_slice(), w, ver, ecl, mask: None }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn dimension(&self) -> usize {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub fn metadata(&self) -> String {
        match self.mask {
            Some(m) => format!(
                "{{ Version: {}, Ec level: {:?}, Mask: {} }}",
                *self.ver, self.ecl, *m
            ),
            None => format!("{{ Version: {}, Ec level: {:?}, Mask: None }}", *self.ver, self.ecl),
        }
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&m| matches!(**m, Color::Dark)).count()
    }

    #[cfg(test)]
    pub(crate) fn to_debug_str(&self) -> String {
        let w = self.w as i32;
        let mut res = String::with_capacity((w * (w + 1) + 1) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    Module::Empty => '.',
                    Module::Func(Color::Dark) => 'f',
                    Module::Func(Color::Light) => 'F',
                    Module::Version(Color::Dark) => 'v',
                    Module::Version(Color::Light) => 'V',
                    Module::Format(Color::Dark) => 'm',
                    Module::Format(Color::Light) => 'M',
                    Module::Data(Color::Dark) => 'd',
                    Module::Data(Color::Light) => 'D',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    // Negative indices wrap around from the bottom or right edge
    fn coord_to_index(&self, r: i32, c: i32) -> usize {
        let w = self.w as i32;
        debug_assert!(-w <= r && r < w, "Row out of bounds: Row {r}, Width {w}");
        debug_assert!(-w <= c && c < w, "Column out of bounds: Column {c}, Width {w}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    pub(crate) fn get(&self, r: i32, c: i32) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub(crate) fn set(&mut self, r: i32, c: i32, module: Module) {
        let index = self.coord_to_index(r, c);
        self.grid[index] = module;
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let w = self.w as i32;
        0 <= x && x < w && 0 <= y && y < w
    }
}

#[cfg(test)]
mod qr_util_tests {
    use super::{Module, QR};
    use crate::common::metadata::{Color, ECLevel, Version};

    #[test]
    fn test_index_wrap() {
        let mut qr = QR::new(Version::MIN, ECLevel::L);
        let w = qr.w as i32;
        qr.set(-1, -1, Module::Func(Color::Dark));
        assert_eq!(qr.get(w - 1, w - 1), Module::Func(Color::Dark));
        qr.set(0, 0, Module::Func(Color::Dark));
        assert_eq!(qr.get(-w, -w), Module::Func(Color::Dark));
    }

    #[test]
    #[should_panic]
    fn test_row_out_of_bound() {
        let qr = QR::new(Version::MIN, ECLevel::L);
        let w = qr.w as i32;
        qr.get(w, 0);
    }

    #[test]
    #[should_panic]
    fn test_col_index_overwrap() {
        let qr = QR::new(Version::MIN, ECLevel::L);
        let w = qr.w as i32;
        qr.get(0, -(w + 1));
    }

    #[test]
    fn test_empty_grid() {
        let qr = QR::new(Version::new(2).unwrap(), ECLevel::Q);
        assert_eq!(qr.width(), 25);
        assert_eq!(qr.count_dark_modules(), 0);
        assert_eq!(qr.metadata(), "{ Version: 2, Ec level: Q, Mask: None }");
    }
}

// Finder pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Draws the 7x7 pattern centered at (r, c) together with its light separator
    fn draw_finder_pattern_at(&mut self, r: i32, c: i32) {
        let (dr_top, dr_bottom) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_left, dc_right) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_top..=dr_bottom {
            for j in dc_left..=dc_right {
                let ring = i32::max(i32::abs(i), i32::abs(j));
                let clr = match ring {
                    4 | 2 => Color::Light,
                    _ => Color::Dark,
                };
                self.set(r + i, c + j, Module::Func(clr));
            }
        }
    }
}


// Alignment pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &r in poses {
            for &c in poses {
                self.draw_alignment_pattern_at(r, c)
            }
        }
    }

    // Skipped when the center is already taken, which only happens under a finder
    fn draw_alignment_pattern_at(&mut self, r: i32, c: i32) {
        if self.get(r, c) != Module::Empty {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                let clr = match (i, j) {
                    (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Color::Dark,
                    _ => Color::Light,
                };
                self.set(r + i, c + j, Module::Func(clr));
            }
        }
    }
}

// Timing pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_timing_pattern(&mut self) {
        let w = self.w as i32;
        self.draw_line(6, 8, 6, w - 9);
        self.draw_line(8, 6, w - 9, 6);
    }

    // Modules already set by an alignment pattern are left untouched
    fn draw_line(&mut self, r1: i32, c1: i32, r2: i32, c2: i32) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        let cells: Vec<(i32, i32)> = if r1 == r2 {
            (c1..=c2).map(|j| (r1, j)).collect()
        } else {
            (r1..=r2).map(|i| (i, c1)).collect()
        };
        for (i, j) in cells {
            if self.get(i, j) == Module::Empty {
                let parity = if r1 == r2 { j } else { i };
                self.set(i, j, Module::Func(Color::from(parity & 1 == 0)));
            }
        }
    }
}

#[cfg(test)]
mod timing_pattern_tests {
    use super::QR;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_timing_pattern_1() {
        let mut qr = QR::new(Version::MIN, ECLevel::L);
        qr.draw_timing_pattern();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             ........fFfFf........\n\
             .....................\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n"
        );
    }
}

// All function patterns
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_alignment_patterns();
        self.draw_timing_pattern();
    }
}

#[cfg(test)]
mod all_function_patterns_test {
    use super::QR;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_all_function_patterns_3() {
        let mut qr = QR::new(Version::new(3).unwrap(), ECLevel::L);
        qr.draw_all_function_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffF.............Ffffffff\n\
             fFFFFFfF.............FfFFFFFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFFFFFfF.............FfFFFFFf\n\
             fffffffFfFfFfFfFfFfFfFfffffff\n\
             FFFFFFFF.............FFFFFFFF\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f.............fffff....\n\
             FFFFFFFF............fFFFf....\n\
             fffffffF............fFfFf....\n\
             fFFFFFfF............fFFFf....\n\
             fFfffFfF............fffff....\n\
             fFfffFfF.....................\n\
             fFfffFfF.....................\n\
             fFFFFFfF.....................\n\
             fffffffF.....................\n"
        );
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl QR {
    // Light format modules, including the always dark module, as scored during mask
    // selection
    pub(crate) fn reserve_format_area(&mut self) {
        self.draw_format_info(0);
        self.set(-8, 8, Module::Format(Color::Light));
    }

    pub(crate) fn reserve_version_area(&mut self) {
        if *self.ver >= 7 {
            self.draw_version_bits(0);
        }
    }

    fn draw_format_info(&mut self, format_info: u32) {
        let off = Module::Format(Color::Light);
        let on = Module::Format(Color::Dark);
        self.draw_number(format_info, FORMAT_INFO_BIT_LEN, off, on, &FORMAT_INFO_COORDS_QR_MAIN);
        self.draw_number(format_info, FORMAT_INFO_BIT_LEN, off, on, &FORMAT_INFO_COORDS_QR_SIDE);
    }

    fn draw_version_info(&mut self) {
        if *self.ver >= 7 {
            self.draw_version_bits(self.ver.info());
        }
    }

    fn draw_version_bits(&mut self, ver_info: u32) {
        let off = Module::Version(Color::Light);
        let on = Module::Version(Color::Dark);
        self.draw_number(ver_info, VERSION_INFO_BIT_LEN, off, on, &VERSION_INFO_COORDS_BL);
        self.draw_number(ver_info, VERSION_INFO_BIT_LEN, off, on, &VERSION_INFO_COORDS_TR);
    }

    // Most significant bit goes to the first coordinate
    fn draw_number(
        &mut self,
        number: u32,
        bit_len: usize,
        off_clr: Module,
        on_clr: Module,
        coords: &[(i32, i32)],
    ) {
        let mut mask = 1 << (bit_len - 1);
        for &(r, c) in coords {
            if number & mask == 0 {
                self.set(r, c, off_clr);
            } else {
                self.set(r, c, on_clr);
            }
            mask >>= 1;
        }
    }

    fn get_number(&self, coords: &[(i32, i32)]) -> u32 {
        coords.iter().fold(0, |n, &(r, c)| (n << 1) | (*self.get(r, c) == Color::Dark) as u32)
    }

    // Decodes the format info, falling back to the side copy when the main one is
    // unreadable
    pub fn format_info(&self) -> QRResult<(ECLevel, MaskPattern)> {
        let main = self.get_number(&FORMAT_INFO_COORDS_QR_MAIN);
        parse_format_info(main)
            .or_else(|_| parse_format_info(self.get_number(&FORMAT_INFO_COORDS_QR_SIDE)))
    }

    // None below version 7, which carries no version info
    pub fn version_info(&self) -> QRResult<Option<Version>> {
        if *self.ver < 7 {
            return Ok(None);
        }
        let bl = self.get_number(&VERSION_INFO_COORDS_BL);
        Version::from_info(bl)
            .or_else(|_| Version::from_info(self.get_number(&VERSION_INFO_COORDS_TR)))
            .map(Some)
    }
}


// Encoding region
//------------------------------------------------------------------------------

impl QR {
    // Places the payload unmasked. Format and version areas stay light until a mask is
    // applied.
    pub(crate) fn draw_encoding_region(&mut self, payload: BitStream) {
        self.reserve_format_area();
        self.reserve_version_area();
        self.draw_payload(payload);

        debug_assert!(!self.grid.contains(&Module::Empty), "Empty module found after payload");
    }

    fn draw_payload(&mut self, payload: BitStream) {
        let mut coords = EncRegionIter::new(self.ver);
        for bit in payload {
            let module = Module::Data(Color::from(bit));
            for (r, c) in coords.by_ref() {
                if matches!(self.get(r, c), Module::Empty) {
                    self.set(r, c, module);
                    break;
                }
            }
        }
        self.fill_remainder_bits(coords);
    }

    fn fill_remainder_bits(&mut self, coords: impl Iterator<Item = (i32, i32)>) {
        for (r, c) in coords {
            if matches!(self.get(r, c), Module::Empty) {
                self.set(r, c, Module::Data(Color::Light));
            }
        }
    }

    // Flips data modules selected by the pattern, leaving everything else as is
    pub(crate) fn mask_data(&mut self, pattern: MaskPattern) {
        let mask_fn = pattern.mask_functions();
        let w = self.w as i32;
        for r in 0..w {
            for c in 0..w {
                if let Module::Data(clr) = self.get(r, c) {
                    if mask_fn(r, c) {
                        self.set(r, c, Module::Data(!clr));
                    }
                }
            }
        }
    }

    pub(crate) fn apply_mask(&mut self, pattern: MaskPattern) {
        self.mask = Some(pattern);
        self.mask_data(pattern);
        self.draw_format_info(format_info(self.ecl, pattern));
        self.set(-8, 8, Module::Format(Color::Dark));
        self.draw_version_info();
    }
}

#[cfg(test)]
mod encoding_region_tests {
    use super::{Module, QR};
    use crate::common::bit_utils::BitStream;
    use crate::common::mask::MaskPattern;
    use crate::common::metadata::{Color, ECLevel, Version};

    fn unmasked(ver: Version, ecl: ECLevel, payload: &[u8]) -> QR {
        let mut qr = QR::new(ver, ecl);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(BitStream::from(payload));
        qr
    }

    #[test]
    fn test_payload_placement_order() {
        let mut payload = vec![0; 26];
        payload[0] = 0b1010_0000;
        let qr = unmasked(Version::MIN, ECLevel::L, &payload);
        assert_eq!(qr.get(20, 20), Module::Data(Color::Dark));
        assert_eq!(qr.get(20, 19), Module::Data(Color::Light));
        assert_eq!(qr.get(19, 20), Module::Data(Color::Dark));
        assert_eq!(qr.get(19, 19), Module::Data(Color::Light));
        assert_eq!(qr.count_dark_modules(), func_dark(Version::MIN) + 2);
    }

    fn func_dark(ver: Version) -> usize {
        let mut qr = QR::new(ver, ECLevel::L);
        qr.draw_all_function_patterns();
        qr.count_dark_modules()
    }

    #[test]
    fn test_remainder_bits_are_light() {
        let ver = Version::new(2).unwrap();
        let qr = unmasked(ver, ECLevel::L, &[0xff; 44]);
        // Version 2 has 7 remainder bits, the last modules in placement order
        let data = (0..25)
            .flat_map(|r| (0..25).map(move |c| (r, c)))
            .filter(|&(r, c)| matches!(qr.get(r, c), Module::Data(_)))
            .count();
        assert_eq!(data, 44 * 8 + 7);
        assert_eq!(qr.count_dark_modules(), func_dark(ver) + 44 * 8);
    }

    #[test]
    fn test_apply_mask() {
        let mut qr = unmasked(Version::MIN, ECLevel::M, &[0; 26]);
        let mask = MaskPattern::new(1).unwrap();
        qr.apply_mask(mask);
        assert_eq!(qr.mask(), Some(mask));
        assert_eq!(qr.format_info(), Ok((ECLevel::M, mask)));
        assert_eq!(qr.get(-8, 8), Module::Format(Color::Dark));
        // Data modules on even rows are flipped to dark
        assert_eq!(qr.get(20, 20), Module::Data(Color::Dark));
        assert_eq!(qr.get(19, 20), Module::Data(Color::Light));
        assert_eq!(qr.get(8, 9), Module::Data(Color::Dark));
    }

    #[test]
    fn test_mask_data_is_involution() {
        let payload = (0..=255).cycle().take(100).collect::<Vec<u8>>();
        let qr = unmasked(Version::new(4).unwrap(), ECLevel::L, &payload);
        for mask in MaskPattern::all() {
            let mut trial = qr.clone();
            trial.mask_data(mask);
            assert_ne!(trial, qr);
            trial.mask_data(mask);
            assert_eq!(trial, qr);
        }
    }
}

// Queries
//------------------------------------------------------------------------------

impl QR {
    // Coordinates are (x, y) with x the column and y the row. Anything outside the
    // symbol is light.
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && *self.get(y, x) == Color::Dark
    }

    pub fn finder_locations(&self) -> FinderLocations {
        let far = self.w - FINDER_SIZE;
        let at = |x, y| FinderLocation { x, y, size: FINDER_SIZE };
        FinderLocations { top_left: at(0, 0), top_right: at(far, 0), bottom_left: at(0, far) }
    }

    pub fn is_in_finder_pattern(&self, x: i32, y: i32) -> bool {
        self.finder_at(x, y).is_some()
    }

    // Offset of (x, y) from the top left corner of the finder containing it
    fn finder_at(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let FinderLocations { top_left, top_right, bottom_left } = self.finder_locations();
        [top_left, top_right, bottom_left].iter().find_map(|f| {
            let (dx, dy) = (x - f.x as i32, y - f.y as i32);
            let size = f.size as i32;
            (0 <= dx && dx < size && 0 <= dy && dy < size).then_some((dx, dy))
        })
    }

    // Offset of (x, y) from the center of the alignment pattern containing it
    fn alignment_at(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let w = self.w as i32;
        let under_finder =
            |r: i32, c: i32| (r < 8 && c < 8) || (r < 8 && c >= w - 8) || (r >= w - 8 && c < 8);
        let poses = self.ver.alignment_pattern();
        poses
            .iter()
            .flat_map(|&r| poses.iter().map(move |&c| (r, c)))
            .filter(|&(r, c)| !under_finder(r, c))
            .map(|(r, c)| (x - c, y - r))
            .find(|(dx, dy)| dx.abs() <= 2 && dy.abs() <= 2)
    }

    // Classifies by geometry alone. Light modules inside a pattern read as empty.
    pub fn location_type(&self, x: i32, y: i32) -> LocationKind {
        if !self.is_filled(x, y) {
            return LocationKind::Empty;
        }
        if let Some((dx, dy)) = self.finder_at(x, y) {
            return match (dx, dy) {
                (2..=4, 2..=4) => LocationKind::PositionProbeInner,
                _ => LocationKind::PositionProbeOuter,
            };
        }
        if let Some((dx, dy)) = self.alignment_at(x, y) {
            return match (dx, dy) {
                (0, 0) => LocationKind::AlignmentPatternInner,
                _ => LocationKind::AlignmentPatternOuter,
            };
        }
        LocationKind::Data
    }
}

// Render
//------------------------------------------------------------------------------

impl QR {
    // Dark modules as blocks, with a 4 module quiet zone on each side
    pub fn to_str(&self, module_sz: usize) -> String {
        let qz_sz = 4 * module_sz;
        let qr_sz = self.w * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = String::with_capacity(total_sz * (total_sz + 1));
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.push(' ');
                    continue;
                }
                let y = ((i - qz_sz) / module_sz) as i32;
                let x = ((j - qz_sz) / module_sz) as i32;
                canvas.push(if self.is_filled(x, y) { '█' } else { ' ' });
            }
            canvas.push('\n');
        }

        canvas
    }
}
