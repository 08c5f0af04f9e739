use std::ops::Deref;

use log::trace;

use super::error::{QRError, QRResult};
use super::metadata::Color;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        match pattern {
            0..=7 => Ok(Self(pattern)),
            _ => Err(QRError::InvalidMaskingPattern),
        }
    }

    pub fn all() -> impl Iterator<Item = MaskPattern> {
        (0..8).map(MaskPattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Predicates take (row, column)
mod mask_functions {
    pub fn checkerboard(r: i32, c: i32) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i32, _: i32) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i32, c: i32) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i32, c: i32) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i32, c: i32) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i32, c: i32) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i32, c: i32) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i32, c: i32) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_functions(self) -> fn(i32, i32) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Mask pattern is range checked on construction"),
        }
    }
}

#[cfg(test)]
mod mask_pattern_tests {
    use super::MaskPattern;
    use crate::common::error::QRError;

    #[test]
    fn test_new() {
        assert_eq!(*MaskPattern::new(0).unwrap(), 0);
        assert_eq!(*MaskPattern::new(7).unwrap(), 7);
        assert_eq!(MaskPattern::new(8), Err(QRError::InvalidMaskingPattern));
    }

    #[test]
    fn test_all() {
        let all = MaskPattern::all().map(|m| *m).collect::<Vec<_>>();
        assert_eq!(all, (0..8).collect::<Vec<_>>());
    }

    fn render(pattern: u8) -> String {
        let f = MaskPattern::new(pattern).unwrap().mask_functions();
        let mut res = String::from("\n");
        for r in 0..6 {
            for c in 0..6 {
                res.push(if f(r, c) { '#' } else { '.' });
            }
            res.push('\n');
        }
        res
    }

    #[test]
    fn test_checkerboard() {
        assert_eq!(render(0), "\n#.#.#.\n.#.#.#\n#.#.#.\n.#.#.#\n#.#.#.\n.#.#.#\n");
    }

    #[test]
    fn test_horizontal_lines() {
        assert_eq!(render(1), "\n######\n......\n######\n......\n######\n......\n");
    }

    #[test]
    fn test_vertical_lines() {
        assert_eq!(render(2), "\n#..#..\n#..#..\n#..#..\n#..#..\n#..#..\n#..#..\n");
    }

    #[test]
    fn test_diagonal_lines() {
        assert_eq!(render(3), "\n#..#..\n..#..#\n.#..#.\n#..#..\n..#..#\n.#..#.\n");
    }

    #[test]
    fn test_large_checkerboard() {
        assert_eq!(render(4), "\n###...\n###...\n...###\n...###\n###...\n###...\n");
    }

    #[test]
    fn test_fields() {
        assert_eq!(render(5), "\n######\n#.....\n#..#..\n#.#.#.\n#..#..\n#.....\n");
    }

    #[test]
    fn test_diamonds() {
        assert_eq!(render(6), "\n######\n###...\n##.##.\n#.#.#.\n#.##.#\n#...##\n");
    }

    #[test]
    fn test_meadow() {
        assert_eq!(render(7), "\n#.#.#.\n...###\n#...##\n.#.#.#\n###...\n.###..\n");
    }
}

// Mask selection
//------------------------------------------------------------------------------

// Scores every pattern against the unmasked symbol, applies the lowest scoring one and
// returns it. Ties go to the lower pattern.
pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let best_mask = MaskPattern::all()
        .map(|m| {
            let mut trial = qr.clone();
            trial.mask_data(m);
            let pen = compute_total_penalty(&trial);
            trace!("Mask {}: penalty {pen}", *m);
            (m, pen)
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(MaskPattern(0), |(m, _)| m);
    qr.apply_mask(best_mask);
    best_mask
}

// Penalty score
//------------------------------------------------------------------------------

// The balance term is fractional, so the total is too
pub fn compute_total_penalty(qr: &QR) -> f64 {
    let adj_pen = compute_adjacent_penalty(qr);
    let blk_pen = compute_block_penalty(qr);
    let fp_pen_h = compute_finder_pattern_penalty(qr, true);
    let fp_pen_v = compute_finder_pattern_penalty(qr, false);
    let bal_pen = compute_balance_penalty(qr);
    f64::from(adj_pen + blk_pen + fp_pen_h + fp_pen_v) + bal_pen
}

// Every module with more than 5 same colored neighbours among its 8 surrounding
// modules scores 3 plus the excess
fn compute_adjacent_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i32;
    for r in 0..w {
        for c in 0..w {
            let clr = *qr.get(r, c);
            let mut same = 0;
            for dr in -1..=1 {
                for dc in -1..=1 {
                    let (nr, nc) = (r + dr, c + dc);
                    if (dr, dc) == (0, 0) || nr < 0 || nr >= w || nc < 0 || nc >= w {
                        continue;
                    }
                    if *qr.get(nr, nc) == clr {
                        same += 1;
                    }
                }
            }
            if same > 5 {
                pen += 3 + (same - 5);
            }
        }
    }
    pen
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i32;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

fn compute_finder_pattern_penalty(qr: &QR, is_hor: bool) -> u32 {
    static PATTERN: [Color; 7] = [
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Dark,
        Color::Dark,
        Color::Light,
        Color::Dark,
    ];

    let mut pen = 0;
    let w = qr.width() as i32;
    for i in 0..w {
        let get = |j: i32| if is_hor { *qr.get(i, j) } else { *qr.get(j, i) };
        for j in 0..w - 6 {
            if (j..j + 7).map(get).eq(PATTERN.iter().copied()) {
                pen += 40;
            }
        }
    }
    pen
}

// 10 points per 5% the dark ratio deviates from one half, not rounded
fn compute_balance_penalty(qr: &QR) -> f64 {
    let dark_cnt = qr.count_dark_modules() as f64;
    let w = qr.width() as f64;
    let ratio = (100.0 * dark_cnt / w / w - 50.0).abs() / 5.0;
    ratio * 10.0
}
