//! Module grids: the geometry every symbology hands to a renderer.
//!
//! A grid is `width × height` modules, row-major, `true` for a dark module.
//! Sizes are in modules, scaling to pixels is left to the renderer.

use core::fmt;

use crate::error::InternalError;

#[derive(Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    width: usize,
    height: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Stacks `rows`, repeating each one `row_height` times. Every row must
    /// be exactly `width` modules long.
    pub fn from_rows<R, I>(width: usize, row_height: usize, rows: R) -> Result<Self, InternalError>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = bool>,
    {
        let mut modules = Vec::new();
        let mut height = 0;
        for row in rows {
            let start = modules.len();
            modules.extend(row);
            if modules.len() - start != width {
                return Err(InternalError::InvalidField("row length differs from the symbol width"));
            }
            for _ in 1..row_height {
                modules.extend_from_within(start..start + width);
            }
            height += row_height;
        }

        Ok(Self { width, height, modules })
    }

    /// Expands a run-length pattern (alternating bar and space widths, bar
    /// first, one digit per element) into a grid `height` modules tall.
    pub fn from_pattern(pattern: &str, height: usize) -> Result<Self, InternalError> {
        let mut row = Vec::new();
        for (k, c) in pattern.chars().enumerate() {
            let width = c.to_digit(10).ok_or(InternalError::InvalidField("pattern element is not a digit"))?;
            row.extend(core::iter::repeat(k % 2 == 0).take(width as usize));
        }
        Self::from_rows(row.len(), height, [row])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Module at column `x` of row `y`, `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x < self.width && y < self.height {
            Some(self.modules[y * self.width + x])
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> Option<&[bool]> {
        (y < self.height).then(|| &self.modules[y * self.width..(y + 1) * self.width])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        // chunks_exact panics on zero
        self.modules.chunks_exact(self.width.max(1))
    }

    /// All modules, row-major.
    #[inline]
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn fill<P: Clone>(&self, target: &mut [P], on: &P, off: &P) {
        for (slot, &bit) in target.iter_mut().zip(&self.modules) {
            *slot = if bit { on.clone() } else { off.clone() };
        }
    }

    pub fn fill_bits(&self, target: &mut [bool]) {
        self.fill(target, &true, &false);
    }

    /// Packs the modules eight per byte, first module in the most significant
    /// bit, rows following each other without padding. `target` needs
    /// `ceil(width * height / 8)` bytes.
    pub fn fill_bitmap(&self, target: &mut [u8]) {
        for (i, &bit) in self.modules.iter().enumerate() {
            let Some(byte) = target.get_mut(i / 8) else {
                break;
            };
            let mask = 0x80 >> (i % 8);
            if bit {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    /// Bytes [fill_bitmap](Self::fill_bitmap) writes.
    pub fn bitmap_len(&self) -> usize {
        self.modules.len().div_ceil(8)
    }
}

impl fmt::Debug for ModuleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModuleGrid {}x{}", self.width, self.height)?;
        for row in self.rows() {
            for &bit in row {
                f.write_str(if bit { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_repeated() {
        let grid = ModuleGrid::from_rows(3, 2, [vec![true, false, true], vec![false, true, false]]).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 4));
        assert_eq!(grid.row(1), Some(&[true, false, true][..]));
        assert_eq!(grid.row(2), Some(&[false, true, false][..]));
        assert_eq!(grid.get(1, 3), Some(true));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.rows().count(), 4);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        assert!(ModuleGrid::from_rows(3, 1, [vec![true], vec![true, true, true]]).is_err());
    }

    #[test]
    fn test_from_pattern() {
        let grid = ModuleGrid::from_pattern("2112", 1).unwrap();
        assert_eq!(grid.modules(), [true, true, false, true, false, false]);
        assert!(ModuleGrid::from_pattern("21x", 1).is_err());
    }

    #[test]
    fn test_fill_bitmap() {
        let grid = ModuleGrid::from_pattern("1111111113", 1).unwrap();
        assert_eq!(grid.width(), 12);
        let mut bitmap = vec![0xFFu8; grid.bitmap_len()];
        grid.fill_bitmap(&mut bitmap);
        // bits past the last module are left alone
        assert_eq!(bitmap, [0b1010_1010, 0b1000_1111]);
    }

    #[test]
    fn test_fill_bits() {
        let grid = ModuleGrid::from_pattern("12", 2).unwrap();
        let mut bits = [true; 6];
        grid.fill_bits(&mut bits);
        assert_eq!(bits, [true, false, false, true, false, false]);
    }
}
