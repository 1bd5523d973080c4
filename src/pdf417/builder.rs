use core::marker::PhantomData;

use crate::error::InternalError;
use crate::generators::{Bitfield, Columns, RowIterator};
use crate::placement::ModuleGrid;
use crate::ecc::MAX_LEVEL;

/// Minimum number of rows in a PDF417 barcode.
pub const MIN_ROWS: u8 = 3;
/// Maximum number of rows in a PDF417 barcode.
pub const MAX_ROWS: u8 = 90;
/// Minimum number of data columns in a PDF417 barcode.
pub const MIN_COLS: u8 = 1;
/// Maximum number of data columns in a PDF417 barcode.
pub const MAX_COLS: u8 = 30;
/// Maximum number of codewords (data and error correction) in one symbol.
pub const MAX_CODEWORDS: usize = 928;

/// A complete codeword matrix ready to be laid out row by row as `R` rows
/// (normal or truncated).
#[derive(Debug, Clone)]
pub struct PDF417<'a, R: Columns<'a> + 'a> {
    storage: &'a [u16],
    dimensions: (u8, u8),
    level: u8,
    _phantom: PhantomData<R>,
}

impl<'a, R: Columns<'a> + 'a> PDF417<'a, R> {
    /// Wraps a full codeword stream (length descriptor, data, padding and
    /// error correction) of exactly `rows * cols` codewords.
    pub fn new(storage: &'a [u16], rows: u8, cols: u8, level: u8) -> Result<Self, InternalError> {
        if !(MIN_ROWS..=MAX_ROWS).contains(&rows) || !(MIN_COLS..=MAX_COLS).contains(&cols) {
            return Err(InternalError::InvalidField("symbol dimensions out of range"));
        }
        if level > MAX_LEVEL {
            return Err(InternalError::InvalidField("error correction level out of range"));
        }
        let expected = rows as usize * cols as usize;
        if storage.len() != expected || expected > MAX_CODEWORDS {
            return Err(InternalError::CapacityMismatch { expected, actual: storage.len() });
        }

        Ok(Self { storage, dimensions: (rows, cols), level, _phantom: PhantomData })
    }

    /// Get the number of rows of the PDF417.
    #[inline]
    pub const fn rows(&self) -> u8 {
        self.dimensions.0
    }

    /// Get the number of columns of the PDF417. This is used to lay down the
    /// start, left, right and end indicators in the render function.
    #[inline]
    pub const fn cols(&self) -> u8 {
        self.dimensions.1
    }

    #[inline]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Width of every row in modules.
    pub fn width(&self) -> usize {
        R::width(self.cols())
    }

    pub fn iter(&self) -> RowIterator<'a, R> {
        RowIterator::new(self.storage, self.dimensions, self.level)
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + 'a {
        self.iter()
            .flatten() // rows -> bitfields
            .flatten() // bitfield -> bits
    }

    /// Lays the symbol out, each row `row_height` modules tall.
    pub fn to_grid(&self, row_height: u8) -> Result<ModuleGrid, InternalError> {
        let rows = self.iter().map(|row| row.flat_map(Bitfield::into_iter));
        ModuleGrid::from_rows(self.width(), row_height as usize, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Pdf417Row, TruncatedPdf417Row};

    #[test]
    fn test_dimensions_checked() {
        let cws = [0u16; 6];
        assert!(PDF417::<Pdf417Row>::new(&cws, 3, 2, 0).is_ok());
        assert!(PDF417::<Pdf417Row>::new(&cws, 2, 3, 0).is_err());
        assert!(PDF417::<Pdf417Row>::new(&cws, 3, 2, 9).is_err());
        assert_eq!(
            PDF417::<Pdf417Row>::new(&cws, 3, 3, 0).unwrap_err(),
            InternalError::CapacityMismatch { expected: 9, actual: 6 }
        );
    }

    #[test]
    fn test_grid_size() {
        let cws = [900u16; 12];
        let normal = PDF417::<Pdf417Row>::new(&cws, 4, 3, 1).unwrap();
        let grid = normal.to_grid(3).unwrap();
        assert_eq!((grid.width(), grid.height()), (69 + 17 * 3, 12));
        assert_eq!(normal.bits().count(), (69 + 17 * 3) * 4);

        let truncated = PDF417::<TruncatedPdf417Row>::new(&cws, 4, 3, 1).unwrap();
        let grid = truncated.to_grid(1).unwrap();
        assert_eq!((grid.width(), grid.height()), (35 + 17 * 3, 4));
        assert_eq!(grid.row(0).unwrap()[..8], [true; 8]);
    }
}
