//! Module generation for stacked symbols, one row at a time.

use core::iter;

pub mod bitfield;
pub mod pdf417;

pub use bitfield::Bitfield;

pub type Pdf417Row<'a> = pdf417::Pdf417Row<'a, false>;
pub type TruncatedPdf417Row<'a> = pdf417::Pdf417Row<'a, true>;

pub const START_PAT: Bitfield = Bitfield::new(0b11111111010101000, 17);
pub const   END_PAT: Bitfield = Bitfield::new(0b111111101000101001, 18);
/// Single bar closing a truncated row.
pub const TRUNCATED_END_PAT: Bitfield = Bitfield::new(1, 1);

/// The patterns making up one row of a stacked symbol.
pub trait Columns<'a>: iter::Iterator<Item = Bitfield> + Clone {
    type Info: Copy; // info must be cheap to copy

    fn init(codewords: &'a [u16], row: u8, infos: Self::Info) -> Self;
    fn prepare(dimensions: (u8, u8), level: u8) -> Self::Info;

    /// Row width in modules for `cols` data columns.
    fn width(cols: u8) -> usize;
}

pub struct RowIterator<'a, C: Columns<'a>> {
    codewords: &'a [u16],
    dimensions: (u8, u8),
    infos: C::Info,

    row: u8,
}

impl<'a, C: Columns<'a>> RowIterator<'a, C> {
    pub fn new(codewords: &'a [u16], dimensions: (u8, u8), level: u8) -> Self {
        debug_assert_eq!(codewords.len(), dimensions.0 as usize * dimensions.1 as usize);
        Self {
            codewords,
            dimensions,
            infos: C::prepare(dimensions, level),
            row: 0,
        }
    }
}

impl<'a, C: Columns<'a>> iter::Iterator for RowIterator<'a, C> {
    type Item = C;

    fn next(&mut self) -> Option<Self::Item> {
        let (rows, cols) = self.dimensions;
        if self.row == rows {
            return None;
        }

        let start = self.row as usize * cols as usize;
        let end = start + cols as usize;
        let row = C::init(&self.codewords[start..end], self.row, self.infos);

        self.row += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = (self.dimensions.0 - self.row) as usize;
        (count, Some(count))
    }
}

impl<'a, C: Columns<'a>> ExactSizeIterator for RowIterator<'a, C> {}
impl<'a, C: Columns<'a>> iter::FusedIterator for RowIterator<'a, C> {}
