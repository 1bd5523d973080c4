use core::iter;

use crate::pdf417::tables::{codeword_pattern, MODULES_PER_CODEWORD};
use super::{Bitfield, Columns, START_PAT, END_PAT, TRUNCATED_END_PAT};

#[inline]
fn cw(table: u8, value: u16) -> Bitfield {
    Bitfield::new((1 << 16) | codeword_pattern(table, value) as u32, MODULES_PER_CODEWORD as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum RowPattern {
    Start,
    Left,
    Data,
    Right,
    End,
    None,
}

/// Row indicator values shared by every row: `(rows, cols, level)`.
pub type RowInfo = (u8, u8, u8);

#[derive(Debug, Clone)]
pub struct Pdf417Row<'a, const TRUNCATED: bool> {
    codewords: &'a [u16],
    next_pat: RowPattern,
    table: u8,
    /// (left, right)
    markers: (u16, u16),
}

impl<'a, const TRUNCATED: bool> Pdf417Row<'a, TRUNCATED> {
    fn new(codewords: &'a [u16], row: u8, infos: RowInfo) -> Self {
        let (rows_val, cols_val, level_val) = infos;
        let table = row % 3;
        let row_id = (row / 3) as u16 * 30;

        let (left, right) = match table {
            0 => (rows_val, cols_val),
            1 => (level_val, rows_val),
            _ => (cols_val, level_val),
        };
        Self {
            codewords,
            table,
            markers: (left as u16 + row_id, right as u16 + row_id),
            next_pat: RowPattern::Start,
        }
    }

    /// Cluster table of this row (0, 1 or 2 for clusters 0, 3 and 6).
    #[inline]
    pub fn table(&self) -> u8 {
        self.table
    }

    /// Left and right row indicator codewords.
    #[inline]
    pub fn markers(&self) -> (u16, u16) {
        self.markers
    }

    fn remaining(&self) -> usize {
        let tail = if TRUNCATED { 1 } else { 2 };
        self.codewords.len() + match self.next_pat {
            RowPattern::Start => 2 + tail,
            RowPattern::Left  => 1 + tail,
            RowPattern::Data  => tail,
            RowPattern::Right => 2,
            RowPattern::End   => 1,
            RowPattern::None  => 0,
        }
    }
}

impl<'a, const TRUNCATED: bool> Columns<'a> for Pdf417Row<'a, TRUNCATED> {
    type Info = RowInfo;

    fn init(codewords: &'a [u16], row: u8, infos: RowInfo) -> Self {
        Self::new(codewords, row, infos)
    }

    fn prepare((rows, cols): (u8, u8), level: u8) -> RowInfo {
        let rows_val = (rows - 1) / 3;
        let cols_val = cols - 1;
        let level_val = level * 3 + (rows - 1) % 3;
        (rows_val, cols_val, level_val)
    }

    fn width(cols: u8) -> usize {
        let data = cols as usize * MODULES_PER_CODEWORD;
        if TRUNCATED {
            START_PAT.size() as usize + MODULES_PER_CODEWORD + data + TRUNCATED_END_PAT.size() as usize
        } else {
            START_PAT.size() as usize + 2 * MODULES_PER_CODEWORD + data + END_PAT.size() as usize
        }
    }
}

impl<'a, const TRUNCATED: bool> iter::Iterator for Pdf417Row<'a, TRUNCATED> {
    type Item = Bitfield;

    fn next(&mut self) -> Option<Self::Item> {
        let (item, next) = match self.next_pat {
            RowPattern::Start => (Some(START_PAT), RowPattern::Left),
            RowPattern::Left => (Some(cw(self.table, self.markers.0)), RowPattern::Data),
            RowPattern::Data => match self.codewords.split_first() {
                Some((&cw_value, rest)) => {
                    self.codewords = rest;
                    let next = match (rest.is_empty(), TRUNCATED) {
                        (false, _) => RowPattern::Data,
                        (true, false) => RowPattern::Right,
                        (true, true) => RowPattern::End,
                    };
                    (Some(cw(self.table, cw_value)), next)
                }
                None => (None, RowPattern::None),
            },
            RowPattern::Right => (Some(cw(self.table, self.markers.1)), RowPattern::End),
            RowPattern::End if TRUNCATED => (Some(TRUNCATED_END_PAT), RowPattern::None),
            RowPattern::End => (Some(END_PAT), RowPattern::None),
            RowPattern::None => (None, RowPattern::None),
        };

        self.next_pat = next;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.remaining();
        (count, Some(count))
    }
}

impl<'a, const TRUNCATED: bool> ExactSizeIterator for Pdf417Row<'a, TRUNCATED> {}
impl<'a, const TRUNCATED: bool> iter::FusedIterator for Pdf417Row<'a, TRUNCATED> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Pdf417Row as NormalRow, TruncatedPdf417Row};

    fn modules<'a, R: Columns<'a>>(row: R) -> usize {
        row.map(|b| b.size() as usize).sum()
    }

    #[test]
    fn test_row_indicators() {
        // 10 rows, 4 columns, level 2
        let infos = NormalRow::prepare((10, 4), 2);
        assert_eq!(infos, (3, 3, 6));

        let cws = [0u16; 4];
        assert_eq!(NormalRow::init(&cws, 0, infos).markers(), (3, 3));
        assert_eq!(NormalRow::init(&cws, 1, infos).markers(), (6, 3));
        assert_eq!(NormalRow::init(&cws, 2, infos).markers(), (3, 6));
        assert_eq!(NormalRow::init(&cws, 3, infos).markers(), (33, 33));
        assert_eq!(NormalRow::init(&cws, 5, infos).table(), 2);
    }

    #[test]
    fn test_row_width() {
        let cws = [1u16, 2, 3];
        let infos = NormalRow::prepare((3, 3), 0);

        let row = NormalRow::init(&cws, 0, infos);
        assert_eq!(row.len(), 7);
        assert_eq!(modules(row), NormalRow::width(3));
        assert_eq!(NormalRow::width(3), 69 + 17 * 3);

        let row = TruncatedPdf417Row::init(&cws, 0, infos);
        assert_eq!(row.len(), 6);
        assert_eq!(modules(row), TruncatedPdf417Row::width(3));
        assert_eq!(TruncatedPdf417Row::width(3), 35 + 17 * 3);
    }

    #[test]
    fn test_row_starts_and_ends() {
        let cws = [100u16];
        let infos = NormalRow::prepare((3, 1), 0);
        let bits: Vec<bool> = NormalRow::init(&cws, 0, infos).flatten().collect();
        assert_eq!(&bits[..9], [true, true, true, true, true, true, true, true, false]);
        assert_eq!(&bits[bits.len() - 3..], [false, false, true]);

        let bits: Vec<bool> = TruncatedPdf417Row::init(&cws, 0, infos).flatten().collect();
        assert_eq!(bits.last(), Some(&true));
        assert_eq!(bits.len(), 35 + 17);
    }
}
