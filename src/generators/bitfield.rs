//! Packed run of up to 24 modules, most significant module first.

use core::iter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitfield(u32);

impl Bitfield {
    pub const fn new(bits: u32, count: u8) -> Self {
        debug_assert!(count <= 24, "count is too big");

        Self((bits << 8) | count as u32)
    }

    #[inline]
    pub const fn size(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0 >> 8
    }

    #[inline]
    pub const fn as_pair(&self) -> (u32, u32) {
        (self.0 >> 8, self.0 & 0xFF)
    }
}

impl iter::IntoIterator for Bitfield {
    type Item = bool;
    type IntoIter = Bits;

    fn into_iter(self) -> Self::IntoIter {
        let (value, count) = self.as_pair();
        Bits { value, count }
    }
}

pub struct Bits {
    value: u32,
    count: u32,
}

impl iter::Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count > 0 {
            self.count -= 1;
            Some((self.value >> self.count) & 1 != 0)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.count as usize;
        (count, Some(count))
    }
}

impl iter::DoubleEndedIterator for Bits {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.count > 0 {
            let bit = (self.value & 1) != 0;
            self.value >>= 1;
            self.count -= 1;
            Some(bit)
        } else {
            None
        }
    }
}

impl iter::ExactSizeIterator for Bits {}
impl iter::FusedIterator for Bits {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        let bits: Vec<bool> = Bitfield::new(0b1101, 4).into_iter().collect();
        assert_eq!(bits, [true, true, false, true]);
    }

    #[test]
    fn test_leading_zeros_are_kept() {
        let field = Bitfield::new(0b01, 3);
        assert_eq!(field.size(), 3);
        assert_eq!(field.into_iter().collect::<Vec<_>>(), [false, false, true]);
        assert_eq!(field.into_iter().len(), 3);
    }

    #[test]
    fn test_reversed() {
        let bits: Vec<bool> = Bitfield::new(0b1100, 4).into_iter().rev().collect();
        assert_eq!(bits, [false, false, true, true]);
    }
}
