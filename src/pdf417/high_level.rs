//! User data to high level encoding conversion functions

use awint_core::{InlAwi, Bits};
type U160 = InlAwi<160, { Bits::unstable_raw_digits(160) }>;

use crate::error::{InputError, InternalError};
use crate::segment::{self, CostModel, Segment, Segmentation};
use super::tables::{MIXED_CHAR_SET, PUNC_CHAR_SET};

/// Codeword used to latch to text mode
pub const M_LATCH_TEXT: u16 = 900;
/// Codeword used to latch to byte mode (if length is multiple of 6 use
/// M_LATCH_BYTE_M6).
pub const M_LATCH_BYTE: u16 = 901;
/// Codeword used to latch to numeric mode
pub const M_LATCH_NUMERIC: u16 = 902;

/// Codeword used to switch to byte mode for next codedword (usable only if
/// the current mode is text).
pub const M_SHIFT_BYTE: u16 = 913;

/// Reader initialisation (programming) symbol.
pub const READER_INIT: u16 = 921;
/// Terminates the Macro PDF417 control block of the last segment.
pub const MACRO_TERMINATOR: u16 = 922;
/// Introduces an optional Macro PDF417 field.
pub const MACRO_OPTIONAL_FIELD: u16 = 923;

/// Codeword used to latch to byte mode (if length is multiple of 6 use
/// M_LATCH_BYTE_M6).
pub const M_LATCH_BYTE_M6: u16 = 924;
/// Codeword used to specifiy a ECI (user) custom ID
pub const ECI_CUSTOM_ID: u16 = 925;
/// Codeword used to specifiy a ECI code
pub const ECI_GENERAL_ID: u16 = 926;
/// Codeword used to specifiy a ECI code page
pub const ECI_CODE_PAGE: u16 = 927;
/// Block start for PDF macro
pub const MACRO_BLOCK_START: u16 = 928;

/// Codeword used as padding at the end of the data section
pub const CW_PADDING: u16 = M_LATCH_TEXT;

/// Longest digit run packed into one base 900 group.
pub const NUMERIC_GROUP: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compaction {
    Text,
    Numeric,
    Byte,
}

impl Compaction {
    pub const fn name(self) -> &'static str {
        match self {
            Compaction::Text => "TEX",
            Compaction::Numeric => "NUM",
            Compaction::Byte => "BYT",
        }
    }

    /// Codeword switching into this mode for a run of `len` units.
    pub const fn latch(self, len: usize) -> u16 {
        match self {
            Compaction::Text => M_LATCH_TEXT,
            Compaction::Numeric => M_LATCH_NUMERIC,
            Compaction::Byte if len % 6 == 0 => M_LATCH_BYTE_M6,
            Compaction::Byte => M_LATCH_BYTE,
        }
    }

    /// Exact number of codewords the mode's encoder appends for `run`,
    /// latch excluded.
    pub fn codeword_count(self, run: &[u8]) -> Result<usize, InputError> {
        Ok(match self {
            Compaction::Numeric => run.chunks(NUMERIC_GROUP).map(|g| g.len() / 3 + 1).sum(),
            Compaction::Byte => run.len() / 6 * 5 + run.len() % 6,
            Compaction::Text => text_codeword_count(run, &plan_text(run)?),
        })
    }

    /// Appends the codewords of `run` and returns how many were appended.
    pub fn encode(self, run: &[u8], out: &mut Vec<u16>) -> Result<usize, crate::Error> {
        Ok(match self {
            Compaction::Text => encode_text(run, out)?,
            Compaction::Numeric => encode_numeric(run, out)?,
            Compaction::Byte => encode_bytes(run, out),
        })
    }
}

/// Costs in 1/132 of a codeword: text packs two characters per codeword,
/// bytes six per five codewords and digits 44 per 15 codewords.
const CW_COST: u32 = 132;

/// Cost table of the three compaction modes. Text compaction is the mode a
/// symbol starts in.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactionCosts;

impl CostModel for CompactionCosts {
    type Mode = Compaction;

    fn modes(&self) -> &[Compaction] {
        &[Compaction::Text, Compaction::Numeric, Compaction::Byte]
    }

    fn unit_cost(&self, mode: Compaction, unit: u8) -> Option<u32> {
        match mode {
            Compaction::Text if is_text(unit) => Some(CW_COST / 2),
            // M_SHIFT_BYTE plus the byte itself
            Compaction::Text => Some(CW_COST * 2),
            Compaction::Numeric if unit.is_ascii_digit() => Some(CW_COST * 15 / 44),
            Compaction::Numeric => None,
            Compaction::Byte => Some(CW_COST * 5 / 6),
        }
    }

    fn entry_cost(&self, mode: Compaction) -> u32 {
        if mode == Compaction::Text { 0 } else { CW_COST }
    }

    fn latch_cost(&self, _from: Compaction, _to: Compaction) -> u32 {
        CW_COST
    }
}

/// Splits content into text, numeric and byte compaction runs.
pub fn segment(content: &[u8]) -> Result<Segmentation<Compaction>, InputError> {
    segment::segment(&CompactionCosts, content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMode {
    Alpha,
    Lower,
    Mixed,
    Punct,
}

const SPACE: u8 = 26;
const AS: u8 = 27; // alpha shift, lower only
const PS: u8 = 29; // punctuation shift

fn value_in(mode: SubMode, c: u8) -> Option<u8> {
    match mode {
        SubMode::Alpha if c.is_ascii_uppercase() => Some(c - b'A'),
        SubMode::Lower if c.is_ascii_lowercase() => Some(c - b'a'),
        SubMode::Mixed if c.is_ascii_digit() => Some(c - b'0'),
        SubMode::Alpha | SubMode::Lower | SubMode::Mixed if c == b' ' => Some(SPACE),
        SubMode::Mixed => MIXED_CHAR_SET.iter().position(|&r| r == c).map(|p| p as u8 + 10),
        SubMode::Punct => PUNC_CHAR_SET.iter().position(|&r| r == c).map(|p| p as u8),
        _ => None,
    }
}

/// Whether `c` has a value in one of the text compaction sub-modes.
pub fn is_text(c: u8) -> bool {
    [SubMode::Alpha, SubMode::Lower, SubMode::Mixed, SubMode::Punct]
        .into_iter()
        .any(|mode| value_in(mode, c).is_some())
}

/// Values switching the text sub-mode for good.
fn latch_sequence(from: SubMode, to: SubMode) -> &'static [u8] {
    use SubMode::*;
    match (from, to) {
        (Alpha, Lower) => &[27],
        (Alpha, Mixed) => &[28],
        (Alpha, Punct) => &[28, 25],
        (Lower, Alpha) => &[28, 28],
        (Lower, Mixed) => &[28],
        (Lower, Punct) => &[28, 25],
        (Mixed, Alpha) => &[28],
        (Mixed, Lower) => &[27],
        (Mixed, Punct) => &[25],
        (Punct, Alpha) => &[29],
        (Punct, Lower) => &[29, 27],
        (Punct, Mixed) => &[29, 28],
        _ => &[],
    }
}

/// How a character is written while `mode` is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextUnit {
    Value(u8),
    Shift(u8, u8),
    Byte(u8),
}

fn text_unit(mode: SubMode, c: u8) -> Option<TextUnit> {
    if let Some(v) = value_in(mode, c) {
        return Some(TextUnit::Value(v));
    }
    if mode == SubMode::Lower && c.is_ascii_uppercase() {
        return Some(TextUnit::Shift(AS, c - b'A'));
    }
    if mode != SubMode::Punct {
        if let Some(v) = value_in(SubMode::Punct, c) {
            return Some(TextUnit::Shift(PS, v));
        }
    }
    if !is_text(c) {
        return Some(TextUnit::Byte(c));
    }
    None
}

/// Sub-mode costs in text values (half codewords).
#[derive(Debug, Clone, Copy, Default)]
pub struct SubModeCosts;

impl CostModel for SubModeCosts {
    type Mode = SubMode;

    fn modes(&self) -> &[SubMode] {
        &[SubMode::Alpha, SubMode::Lower, SubMode::Mixed, SubMode::Punct]
    }

    fn unit_cost(&self, mode: SubMode, unit: u8) -> Option<u32> {
        text_unit(mode, unit).map(|u| match u {
            TextUnit::Value(_) => 1,
            TextUnit::Shift(..) => 2,
            TextUnit::Byte(_) => 4,
        })
    }

    fn entry_cost(&self, mode: SubMode) -> u32 {
        latch_sequence(SubMode::Alpha, mode).len() as u32
    }

    fn latch_cost(&self, from: SubMode, to: SubMode) -> u32 {
        latch_sequence(from, to).len() as u32
    }
}

fn plan_text(run: &[u8]) -> Result<Vec<Segment<SubMode>>, InputError> {
    Ok(segment::segment(&SubModeCosts, run)?.segments)
}

/// Codewords needed by a planned text run: values pair up into codewords,
/// every shifted byte closes the pending pair and takes two codewords.
fn text_codeword_count(run: &[u8], plan: &[Segment<SubMode>]) -> usize {
    let mut codewords = 0;
    let mut values = 0;
    let mut mode = SubMode::Alpha;
    for seg in plan {
        values += latch_sequence(mode, seg.mode).len();
        mode = seg.mode;
        for &c in &run[seg.range()] {
            match text_unit(mode, c) {
                Some(TextUnit::Value(_)) => values += 1,
                Some(TextUnit::Shift(..)) => values += 2,
                Some(TextUnit::Byte(_)) | None => {
                    codewords += values.div_ceil(2) + 2;
                    values = 0;
                }
            }
        }
    }
    codewords + values.div_ceil(2)
}

/// Packs text values two per codeword (`30 * high + low`).
struct TextPacker<'a> {
    out: &'a mut Vec<u16>,
    pending: Option<u16>,
}

impl<'a> TextPacker<'a> {
    fn push(&mut self, value: u8) {
        match self.pending.take() {
            Some(high) => self.out.push(high * 30 + value as u16),
            None => self.pending = Some(value as u16),
        }
    }

    /// Completes a half-filled codeword with a punctuation shift.
    fn flush(&mut self) {
        if self.pending.is_some() {
            self.push(PS);
        }
    }

    fn push_raw(&mut self, codeword: u16) {
        self.flush();
        self.out.push(codeword);
    }
}

/// Appends a text compaction run. The run starts in the alpha sub-mode,
/// which is where a symbol or a text latch leaves the decoder.
pub fn encode_text(run: &[u8], out: &mut Vec<u16>) -> Result<usize, crate::Error> {
    let plan = plan_text(run)?;
    let start = out.len();
    let mut packer = TextPacker { out: &mut *out, pending: None };
    let mut mode = SubMode::Alpha;

    for seg in &plan {
        for &v in latch_sequence(mode, seg.mode) {
            packer.push(v);
        }
        mode = seg.mode;

        for &c in &run[seg.range()] {
            match text_unit(mode, c) {
                Some(TextUnit::Value(v)) => packer.push(v),
                Some(TextUnit::Shift(shift, v)) => {
                    packer.push(shift);
                    packer.push(v);
                }
                Some(TextUnit::Byte(b)) => {
                    packer.push_raw(M_SHIFT_BYTE);
                    packer.out.push(b as u16);
                }
                None => return Err(InternalError::UnplannedByte(c).into()),
            }
        }
    }
    packer.flush();

    Ok(out.len() - start)
}

/// Appends numeric compaction groups for an ASCII digit run.
pub fn encode_numeric(digits: &[u8], out: &mut Vec<u16>) -> Result<usize, InternalError> {
    debug_assert!(digits.iter().all(u8::is_ascii_digit));
    let start = out.len();

    for group in digits.chunks(NUMERIC_GROUP) {
        // Append a leading 1 to the number to do the base 900 conversion.
        let mut number = [b'1'; NUMERIC_GROUP + 1];
        number[1..=group.len()].copy_from_slice(group);

        let mut b = U160::zero();
        {
            let mut p0 = U160::zero();
            let mut p1 = U160::zero();
            b.bytes_radix_(None, &number[..=group.len()], 10, &mut p0, &mut p1)
                .map_err(|_| InternalError::NumericConversion)?;
        }

        let nb = group.len() / 3 + 1;
        let at = out.len();
        out.resize(at + nb, 0);

        let mut count = 0;
        while !b.is_zero() {
            if count == nb {
                return Err(InternalError::NumericConversion);
            }
            let r = b.digit_udivide_inplace_(900).expect("900 > 0");
            out[at + nb - count - 1] = r as u16;
            count += 1;
        }
    }

    Ok(out.len() - start)
}

/// Appends a byte compaction run: six bytes become five base 900 codewords,
/// leftovers are written one per codeword.
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u16>) -> usize {
    let start = out.len();
    let mut chunks = bytes.chunks_exact(6);

    for chunk in chunks.by_ref() {
        // pack six bytes
        let mut s: u64 = chunk.iter().fold(0, |s, &b| (s << 8) + b as u64);
        // append five codewords
        let at = out.len();
        out.resize(at + 5, 0);
        for n in 0..5 {
            out[at + 4 - n] = (s % 900) as u16;
            s /= 900;
        }
    }

    // remaining
    out.extend(chunks.remainder().iter().map(|&b| b as u16));
    out.len() - start
}

/// Appends the ECI designator for `eci`.
pub fn encode_eci(eci: u32, out: &mut Vec<u16>) {
    if eci < 900 {
        out.extend([ECI_CODE_PAGE, eci as u16]);
    } else if eci < 810_900 {
        out.extend([ECI_GENERAL_ID, (eci / 900 - 1) as u16, (eci % 900) as u16]);
    } else {
        out.extend([ECI_CUSTOM_ID, (eci - 810_900) as u16]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Vec<u16> {
        let mut out = Vec::new();
        let n = encode_text(s.as_bytes(), &mut out).unwrap();
        assert_eq!(n, out.len());
        assert_eq!(n, Compaction::Text.codeword_count(s.as_bytes()).unwrap(), "{s}");
        out
    }

    fn numeric(s: &str) -> Vec<u16> {
        let mut out = Vec::new();
        let n = encode_numeric(s.as_bytes(), &mut out).unwrap();
        assert_eq!(n, Compaction::Numeric.codeword_count(s.as_bytes()).unwrap());
        out
    }

    #[test]
    fn test_encode_text_simple() {
        assert_eq!(text("Test"), [19 * 30 + 27, 4 * 30 + 18, 19 * 30 + 29]);
    }

    #[test]
    fn test_encode_text_mixed_digits() {
        assert_eq!(text("abc1D234"), [27 * 30 + 0, 1 * 30 + 2, 28 * 30 + 1, 28 * 30 + 3, 28 * 30 + 2, 3 * 30 + 4]);
    }

    #[test]
    fn test_encode_text_with_digits() {
        assert_eq!(text("encoded 0123456789 as digits"), [
            27 * 30 + 4, 13 * 30 + 2, 14 * 30 + 3, 4 * 30 + 3, 28 * 30 + 26, 0 * 30 + 1, 2 * 30 + 3, 4 * 30 + 5, 6 * 30 + 7, 8 * 30 + 9,
            26 * 30 + 27, 0 * 30 + 18, 26 * 30 + 3, 8 * 30 + 6, 8 * 30 + 19, 18 * 30 + 29
        ]);
    }

    #[test]
    fn test_encode_text_punctuation_shift() {
        // T h i s ps ! space
        assert_eq!(text("This! "), [19 * 30 + 27, 7 * 30 + 8, 18 * 30 + 29, 10 * 30 + 26]);
    }

    #[test]
    fn test_encode_text_punctuation_latch() {
        // ml pl ; < > @ al A
        assert_eq!(text(";<>@A"), [28 * 30 + 25, 0 * 30 + 1, 2 * 30 + 3, 29 * 30 + 0]);
    }

    #[test]
    fn test_encode_text_alpha_shift() {
        // ll a b as C d
        assert_eq!(text("abCd"), [27 * 30 + 0, 1 * 30 + 27, 2 * 30 + 3]);
    }

    #[test]
    fn test_encode_text_byte_shift() {
        assert_eq!(text("A\x1BB"), [0 * 30 + 29, 913, 0x1B, 1 * 30 + 29]);
    }

    #[test]
    fn test_encode_numeric() {
        assert_eq!(numeric("12345678987654321"), [190, 232, 499, 20, 504, 721]);
    }

    #[test]
    fn test_encode_numeric_big() {
        //                    [                        p1                  ][ p2 ]
        assert_eq!(numeric("123456789876543211234567898765432112345678987654321"),
            [491, 81, 137, 725, 651, 455, 511, 858, 135, 138, 488, 568, 447, 553, 198, /* p2 */ 21, 715, 821]);
    }

    #[test]
    fn test_encode_numeric_44_digits() {
        let digits = "1".repeat(NUMERIC_GROUP);
        assert_eq!(numeric(&digits).len(), 15);
        assert_eq!(&numeric(&"0".repeat(NUMERIC_GROUP))[..3], [437, 111, 716]);
    }

    #[test]
    fn test_encode_numeric_leading_zeros() {
        assert_eq!(numeric("00000"), [111, 100]);
        assert_eq!(numeric("3"), [13]);
    }

    #[test]
    fn test_encode_bytes_multiple() {
        let mut out = Vec::new();
        assert_eq!(encode_bytes(b"alcool", &mut out), 5);
        assert_eq!(out, [163, 238, 432, 766, 244]);
        assert_eq!(Compaction::Byte.latch(6), M_LATCH_BYTE_M6);
    }

    #[test]
    fn test_encode_bytes_not_multiple() {
        let mut out = Vec::new();
        assert_eq!(encode_bytes(b"encode bin", &mut out), 9);
        assert_eq!(out, [169, 883, 224, 680, 517, 32, 98, 105, 110]);
        assert_eq!(Compaction::Byte.latch(10), M_LATCH_BYTE);
        assert_eq!(Compaction::Byte.codeword_count(b"encode bin").unwrap(), 9);
    }

    #[test]
    fn test_encode_eci() {
        let mut out = Vec::new();
        encode_eci(26, &mut out);
        encode_eci(1000, &mut out);
        encode_eci(811_799, &mut out);
        assert_eq!(out, [927, 26, 926, 0, 100, 925, 899]);
    }

    #[test]
    fn test_segment_digits_threshold() {
        let short = segment(b"ABC123456789012DEF").unwrap();
        assert_eq!(short.segments.len(), 1);

        let long = segment(b"ABC1234567890123DEF").unwrap();
        let modes: Vec<_> = long.segments.iter().map(|s| s.mode).collect();
        assert_eq!(modes, [Compaction::Text, Compaction::Numeric, Compaction::Text]);
        assert_eq!(long.segments[1].range(), 3..16);
    }

    #[test]
    fn test_segment_binary_run() {
        let seg = segment(&[0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86]).unwrap();
        assert_eq!(seg.segments.len(), 1);
        assert_eq!(seg.segments[0].mode, Compaction::Byte);
    }
}
