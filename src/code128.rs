//! Code 128 (ISO/IEC 15417), including GS1-128.
//!
//! Code set selection runs through the shared [segmenter](crate::segment)
//! with costs counted in half symbol characters, so that a code set C digit
//! costs one unit and any other character two.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::content::{Content, DEFAULT_ECI};
use crate::error::{InputError, InternalError, Result};
use crate::placement::ModuleGrid;
use crate::segment::{self, CostModel, Segment};
use crate::symbol::Encoded;

/// Longest content accepted, in bytes.
pub const MAX_LENGTH: usize = 160;

const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const FNC1: u8 = 102;
const CODE_A: u8 = 101;
const CODE_B: u8 = 100;
const CODE_C: u8 = 99;
const FNC4_A: u8 = 101;
const FNC4_B: u8 = 100;

const GROUP_SEPARATOR: u8 = 0x1D;

const STOP: &str = "2331112";

/// Bar/space widths of symbol values 0 to 105.
const PATTERNS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312",
    "132212", "221213", "221312", "231212", "112232", "122132", "122231", "113222",
    "123122", "123221", "223211", "221132", "221231", "213212", "223112", "312131",
    "311222", "321122", "321221", "312212", "322112", "322211", "212123", "212321",
    "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121",
    "313121", "211331", "231131", "213113", "213311", "213131", "311123", "311321",
    "331121", "312113", "312311", "332111", "314111", "221411", "431111", "111224",
    "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112",
    "421211", "212141", "214121", "412121", "111143", "111341", "131141", "114113",
    "114311", "411113", "411311", "113141", "114131", "311141", "411131", "211412",
    "211214", "211232",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    pub const fn name(self) -> &'static str {
        match self {
            CodeSet::A => "A",
            CodeSet::B => "B",
            CodeSet::C => "C",
        }
    }

    const fn start(self) -> u8 {
        match self {
            CodeSet::A => START_A,
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }
    }

    /// Value switching into this code set.
    const fn code(self) -> u8 {
        match self {
            CodeSet::A => CODE_A,
            CodeSet::B => CODE_B,
            CodeSet::C => CODE_C,
        }
    }
}

/// Code set costs in half symbol characters. In GS1 mode the group
/// separator stands for FNC1, which every code set carries as one symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeSetCosts {
    pub gs1: bool,
}

impl CostModel for CodeSetCosts {
    type Mode = CodeSet;

    fn modes(&self) -> &[CodeSet] {
        &[CodeSet::B, CodeSet::C, CodeSet::A]
    }

    fn unit_cost(&self, mode: CodeSet, unit: u8) -> Option<u32> {
        if self.gs1 && unit == GROUP_SEPARATOR {
            return Some(2);
        }
        match (mode, unit) {
            (CodeSet::A, 0..=95) | (CodeSet::B, 32..=127) => Some(2),
            // FNC4 then the low half
            (CodeSet::A, 128..=223) | (CodeSet::B, 160..=255) => Some(4),
            (CodeSet::C, b'0'..=b'9') => Some(1),
            _ => None,
        }
    }

    fn entry_cost(&self, _mode: CodeSet) -> u32 {
        0
    }

    fn latch_cost(&self, _from: CodeSet, _to: CodeSet) -> u32 {
        2
    }

    fn run_step(&self, mode: CodeSet) -> usize {
        if mode == CodeSet::C { 2 } else { 1 }
    }

    fn whole_step(&self, _mode: CodeSet, unit: u8) -> bool {
        self.gs1 && unit == GROUP_SEPARATOR
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Code128Options {
    bar_height: u16,
}

impl Default for Code128Options {
    fn default() -> Self {
        Self { bar_height: 50 }
    }
}

impl Code128Options {
    /// Bar height in modules.
    #[inline]
    pub fn bar_height(&self) -> u16 {
        self.bar_height
    }

    pub fn set_bar_height(&mut self, bar_height: u16) -> Result<&mut Self, InputError> {
        check_bar_height(bar_height)?;
        self.bar_height = bar_height;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        check_bar_height(self.bar_height)
    }
}

fn check_bar_height(bar_height: u16) -> Result<(), InputError> {
    if bar_height == 0 {
        Err(InputError::invalid("bar_height", bar_height, "must be at least 1"))
    } else {
        Ok(())
    }
}

fn push_value(set: CodeSet, unit: u8, gs1: bool, out: &mut Vec<u8>) -> Result<(), InternalError> {
    if gs1 && unit == GROUP_SEPARATOR {
        out.push(FNC1);
        return Ok(());
    }
    let (low, fnc4) = if unit >= 128 { (unit - 128, true) } else { (unit, false) };
    match set {
        CodeSet::A if low < 96 => {
            if fnc4 {
                out.push(FNC4_A);
            }
            out.push(if low < 32 { low + 64 } else { low - 32 });
        }
        CodeSet::B if low >= 32 => {
            if fnc4 {
                out.push(FNC4_B);
            }
            out.push(low - 32);
        }
        _ => return Err(InternalError::UnplannedByte(unit)),
    }
    Ok(())
}

/// Symbol values of `segments`, start character first, check value
/// excluded.
pub fn symbol_values(bytes: &[u8], segments: &[Segment<CodeSet>], gs1: bool) -> Result<Vec<u8>, InternalError> {
    let mut values = Vec::with_capacity(bytes.len() + 2);
    for (k, seg) in segments.iter().enumerate() {
        if k == 0 {
            values.push(seg.mode.start());
            if gs1 {
                values.push(FNC1);
            }
        } else {
            values.push(seg.mode.code());
        }

        let run = &bytes[seg.range()];
        match seg.mode {
            CodeSet::C => {
                let mut rest = run;
                loop {
                    rest = match rest {
                        [] => break,
                        [GROUP_SEPARATOR, tail @ ..] if gs1 => {
                            values.push(FNC1);
                            tail
                        }
                        [tens @ b'0'..=b'9', units @ b'0'..=b'9', tail @ ..] => {
                            values.push((tens - b'0') * 10 + (units - b'0'));
                            tail
                        }
                        _ => return Err(InternalError::InvalidField("unpaired digit in code set C")),
                    };
                }
            }
            set => {
                for &unit in run {
                    push_value(set, unit, gs1, &mut values)?;
                }
            }
        }
    }
    Ok(values)
}

/// Modulo 103 check value: start value plus each value weighted by its
/// position.
pub fn check_value(values: &[u8]) -> u8 {
    let sum = values
        .iter()
        .enumerate()
        .map(|(i, &v)| i.max(1) as u32 * v as u32)
        .sum::<u32>();
    (sum % 103) as u8
}

/// Run-length pattern of the complete symbol, stop pattern included.
pub fn pattern(values: &[u8]) -> Result<String, InternalError> {
    let mut out = String::with_capacity(values.len() * 6 + STOP.len());
    for &v in values {
        let element = PATTERNS
            .get(v as usize)
            .ok_or(InternalError::CodewordOutOfRange { value: v as u32, size: PATTERNS.len() as u32 })?;
        out.push_str(element);
    }
    out.push_str(STOP);
    Ok(out)
}

#[instrument(level = "debug", skip_all, fields(len = content.len()))]
pub fn encode(content: &Content, options: &Code128Options) -> Result<Encoded> {
    options.validate()?;
    if content.is_empty() {
        return Err(InputError::EmptyContent.into());
    }
    if content.len() > MAX_LENGTH {
        return Err(InputError::ContentTooLong { length: content.len(), max: MAX_LENGTH }.into());
    }
    if content.eci() != DEFAULT_ECI {
        return Err(InputError::invalid("eci", content.eci(), "Code 128 only encodes ISO-8859-1").into());
    }

    let gs1 = content.is_gs1();
    let segmentation = segment::segment(&CodeSetCosts { gs1 }, content.bytes())?;
    let mut values = symbol_values(content.bytes(), &segmentation.segments, gs1)?;
    let check = check_value(&values);
    values.push(check);

    let pattern = pattern(&values)?;
    let grid = ModuleGrid::from_pattern(&pattern, options.bar_height() as usize)?;
    debug!(values = values.len(), width = grid.width(), "encoded");

    let info = vec![
        format!(
            "Code Sets: {}",
            segmentation.segments.iter().map(|s| format!("{}({})", s.mode.name(), s.len)).collect::<Vec<_>>().join(" ")
        ),
        format!("Symbol Values: {}", values.iter().map(u8::to_string).collect::<Vec<_>>().join(" ")),
        format!("Check Digit: {check}"),
    ];

    Ok(Encoded::new(grid, None, Some(vec![pattern]), info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Input;
    use crate::error::Error;

    fn values(s: &[u8], gs1: bool) -> Vec<u8> {
        let seg = segment::segment(&CodeSetCosts { gs1 }, s).unwrap();
        let mut values = symbol_values(s, &seg.segments, gs1).unwrap();
        values.push(check_value(&values));
        values
    }

    #[test]
    fn test_patterns_are_eleven_modules() {
        for p in PATTERNS {
            let widths: Vec<u32> = p.chars().filter_map(|c| c.to_digit(10)).collect();
            assert_eq!(widths.iter().sum::<u32>(), 11, "{p}");
            assert_eq!((widths[0] + widths[2] + widths[4]) % 2, 0, "{p}");
        }
    }

    #[test]
    fn test_code_set_b() {
        assert_eq!(values(b"Hello", false), [104, 40, 69, 76, 76, 79, 76]);
    }

    #[test]
    fn test_code_set_c() {
        assert_eq!(values(b"1234567890", false), [105, 12, 34, 56, 78, 90, 85]);
    }

    #[test]
    fn test_switch_to_c() {
        assert_eq!(values(b"AB1234", false), [104, 33, 34, 99, 12, 34, 102]);
    }

    #[test]
    fn test_odd_digits() {
        assert_eq!(values(b"12345", false), [105, 12, 34, 100, 21, 54]);
    }

    #[test]
    fn test_fnc4() {
        assert_eq!(values(b"\xE9t\xE9", false), [104, 100, 73, 84, 100, 73, 28]);
    }

    #[test]
    fn test_gs1_128() {
        assert_eq!(
            values(b"010950110153000810ABC123", true),
            [105, 102, 1, 9, 50, 11, 1, 53, 0, 8, 10, 100, 33, 34, 35, 17, 18, 19, 8]
        );
    }

    #[test]
    fn test_gs1_separator_stays_in_code_set_c() {
        let seg = segment::segment(&CodeSetCosts { gs1: true }, b"101234\x1D215678").unwrap();
        assert_eq!(seg.segments.len(), 1);
        assert_eq!(seg.segments[0].mode, CodeSet::C);
        let v = values(b"101234\x1D215678", true);
        assert_eq!(v[..9], [105, 102, 10, 12, 34, 102, 21, 56, 78]);
        assert_eq!(v.len(), 10);

        // an odd digit count ahead of the separator starts in code set B
        let v = values(b"10123\x1D21", true);
        assert_eq!(v[..8], [START_B, FNC1, 17, CODE_C, 1, 23, FNC1, 21]);
        assert_eq!(v.len(), 9);
    }

    #[test]
    fn test_encode() {
        let content = Content::resolve(&Input::Text("Hello".into()), None, None).unwrap();
        let encoded = encode(&content, &Code128Options::default()).unwrap();
        let pattern = encoded.pattern().unwrap();
        assert_eq!(pattern, ["2112142311131122142211142211141341112211142331112"]);
        assert_eq!(encoded.width(), 90);
        assert_eq!(encoded.height(), 50);
        assert!(encoded.codewords().is_none());
        assert!(encoded.info().contains(&"Check Digit: 76".to_string()));
    }

    #[test]
    fn test_limits() {
        let long = Content::resolve(&Input::Bytes(vec![b'A'; MAX_LENGTH + 1]), None, None).unwrap();
        assert_eq!(
            encode(&long, &Code128Options::default()).unwrap_err(),
            Error::from(InputError::ContentTooLong { length: 161, max: 160 })
        );

        let utf8 = Content::resolve(&Input::Text("€".into()), None, None).unwrap();
        assert!(encode(&utf8, &Code128Options::default()).unwrap_err().is_input());
        assert!(Code128Options::default().set_bar_height(0).is_err());
    }
}
