//! Codeword stream assembly: compaction, control codewords, dimensions,
//! padding and error correction.

use tracing::{debug, instrument, trace};

use crate::content::{Charset, Content, DEFAULT_ECI};
use crate::ecc::{ecc_count, generate_ecc};
use crate::error::{InputError, InternalError, Result};
use crate::segment::Segment;
use super::builder::{MAX_CODEWORDS, MAX_COLS, MAX_ROWS, MIN_COLS, MIN_ROWS};
use super::high_level::{
    self, encode_eci, encode_numeric, encode_text, Compaction, CW_PADDING, MACRO_BLOCK_START,
    MACRO_OPTIONAL_FIELD, MACRO_TERMINATOR, READER_INIT,
};
use super::options::{Pdf417Mode, Pdf417Options, StructuredAppend};

/// Macro PDF417 optional field designators.
const FIELD_FILE_NAME: u16 = 0;
const FIELD_SEGMENT_COUNT: u16 = 1;

/// Result of assembling one symbol's codewords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// Data codewords (length descriptor first) followed by error correction.
    pub codewords: Vec<u16>,
    pub rows: u8,
    pub cols: u8,
    pub level: u8,
    /// Value of the length descriptor: data codewords including padding.
    pub data_len: usize,
    pub padding: usize,
    pub segments: Vec<Segment<Compaction>>,
}

impl Assembly {
    #[inline]
    pub fn data(&self) -> &[u16] {
        &self.codewords[..self.data_len]
    }

    #[inline]
    pub fn ecc(&self) -> &[u16] {
        &self.codewords[self.data_len..]
    }
}

/// Error correction level recommended for `data` codewords.
pub fn recommended_level(data: usize) -> u8 {
    match data {
        0..=40 => 2,
        41..=160 => 3,
        161..=320 => 4,
        _ => 5,
    }
}

/// Module width of a row with `cols` data columns.
pub fn row_width(mode: Pdf417Mode, cols: u8) -> usize {
    let overhead = match mode {
        Pdf417Mode::Normal => 69,
        Pdf417Mode::Truncated => 35,
    };
    overhead + 17 * cols as usize
}

/// Every `(cols, rows)` the options allow, columns ascending then rows
/// ascending.
fn candidates(options: &Pdf417Options) -> impl Iterator<Item = (u8, u8)> {
    let cols = options.columns().map_or(MIN_COLS..=MAX_COLS, |c| c..=c);
    let rows = options.rows().map_or(MIN_ROWS..=MAX_ROWS, |r| r..=r);
    cols.flat_map(move |c| rows.clone().map(move |r| (c, r)))
        .filter(|&(c, r)| c as usize * r as usize <= MAX_CODEWORDS)
}

/// Largest number of codewords any allowed layout holds.
pub fn max_slots(options: &Pdf417Options) -> usize {
    candidates(options).map(|(c, r)| c as usize * r as usize).max().unwrap_or(0)
}

/// Smallest layout (in modules) holding `total` codewords, ties to the first
/// candidate.
fn choose_dimensions(options: &Pdf417Options, total: usize) -> Option<(u8, u8)> {
    let mut best: Option<(usize, (u8, u8))> = None;
    for (c, r) in candidates(options) {
        if (c as usize * r as usize) < total {
            continue;
        }
        let area = row_width(options.mode(), c) * r as usize;
        if best.map_or(true, |(a, _)| area < a) {
            best = Some((area, (c, r)));
        }
    }
    best.map(|(_, dims)| dims)
}

/// Appends the Macro PDF417 control block of `sa`.
fn macro_block(sa: &StructuredAppend, out: &mut Vec<u16>) -> Result<()> {
    out.push(MACRO_BLOCK_START);
    encode_numeric(format!("{:05}", sa.position() - 1).as_bytes(), out)?;
    out.push(sa.file_id());

    if let Some(name) = sa.file_name() {
        out.extend([MACRO_OPTIONAL_FIELD, FIELD_FILE_NAME]);
        encode_text(&Charset::UsAscii.encode(name)?, out)?;
    }
    if sa.include_segment_count() {
        out.extend([MACRO_OPTIONAL_FIELD, FIELD_SEGMENT_COUNT]);
        encode_numeric(format!("{:05}", sa.total()).as_bytes(), out)?;
    }
    if sa.is_last() {
        out.push(MACRO_TERMINATOR);
    }
    Ok(())
}

fn join(codewords: &[u16]) -> String {
    codewords.iter().map(u16::to_string).collect::<Vec<_>>().join(" ")
}

/// Builds the full codeword stream of one symbol and records the encode
/// information lines in `info`.
#[instrument(level = "debug", skip_all, fields(len = content.len(), eci = content.eci()))]
pub fn assemble(content: &Content, options: &Pdf417Options, info: &mut Vec<String>) -> Result<Assembly> {
    options.validate()?;
    if content.is_empty() {
        return Err(InputError::EmptyContent.into());
    }
    // 920 is reserved for composite linkage, PDF417 itself has no GS1 mode
    if content.is_gs1() {
        return Err(InputError::invalid("gs1", true, "PDF417 cannot carry GS1 data").into());
    }

    let segmentation = high_level::segment(content.bytes())?;
    debug!(segments = segmentation.segments.len(), cost = segmentation.cost, "segmented");

    // length descriptor, filled in once the dimensions are known
    let mut data = vec![0u16];
    if options.reader_init() {
        data.push(READER_INIT);
    }
    if content.eci() != DEFAULT_ECI {
        encode_eci(content.eci(), &mut data);
    }

    let mut current = Compaction::Text;
    for seg in &segmentation.segments {
        let run = &content.bytes()[seg.range()];
        if seg.mode != current {
            data.push(seg.mode.latch(seg.len));
            current = seg.mode;
        }
        let expected = seg.mode.codeword_count(run)?;
        let actual = seg.mode.encode(run, &mut data)?;
        trace!(mode = seg.mode.name(), start = seg.start, len = seg.len, codewords = actual, "compacted");
        if actual != expected {
            return Err(InternalError::CodewordCountMismatch { mode: seg.mode.name(), expected, actual }.into());
        }
    }

    let mut control = Vec::new();
    if let Some(sa) = options.structured_append().filter(|sa| sa.total() > 1) {
        macro_block(sa, &mut control)?;
    }

    let needed = data.len() + control.len();
    let slots = max_slots(options);
    let level = match options.ecc_level() {
        Some(level) => level,
        None => {
            let mut level = recommended_level(needed);
            while level > 0 && needed + ecc_count(level) > slots {
                level -= 1;
            }
            level
        }
    };

    let ecc = ecc_count(level);
    let exceeded = || InputError::CapacityExceeded {
        length: content.len(),
        needed,
        max: slots.saturating_sub(ecc),
    };
    if needed + ecc > slots {
        return Err(exceeded().into());
    }
    let (cols, rows) = choose_dimensions(options, needed + ecc).ok_or_else(exceeded)?;

    let data_len = rows as usize * cols as usize - ecc;
    let padding = data_len - needed;
    data.resize(data.len() + padding, CW_PADDING);
    data.extend_from_slice(&control);
    if data.len() != data_len {
        return Err(InternalError::CapacityMismatch { expected: data_len, actual: data.len() }.into());
    }
    data[0] = u16::try_from(data_len).map_err(|_| InternalError::InvalidField("length descriptor"))?;

    info.push(format!("ECI Mode: {}", content.eci()));
    info.push(format!("ECI Charset: {}", content.charset_name()));
    info.push(format!(
        "Compaction Modes: {}",
        segmentation.segments.iter().map(|s| format!("{}({})", s.mode.name(), s.len)).collect::<Vec<_>>().join(" ")
    ));
    info.push(format!("Columns: {cols}"));
    info.push(format!("Rows: {rows}"));
    info.push(format!("ECC Level: {level}"));
    info.push(format!("Codewords: {}", join(&data)));
    info.push(format!("Padding Codewords: {padding}"));
    info.push(format!("ECC Codewords: {ecc}"));

    generate_ecc(&mut data, level)?;
    if data.len() != rows as usize * cols as usize {
        return Err(InternalError::CapacityMismatch { expected: rows as usize * cols as usize, actual: data.len() }.into());
    }
    debug!(cols, rows, level, data_len, padding, "assembled");

    Ok(Assembly { codewords: data, rows, cols, level, data_len, padding, segments: segmentation.segments })
}
