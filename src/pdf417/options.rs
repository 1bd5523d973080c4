use serde::{Deserialize, Serialize};

use crate::ecc::MAX_LEVEL;
use crate::error::InputError;
use super::builder::{MAX_COLS, MAX_ROWS, MIN_COLS, MIN_ROWS, MAX_CODEWORDS};

/// Highest Macro PDF417 segment count (five decimal digits).
pub const MAX_SEGMENTS: u32 = 99_999;
/// Highest Macro PDF417 file id.
pub const MAX_FILE_ID: u16 = 899;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pdf417Mode {
    #[default]
    Normal,
    /// No right row indicator and a single module stop bar.
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pdf417Options {
    mode: Pdf417Mode,
    columns: Option<u8>,
    rows: Option<u8>,
    ecc_level: Option<u8>,
    row_height: u8,
    reader_init: bool,
    structured_append: Option<StructuredAppend>,
}

impl Default for Pdf417Options {
    fn default() -> Self {
        Self {
            mode: Pdf417Mode::Normal,
            columns: None,
            rows: None,
            ecc_level: None,
            row_height: 3,
            reader_init: false,
            structured_append: None,
        }
    }
}

impl Pdf417Options {
    #[inline]
    pub fn mode(&self) -> Pdf417Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Pdf417Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Data columns, `None` to pick them automatically.
    #[inline]
    pub fn columns(&self) -> Option<u8> {
        self.columns
    }

    pub fn set_columns(&mut self, columns: Option<u8>) -> Result<&mut Self, InputError> {
        check_columns(columns)?;
        check_area(columns, self.rows)?;
        self.columns = columns;
        Ok(self)
    }

    #[inline]
    pub fn rows(&self) -> Option<u8> {
        self.rows
    }

    pub fn set_rows(&mut self, rows: Option<u8>) -> Result<&mut Self, InputError> {
        check_rows(rows)?;
        check_area(self.columns, rows)?;
        self.rows = rows;
        Ok(self)
    }

    /// Error correction level, `None` for the recommended level.
    #[inline]
    pub fn ecc_level(&self) -> Option<u8> {
        self.ecc_level
    }

    pub fn set_ecc_level(&mut self, level: Option<u8>) -> Result<&mut Self, InputError> {
        check_level(level)?;
        self.ecc_level = level;
        Ok(self)
    }

    /// Height of each row in modules.
    #[inline]
    pub fn row_height(&self) -> u8 {
        self.row_height
    }

    pub fn set_row_height(&mut self, row_height: u8) -> Result<&mut Self, InputError> {
        check_row_height(row_height)?;
        self.row_height = row_height;
        Ok(self)
    }

    #[inline]
    pub fn reader_init(&self) -> bool {
        self.reader_init
    }

    pub fn set_reader_init(&mut self, reader_init: bool) -> &mut Self {
        self.reader_init = reader_init;
        self
    }

    #[inline]
    pub fn structured_append(&self) -> Option<&StructuredAppend> {
        self.structured_append.as_ref()
    }

    pub fn set_structured_append(&mut self, sa: Option<StructuredAppend>) -> Result<&mut Self, InputError> {
        if let Some(sa) = &sa {
            sa.validate()?;
        }
        self.structured_append = sa;
        Ok(self)
    }

    /// Re-checks every field, for options that did not go through the
    /// setters (deserialised ones).
    pub fn validate(&self) -> Result<(), InputError> {
        check_columns(self.columns)?;
        check_rows(self.rows)?;
        check_area(self.columns, self.rows)?;
        check_level(self.ecc_level)?;
        check_row_height(self.row_height)?;
        if let Some(sa) = &self.structured_append {
            sa.validate()?;
        }
        Ok(())
    }
}

fn check_columns(columns: Option<u8>) -> Result<(), InputError> {
    match columns {
        Some(c) if !(MIN_COLS..=MAX_COLS).contains(&c) => Err(InputError::invalid("columns", c, "must be between 1 and 30")),
        _ => Ok(()),
    }
}

fn check_rows(rows: Option<u8>) -> Result<(), InputError> {
    match rows {
        Some(r) if !(MIN_ROWS..=MAX_ROWS).contains(&r) => Err(InputError::invalid("rows", r, "must be between 3 and 90")),
        _ => Ok(()),
    }
}

fn check_area(columns: Option<u8>, rows: Option<u8>) -> Result<(), InputError> {
    match (columns, rows) {
        (Some(c), Some(r)) if c as usize * r as usize > MAX_CODEWORDS => {
            Err(InputError::invalid("rows", format!("{r}x{c}"), "a symbol holds at most 928 codewords"))
        }
        _ => Ok(()),
    }
}

fn check_level(level: Option<u8>) -> Result<(), InputError> {
    match level {
        Some(l) if l > MAX_LEVEL => Err(InputError::invalid("ecc_level", l, "must be between 0 and 8")),
        _ => Ok(()),
    }
}

fn check_row_height(row_height: u8) -> Result<(), InputError> {
    if row_height == 0 {
        Err(InputError::invalid("row_height", row_height, "must be at least 1"))
    } else {
        Ok(())
    }
}

/// Macro PDF417 parameters of one symbol in a linked sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAppend {
    position: u32,
    total: u32,
    file_id: u16,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    include_segment_count: bool,
}

impl StructuredAppend {
    /// Symbol `position` (1-based) of `total`, all sharing `file_id`.
    pub fn new(position: u32, total: u32, file_id: u16) -> Result<Self, InputError> {
        let sa = Self { position, total, file_id, file_name: None, include_segment_count: false };
        sa.validate()?;
        Ok(sa)
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Result<Self, InputError> {
        self.file_name = Some(file_name.into());
        self.validate()?;
        Ok(self)
    }

    pub fn with_segment_count(mut self, include: bool) -> Self {
        self.include_segment_count = include;
        self
    }

    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[inline]
    pub fn file_id(&self) -> u16 {
        self.file_id
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    #[inline]
    pub fn include_segment_count(&self) -> bool {
        self.include_segment_count
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.position == self.total
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if !(1..=MAX_SEGMENTS).contains(&self.total) {
            return Err(InputError::invalid("structured_append.total", self.total, "must be between 1 and 99999"));
        }
        if !(1..=self.total).contains(&self.position) {
            return Err(InputError::invalid("structured_append.position", self.position, "must be between 1 and the total"));
        }
        if self.file_id > MAX_FILE_ID {
            return Err(InputError::invalid("structured_append.file_id", self.file_id, "must be between 0 and 899"));
        }
        if let Some(name) = &self.file_name {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
                return Err(InputError::invalid("structured_append.file_name", name, "must be printable ASCII"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Pdf417Options::default();
        assert_eq!(options.mode(), Pdf417Mode::Normal);
        assert_eq!(options.row_height(), 3);
        assert_eq!(options.ecc_level(), None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut options = Pdf417Options::default();
        assert!(options.set_columns(Some(31)).is_err());
        assert!(options.set_rows(Some(2)).is_err());
        assert!(options.set_ecc_level(Some(9)).is_err());
        assert!(options.set_row_height(0).is_err());
        assert_eq!(options, Pdf417Options::default());

        let err = options.set_ecc_level(Some(9)).unwrap_err();
        assert_eq!(err.to_string(), "invalid value `9` for option `ecc_level`: must be between 0 and 8");
    }

    #[test]
    fn test_area_limit() {
        let mut options = Pdf417Options::default();
        options.set_columns(Some(30)).unwrap();
        assert!(options.set_rows(Some(31)).is_err());
        options.set_rows(Some(30)).unwrap();
        assert_eq!(options.rows(), Some(30));
    }

    #[test]
    fn test_structured_append() {
        assert!(StructuredAppend::new(0, 3, 1).is_err());
        assert!(StructuredAppend::new(4, 3, 1).is_err());
        assert!(StructuredAppend::new(1, 3, 900).is_err());
        assert!(StructuredAppend::new(1, 100_000, 1).is_err());

        let sa = StructuredAppend::new(3, 3, 17).unwrap().with_segment_count(true);
        assert!(sa.is_last());
        assert!(sa.clone().with_file_name("").is_err());
        assert_eq!(sa.with_file_name("data.bin").unwrap().file_name(), Some("data.bin"));
    }
}
