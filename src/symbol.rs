//! The public encode request/result aggregate.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::code128::{self, Code128Options};
use crate::content::{self, Content, Input};
use crate::error::{InputError, Result};
use crate::pdf417::{self, Pdf417Options};
use crate::placement::ModuleGrid;

/// Separator inserted between variable-length GS1 fields, encoded as FNC1 by
/// the symbologies.
pub const GS1_SEPARATOR: u8 = 0x1D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Pdf417,
    Code128,
}

impl Symbology {
    pub const fn name(self) -> &'static str {
        match self {
            Symbology::Pdf417 => "PDF417",
            Symbology::Code128 => "Code 128",
        }
    }
}

/// Per-symbology configuration, one variant per supported symbology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "symbology", rename_all = "snake_case")]
pub enum Options {
    Pdf417(Pdf417Options),
    Code128(Code128Options),
}

impl Options {
    pub fn new(symbology: Symbology) -> Self {
        match symbology {
            Symbology::Pdf417 => Options::Pdf417(Pdf417Options::default()),
            Symbology::Code128 => Options::Code128(Code128Options::default()),
        }
    }

    pub fn symbology(&self) -> Symbology {
        match self {
            Options::Pdf417(_) => Symbology::Pdf417,
            Options::Code128(_) => Symbology::Code128,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        match self {
            Options::Pdf417(o) => o.validate(),
            Options::Code128(o) => o.validate(),
        }
    }
}

impl From<Pdf417Options> for Options {
    fn from(options: Pdf417Options) -> Self {
        Options::Pdf417(options)
    }
}

impl From<Code128Options> for Options {
    fn from(options: Code128Options) -> Self {
        Options::Code128(options)
    }
}

/// Everything an encode produces. Exactly one of [codewords](Self::codewords)
/// and [pattern](Self::pattern) is present, depending on the symbology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    grid: ModuleGrid,
    codewords: Option<Vec<u16>>,
    pattern: Option<Vec<String>>,
    info: Vec<String>,
}

impl Encoded {
    pub(crate) fn new(grid: ModuleGrid, codewords: Option<Vec<u16>>, pattern: Option<Vec<String>>, info: Vec<String>) -> Self {
        Self { grid, codewords, pattern, info }
    }

    /// Width in modules.
    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Height in modules.
    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[inline]
    pub fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// Codeword trace, `None` for symbologies whose pattern is authoritative.
    pub fn codewords(&self) -> Option<&[u16]> {
        self.codewords.as_deref()
    }

    /// Run-length pattern, one string per row, `None` for symbologies whose
    /// codewords are authoritative.
    pub fn pattern(&self) -> Option<&[String]> {
        self.pattern.as_deref()
    }

    /// Encode information, one line per entry.
    pub fn info(&self) -> &[String] {
        &self.info
    }
}

/// Encodes resolved content with `options`.
pub fn encode(content: &Content, options: &Options) -> Result<Encoded> {
    match options {
        Options::Pdf417(o) => pdf417::encode(content, o),
        Options::Code128(o) => code128::encode(content, o),
    }
}

/// A symbol being configured and encoded. Every setter clears the previous
/// result, so results never outlive the configuration that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    input: Input,
    eci: Option<u32>,
    gs1: bool,
    options: Options,
    encoded: Option<Encoded>,
}

impl Symbol {
    pub fn new(symbology: Symbology) -> Self {
        Self::with_options(Options::new(symbology))
    }

    pub fn with_options(options: impl Into<Options>) -> Self {
        Self {
            input: Input::Text(String::new()),
            eci: None,
            gs1: false,
            options: options.into(),
            encoded: None,
        }
    }

    #[inline]
    pub fn symbology(&self) -> Symbology {
        self.options.symbology()
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Text content, converted to bytes with the ECI's character set.
    pub fn set_content(&mut self, text: impl Into<String>) -> &mut Self {
        self.input = Input::Text(text.into());
        self.encoded = None;
        self
    }

    /// Raw byte content, ISO-8859-1 unless an ECI says otherwise.
    pub fn set_content_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.input = Input::Bytes(bytes.into());
        self.encoded = None;
        self
    }

    #[inline]
    pub fn eci(&self) -> Option<u32> {
        self.eci
    }

    pub fn set_eci(&mut self, eci: Option<u32>) -> Result<&mut Self, InputError> {
        if let Some(eci) = eci {
            content::validate_eci(eci)?;
        }
        self.eci = eci;
        self.encoded = None;
        Ok(self)
    }

    /// Whether text content is GS1 application identifier syntax.
    #[inline]
    pub fn gs1(&self) -> bool {
        self.gs1
    }

    pub fn set_gs1(&mut self, gs1: bool) -> &mut Self {
        self.gs1 = gs1;
        self.encoded = None;
        self
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replaces the options after validating them.
    pub fn set_options(&mut self, options: impl Into<Options>) -> Result<&mut Self, InputError> {
        let options = options.into();
        options.validate()?;
        if options.symbology() != self.symbology() {
            return Err(InputError::invalid("symbology", options.symbology().name(), "fixed when the symbol is created"));
        }
        self.options = options;
        self.encoded = None;
        Ok(self)
    }

    /// Applies `f` to a copy of the options, keeping the change only if `f`
    /// and validation both succeed.
    pub fn configure<F>(&mut self, f: F) -> Result<&mut Self, InputError>
    where
        F: FnOnce(&mut Options) -> Result<(), InputError>,
    {
        let mut options = self.options.clone();
        f(&mut options)?;
        self.set_options(options)
    }

    /// [configure](Self::configure) for PDF417 symbols.
    pub fn configure_pdf417<F>(&mut self, f: F) -> Result<&mut Self, InputError>
    where
        F: FnOnce(&mut Pdf417Options) -> Result<(), InputError>,
    {
        self.configure(|options| match options {
            Options::Pdf417(o) => f(o),
            _ => Err(InputError::invalid("symbology", "pdf417", "not a PDF417 symbol")),
        })
    }

    /// [configure](Self::configure) for Code 128 symbols.
    pub fn configure_code128<F>(&mut self, f: F) -> Result<&mut Self, InputError>
    where
        F: FnOnce(&mut Code128Options) -> Result<(), InputError>,
    {
        self.configure(|options| match options {
            Options::Code128(o) => f(o),
            _ => Err(InputError::invalid("symbology", "code128", "not a Code 128 symbol")),
        })
    }

    /// Clears content, configuration and results, keeping the symbology.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new(self.symbology());
        self
    }

    /// Resolves the content against the current configuration.
    pub fn resolve_content(&self) -> Result<Content, InputError> {
        Content::resolve(&self.input, self.eci, self.gs1.then_some(GS1_SEPARATOR))
    }

    /// Encodes the current configuration. Encoding again without changing
    /// anything returns the same result.
    #[instrument(level = "debug", skip(self), fields(symbology = self.symbology().name()))]
    pub fn encode(&mut self) -> Result<&Encoded> {
        if self.encoded.is_none() {
            self.options.validate()?;
            let content = self.resolve_content()?;
            let encoded = encode(&content, &self.options)?;
            debug!(width = encoded.width(), height = encoded.height(), "symbol encoded");
            self.encoded = Some(encoded);
        }
        self.encoded().map_err(Into::into)
    }

    /// Result of the last [encode](Self::encode).
    pub fn encoded(&self) -> Result<&Encoded, InputError> {
        self.encoded.as_ref().ok_or(InputError::NotEncoded)
    }

    pub fn width(&self) -> Result<usize, InputError> {
        Ok(self.encoded()?.width())
    }

    pub fn height(&self) -> Result<usize, InputError> {
        Ok(self.encoded()?.height())
    }

    pub fn codewords(&self) -> Result<Option<&[u16]>, InputError> {
        Ok(self.encoded()?.codewords())
    }

    pub fn pattern(&self) -> Result<Option<&[String]>, InputError> {
        Ok(self.encoded()?.pattern())
    }

    pub fn info(&self) -> Result<&[String], InputError> {
        Ok(self.encoded()?.info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_results_require_encode() {
        let mut symbol = Symbol::new(Symbology::Pdf417);
        symbol.set_content("ABC");
        assert_eq!(symbol.width(), Err(InputError::NotEncoded));

        symbol.encode().unwrap();
        assert!(symbol.width().unwrap() > 0);
        assert!(symbol.codewords().unwrap().is_some());
        assert!(symbol.pattern().unwrap().is_none());
    }

    #[test]
    fn test_setters_clear_results() {
        let mut symbol = Symbol::new(Symbology::Code128);
        symbol.set_content("ABC");
        symbol.encode().unwrap();

        symbol.set_content("ABCD");
        assert!(symbol.encoded().is_err());
        symbol.encode().unwrap();

        symbol.configure_code128(|o| o.set_bar_height(10).map(drop)).unwrap();
        assert!(symbol.encoded().is_err());
        assert_eq!(symbol.encode().unwrap().height(), 10);
    }

    #[test]
    fn test_rejected_configuration_is_not_applied() {
        let mut symbol = Symbol::new(Symbology::Pdf417);
        symbol.set_content("ABC");
        symbol.encode().unwrap();

        let err = symbol
            .configure_pdf417(|o| {
                o.set_columns(Some(5))?;
                o.set_ecc_level(Some(12))?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidOption { option: "ecc_level", .. }));
        assert_eq!(symbol.options(), &Options::new(Symbology::Pdf417));
        // the previous result stays valid for the unchanged configuration
        assert!(symbol.encoded().is_ok());

        assert!(symbol.configure_code128(|_| Ok(())).is_err());
        assert!(symbol.set_eci(Some(1_000_000)).is_err());
    }

    #[test]
    fn test_failed_encode_leaves_no_result() {
        let mut symbol = Symbol::new(Symbology::Pdf417);
        assert_eq!(symbol.encode().unwrap_err(), Error::from(InputError::EmptyContent));
        assert!(symbol.encoded().is_err());
    }

    #[test]
    fn test_reset() {
        let mut symbol = Symbol::new(Symbology::Pdf417);
        symbol.set_content("ABC").set_gs1(true);
        symbol.configure_pdf417(|o| o.set_row_height(5).map(drop)).unwrap();
        symbol.reset();
        assert_eq!(symbol, Symbol::new(Symbology::Pdf417));
    }

    #[test]
    fn test_idempotent() {
        let mut symbol = Symbol::new(Symbology::Pdf417);
        symbol.set_content("Idempotent 12345678901234567890");
        let first = symbol.encode().unwrap().clone();
        let second = symbol.encode().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first, encode(&symbol.resolve_content().unwrap(), symbol.options()).unwrap());
    }
}
