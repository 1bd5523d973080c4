//! Symbol content: the bytes handed to the encoders and the ECI that tells a
//! reader how to interpret them.

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::gs1;

/// ECI assumed by readers when none is given (ISO-8859-1).
pub const DEFAULT_ECI: u32 = 3;
/// Largest ECI designator.
pub const MAX_ECI: u32 = 811_799;

/// Character sets text content can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Iso8859_1,
    Utf8,
    UsAscii,
}

impl Charset {
    pub const fn eci(self) -> u32 {
        match self {
            Charset::Iso8859_1 => 3,
            Charset::Utf8 => 26,
            Charset::UsAscii => 27,
        }
    }

    pub const fn from_eci(eci: u32) -> Option<Self> {
        match eci {
            3 => Some(Charset::Iso8859_1),
            26 => Some(Charset::Utf8),
            27 => Some(Charset::UsAscii),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::Utf8 => "UTF-8",
            Charset::UsAscii => "US-ASCII",
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, InputError> {
        let limit = match self {
            Charset::Utf8 => return Ok(text.as_bytes().to_vec()),
            Charset::Iso8859_1 => 0xFF,
            Charset::UsAscii => 0x7F,
        };

        text.chars()
            .enumerate()
            .map(|(position, character)| {
                u8::try_from(character as u32)
                    .ok()
                    .filter(|&b| b as u32 <= limit)
                    .ok_or(InputError::UnencodableCharacter { character, position, charset: self.name() })
            })
            .collect()
    }
}

/// Content as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Text(String),
    Bytes(Vec<u8>),
}

impl Input {
    pub fn is_empty(&self) -> bool {
        match self {
            Input::Text(s) => s.is_empty(),
            Input::Bytes(b) => b.is_empty(),
        }
    }
}

/// Content resolved to bytes and an ECI, ready for segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    bytes: Vec<u8>,
    eci: u32,
    charset: Option<Charset>,
    gs1: bool,
}

impl Content {
    /// Resolves caller input. Text without an explicit ECI is encoded as
    /// ISO-8859-1 when possible and UTF-8 otherwise; bytes default to
    /// ISO-8859-1. GS1 input must be text in the default character set and is
    /// flattened with `gs1_separator` between variable-length fields.
    pub fn resolve(input: &Input, eci: Option<u32>, gs1_separator: Option<u8>) -> Result<Self, InputError> {
        if input.is_empty() {
            return Err(InputError::EmptyContent);
        }
        if let Some(eci) = eci {
            validate_eci(eci)?;
        }

        if let Some(separator) = gs1_separator {
            let Input::Text(text) = input else {
                return Err(InputError::InvalidGs1("GS1 content must be text".into()));
            };
            if eci.is_some_and(|e| e != DEFAULT_ECI) {
                return Err(InputError::InvalidGs1("GS1 content cannot use an ECI".into()));
            }
            let elements = gs1::parse(text)?;
            return Ok(Self {
                bytes: gs1::to_bytes(&elements, separator),
                eci: DEFAULT_ECI,
                charset: Some(Charset::Iso8859_1),
                gs1: true,
            });
        }

        match input {
            Input::Text(text) => {
                let charset = match eci {
                    Some(eci) => Charset::from_eci(eci)
                        .ok_or(InputError::invalid("eci", eci, "no text conversion for this ECI, supply bytes"))?,
                    None if text.chars().all(|c| (c as u32) <= 0xFF) => Charset::Iso8859_1,
                    None => Charset::Utf8,
                };
                Ok(Self { bytes: charset.encode(text)?, eci: charset.eci(), charset: Some(charset), gs1: false })
            }
            Input::Bytes(bytes) => {
                let eci = eci.unwrap_or(DEFAULT_ECI);
                Ok(Self { bytes: bytes.clone(), eci, charset: Charset::from_eci(eci), gs1: false })
            }
        }
    }

    /// Raw bytes tagged with `eci`, used for the pieces of a split symbol.
    pub fn from_bytes(bytes: Vec<u8>, eci: u32) -> Result<Self, InputError> {
        Self::resolve(&Input::Bytes(bytes), Some(eci), None)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn eci(&self) -> u32 {
        self.eci
    }

    #[inline]
    pub fn is_gs1(&self) -> bool {
        self.gs1
    }

    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    /// Human readable name of the character set, for the encode log.
    pub fn charset_name(&self) -> String {
        match self.charset {
            Some(charset) => charset.name().to_string(),
            None => format!("ECI {}", self.eci),
        }
    }

    /// Whether a split at byte `index` keeps every character whole.
    pub fn is_char_boundary(&self, index: usize) -> bool {
        match self.charset {
            Some(Charset::Utf8) => {
                index == 0 || index >= self.bytes.len() || (self.bytes[index] & 0xC0) != 0x80
            }
            _ => true,
        }
    }
}

pub(crate) fn validate_eci(eci: u32) -> Result<(), InputError> {
    if eci > MAX_ECI {
        Err(InputError::invalid("eci", eci, "must be between 0 and 811799"))
    } else {
        Ok(())
    }
}
