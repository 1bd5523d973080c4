//! GS1 application identifier syntax: `[01]09501101530008[10]ABC123`.

use crate::error::InputError;

/// Maximum data length of a single application identifier.
pub const MAX_DATA_LEN: usize = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub ai: String,
    pub data: String,
}

impl Element {
    /// Data length imposed by the AI's leading digits, if it has one.
    pub fn predefined_length(&self) -> Option<usize> {
        predefined_length(&self.ai)
    }
}

/// AIs whose first two digits fix the data length never need a separator.
fn predefined_length(ai: &str) -> Option<usize> {
    let len = match ai.get(..2)? {
        "00" => 18,
        "01" | "02" | "03" => 14,
        "04" => 16,
        "11" | "12" | "13" | "14" | "15" | "16" | "17" | "18" | "19" => 6,
        "20" => 2,
        "31" | "32" | "33" | "34" | "35" | "36" => 6,
        "41" => 13,
        _ => return None,
    };
    Some(len)
}

/// Characters allowed in AI data (GS1 character set 82).
fn is_gs1_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!\"%&'()*+,-./:;<=>?_".contains(c)
}

/// Parses bracketed AI syntax into its elements.
pub fn parse(text: &str) -> Result<Vec<Element>, InputError> {
    let err = |msg: String| InputError::InvalidGs1(msg);
    let mut elements = Vec::new();
    let mut rest = text;

    if rest.is_empty() {
        return Err(InputError::EmptyContent);
    }

    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('[') else {
            return Err(err(format!("expected '[' at {:?}", rest)));
        };
        let Some(close) = body.find(']') else {
            return Err(err("unterminated application identifier".into()));
        };
        let ai = &body[..close];
        if !(2..=4).contains(&ai.len()) || !ai.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err(format!("invalid application identifier [{ai}]")));
        }

        let after = &body[close + 1..];
        let end = after.find('[').unwrap_or(after.len());
        let data = &after[..end];
        if data.is_empty() {
            return Err(err(format!("no data for application identifier [{ai}]")));
        }
        if data.len() > MAX_DATA_LEN {
            return Err(err(format!("data for [{ai}] is longer than {MAX_DATA_LEN} characters")));
        }
        if let Some(c) = data.chars().find(|&c| !is_gs1_char(c)) {
            return Err(err(format!("invalid character {c:?} in data for [{ai}]")));
        }
        if let Some(len) = predefined_length(ai) {
            if data.len() != len {
                return Err(err(format!("data for [{ai}] must be {len} characters long")));
            }
        }

        elements.push(Element { ai: ai.to_string(), data: data.to_string() });
        rest = &after[end..];
    }

    Ok(elements)
}

/// Flattens the elements into AI/data bytes, inserting `separator` after each
/// variable-length field that is followed by another field.
pub fn to_bytes(elements: &[Element], separator: u8) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        out.extend_from_slice(element.ai.as_bytes());
        out.extend_from_slice(element.data.as_bytes());
        if i + 1 < elements.len() && element.predefined_length().is_none() {
            out.push(separator);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_then_variable() {
        let elements = parse("[01]09501101530008[10]ABC123").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].ai, "01");
        assert_eq!(elements[1].data, "ABC123");
        assert_eq!(to_bytes(&elements, 0x1D), b"010950110153000810ABC123");
    }

    #[test]
    fn test_variable_fields_get_separators() {
        let elements = parse("[10]ABC[21]XYZ[3103]000150").unwrap();
        assert_eq!(to_bytes(&elements, 0x1D), b"10ABC\x1D21XYZ\x1D3103000150");
    }

    #[test]
    fn test_malformed() {
        for input in ["[01", "[]123", "01234", "[0A]12", "[01]123", "[10]", "[10]AB~", "[12345]1"] {
            assert!(matches!(parse(input), Err(InputError::InvalidGs1(_))), "{input}");
        }
        assert_eq!(parse(""), Err(InputError::EmptyContent));
    }
}
