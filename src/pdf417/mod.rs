//! PDF417 (ISO/IEC 15438): text, numeric and byte compaction, GF(929)
//! error correction, Macro PDF417 and the truncated variant.

pub mod assembler;
pub mod builder;
pub mod high_level;
pub mod options;
pub mod tables;

pub use assembler::{assemble, Assembly};
pub use builder::PDF417;
pub use options::{Pdf417Mode, Pdf417Options, StructuredAppend};

use crate::content::Content;
use crate::error::Result;
use crate::generators::{Pdf417Row, TruncatedPdf417Row};
use crate::symbol::Encoded;

/// Encodes `content` into a complete symbol.
pub fn encode(content: &Content, options: &Pdf417Options) -> Result<Encoded> {
    let mut info = Vec::new();
    let asm = assemble(content, options, &mut info)?;

    let grid = match options.mode() {
        Pdf417Mode::Normal => {
            PDF417::<Pdf417Row>::new(&asm.codewords, asm.rows, asm.cols, asm.level)?.to_grid(options.row_height())?
        }
        Pdf417Mode::Truncated => {
            PDF417::<TruncatedPdf417Row>::new(&asm.codewords, asm.rows, asm.cols, asm.level)?.to_grid(options.row_height())?
        }
    };

    Ok(Encoded::new(grid, Some(asm.codewords), None, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Input;

    #[test]
    fn test_geometry() {
        let content = Content::resolve(&Input::Text("Test".into()), None, None).unwrap();
        let mut options = Pdf417Options::default();
        options.set_columns(Some(2)).unwrap().set_ecc_level(Some(0)).unwrap();

        let encoded = encode(&content, &options).unwrap();
        assert_eq!((encoded.width(), encoded.height()), (69 + 34, 9));
        assert_eq!(encoded.codewords().unwrap().len(), 6);

        options.set_mode(Pdf417Mode::Truncated).set_row_height(1).unwrap();
        let truncated = encode(&content, &options).unwrap();
        assert_eq!((truncated.width(), truncated.height()), (35 + 34, 3));
        assert_eq!(truncated.codewords(), encoded.codewords());
    }
}
