//! Barcode encoding engine.
//!
//! Content goes through a shared pipeline: a cost-driven [segmenter](segment)
//! splits it into encoding modes, per-symbology encoders turn the runs into
//! codewords, a [Reed-Solomon coder](ecc) appends error correction and the
//! result is laid out as a [ModuleGrid]. Two symbologies are implemented:
//! [PDF417](pdf417) (stacked, codewords authoritative) and
//! [Code 128](code128) (linear, bar/space pattern authoritative).
//!
//! ```
//! use symbology::{Symbol, Symbology};
//!
//! let mut symbol = Symbol::new(Symbology::Pdf417);
//! symbol.set_content("Hello, world!");
//! let encoded = symbol.encode().unwrap();
//! assert!(encoded.codewords().is_some());
//! assert!(encoded.width() > 0 && encoded.height() > 0);
//! ```

pub mod code128;
pub mod content;
pub mod ecc;
pub mod error;
pub mod generators;
pub mod gf;
pub mod gs1;
pub mod pdf417;
pub mod placement;
pub mod segment;
pub mod structured_append;
pub mod symbol;

pub use content::{Charset, Content, Input};
pub use error::{Error, InputError, InternalError, Result};
pub use placement::ModuleGrid;
pub use structured_append::{Coordinator, StructuredAppendSequence};
pub use symbol::{encode, Encoded, Options, Symbol, Symbology};
