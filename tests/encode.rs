//! End-to-end tests through the public [Symbol] API.

use symbology::ecc::pdf417_coder;
use symbology::pdf417::high_level::{M_LATCH_BYTE, M_LATCH_NUMERIC, M_LATCH_TEXT};
use symbology::pdf417::{Pdf417Mode, Pdf417Options, StructuredAppend};
use symbology::{Content, Coordinator, Error, Input, InputError, Options, Symbol, Symbology};

fn pdf417(configure: impl FnOnce(&mut Pdf417Options)) -> Symbol {
    let mut options = Pdf417Options::default();
    configure(&mut options);
    Symbol::with_options(options)
}

fn info_value<'a>(symbol: &'a Symbol, key: &str) -> &'a str {
    let prefix = format!("{key}: ");
    symbol
        .info()
        .unwrap()
        .iter()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .unwrap_or_else(|| panic!("no `{key}` line"))
}

#[test]
fn empty_content_is_rejected() {
    for symbology in [Symbology::Pdf417, Symbology::Code128] {
        let mut symbol = Symbol::new(symbology);
        assert_eq!(symbol.encode().unwrap_err(), Error::from(InputError::EmptyContent));
    }
}

#[test]
fn exact_capacity_fits() {
    let mut symbol = pdf417(|o| {
        o.set_columns(Some(2)).unwrap().set_rows(Some(3)).unwrap().set_ecc_level(Some(0)).unwrap();
    });
    symbol.set_content("ABCDEF");
    symbol.encode().unwrap();

    assert_eq!(symbol.codewords().unwrap().unwrap().len(), 6);
    assert_eq!(info_value(&symbol, "Padding Codewords"), "0");
    assert_eq!(info_value(&symbol, "Codewords"), "4 1 63 125");

    symbol.set_content("ABCDEFG");
    assert_eq!(
        symbol.encode().unwrap_err(),
        Error::from(InputError::CapacityExceeded { length: 7, needed: 5, max: 4 })
    );
}

#[test]
fn largest_symbol_holds_928_codewords() {
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content_bytes(vec![0xFF; 1108]);
    symbol.encode().unwrap();

    assert_eq!(symbol.codewords().unwrap().unwrap().len(), 928);
    assert_eq!(info_value(&symbol, "Columns"), "29");
    assert_eq!(info_value(&symbol, "Rows"), "32");
    assert_eq!(info_value(&symbol, "ECC Level"), "0");
    assert_eq!(info_value(&symbol, "Padding Codewords"), "0");

    symbol.set_content_bytes(vec![0xFF; 1109]);
    assert_eq!(
        symbol.encode().unwrap_err(),
        Error::from(InputError::CapacityExceeded { length: 1109, needed: 927, max: 926 })
    );
}

#[test]
fn numeric_group_of_44_digits() {
    let digits = "1".repeat(44);
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content(digits);
    symbol.encode().unwrap();

    let codewords = symbol.codewords().unwrap().unwrap();
    assert_eq!(codewords[1], M_LATCH_NUMERIC);
    let data_len = codewords[0] as usize;
    let padding: usize = info_value(&symbol, "Padding Codewords").parse().unwrap();
    assert_eq!(data_len - padding, 2 + 15);
}

#[test]
fn digits_then_letters_latch_once() {
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content(format!("{}ABCDE", "0".repeat(20)));
    symbol.encode().unwrap();

    let codewords = symbol.codewords().unwrap().unwrap();
    assert_eq!(
        &codewords[1..12],
        [M_LATCH_NUMERIC, 188, 150, 790, 248, 256, 711, 100, M_LATCH_TEXT, 1, 63]
    );
    assert_eq!(codewords[12], 149);
    assert_eq!(info_value(&symbol, "Compaction Modes"), "NUM(20) TEX(5)");
}

#[test]
fn ten_digits_stay_in_text() {
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content("0123456789ABCDE");
    symbol.encode().unwrap();

    let codewords = symbol.codewords().unwrap().unwrap();
    // mixed latch, ten digits, alpha latch, five letters and a pad value
    assert_eq!(&codewords[1..10], [840, 32, 94, 156, 218, 298, 1, 63, 149]);
    let data = &codewords[..codewords[0] as usize];
    assert!(!data.contains(&M_LATCH_NUMERIC) && !data.contains(&M_LATCH_TEXT));
    assert_eq!(info_value(&symbol, "Compaction Modes"), "TEX(15)");
}

#[test]
fn every_byte_value() {
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content_bytes((0..=255u8).collect::<Vec<_>>());
    symbol.encode().unwrap();

    assert_eq!(info_value(&symbol, "ECI Mode"), "3");
    assert_eq!(info_value(&symbol, "ECI Charset"), "ISO-8859-1");
    assert_eq!(info_value(&symbol, "Compaction Modes"), "BYT(32) TEX(95) BYT(129)");

    let codewords = symbol.codewords().unwrap().unwrap();
    let data_len = codewords[0] as usize;
    assert_eq!(codewords[1], M_LATCH_BYTE);
    assert!(!codewords[..data_len].contains(&M_LATCH_NUMERIC));

    let cols: usize = info_value(&symbol, "Columns").parse().unwrap();
    let rows: usize = info_value(&symbol, "Rows").parse().unwrap();
    assert_eq!(codewords.len(), cols * rows);
    assert_eq!(symbol.width().unwrap(), 69 + 17 * cols);
    assert_eq!(symbol.height().unwrap(), 3 * rows);
}

#[test]
fn utf8_text_switches_eci() {
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content("Grüße €");
    symbol.encode().unwrap();
    assert_eq!(info_value(&symbol, "ECI Mode"), "26");
    assert_eq!(info_value(&symbol, "ECI Charset"), "UTF-8");
    assert_eq!(symbol.codewords().unwrap().unwrap()[1..3], [927, 26]);
}

#[test]
fn error_correction_is_valid() {
    for level in 0..=8u8 {
        let mut symbol = pdf417(|o| {
            o.set_ecc_level(Some(level)).unwrap();
        });
        symbol.set_content("PDF417 error correction level check 0123456789");
        symbol.encode().unwrap();
        let codewords = symbol.codewords().unwrap().unwrap();
        assert!(pdf417_coder(level).unwrap().verify(codewords), "level {level}");
    }
}

#[test]
fn truncated_symbol_is_narrower() {
    let mut normal = Symbol::new(Symbology::Pdf417);
    normal.set_content("truncated");
    let mut truncated = pdf417(|o| {
        o.set_mode(Pdf417Mode::Truncated);
    });
    truncated.set_content("truncated");

    let normal_width = normal.encode().unwrap().width();
    let truncated_width = truncated.encode().unwrap().width();
    let cols: usize = info_value(&truncated, "Columns").parse().unwrap();
    assert_eq!(truncated_width, 35 + 17 * cols);
    assert!(truncated_width < normal_width);
}

#[test]
fn gs1_is_code128_only() {
    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_content("[01]09501101530008[10]ABC123").set_gs1(true);
    let err = symbol.encode().unwrap_err();
    assert!(err.is_input());
    assert!(symbol.codewords().is_err());

    let mut symbol = Symbol::new(Symbology::Code128);
    symbol.set_content("[10]1234[21]5678").set_gs1(true);
    symbol.encode().unwrap();
    assert_eq!(info_value(&symbol, "Code Sets"), "C(13)");
    assert!(info_value(&symbol, "Symbol Values").starts_with("105 102 10 12 34 102 21 56 78 "));
}

#[test]
fn structured_append_sequence() {
    let text = "Structured append splits long content over linked symbols. ".repeat(8);
    let content = Content::resolve(&Input::Text(text.clone()), None, None).unwrap();

    let mut template = Pdf417Options::default();
    template.set_columns(Some(5)).unwrap().set_rows(Some(12)).unwrap().set_ecc_level(Some(2)).unwrap();
    let coordinator = Coordinator::new(template, 123).unwrap().with_file_name("fox.txt").unwrap();

    let mut sequence = coordinator.split(&content).unwrap();
    assert!(sequence.len() > 1);
    assert_eq!(sequence.file_id(), 123);
    sequence.encode_all().unwrap();

    let total = sequence.len() as u32;
    let mut joined = Vec::new();
    for (i, symbol) in sequence.symbols().iter().enumerate() {
        let Options::Pdf417(options) = symbol.options() else {
            panic!("not a PDF417 symbol");
        };
        let sa: &StructuredAppend = options.structured_append().unwrap();
        assert_eq!((sa.position(), sa.total(), sa.file_id()), (i as u32 + 1, total, 123));
        assert_eq!(sa.file_name(), Some("fox.txt"));

        let codewords = symbol.codewords().unwrap().unwrap();
        let data = &codewords[..codewords[0] as usize];
        assert!(data.contains(&928));
        assert_eq!(data.last() == Some(&922), sa.is_last());

        let Input::Bytes(bytes) = symbol.input() else {
            panic!("pieces carry bytes");
        };
        joined.extend_from_slice(bytes);
    }
    assert_eq!(joined, text.as_bytes());
}

#[test]
fn options_from_json() {
    let options: Options = serde_json::from_str(r#"{"symbology":"pdf417","columns":5}"#).unwrap();
    let Options::Pdf417(pdf) = &options else {
        panic!("expected PDF417 options");
    };
    assert_eq!(pdf.columns(), Some(5));
    assert_eq!(pdf.row_height(), 3);
    options.validate().unwrap();

    let mut symbol = Symbol::new(Symbology::Pdf417);
    symbol.set_options(options).unwrap().set_content("json");
    symbol.encode().unwrap();
    assert_eq!(info_value(&symbol, "Columns"), "5");

    let invalid: Options = serde_json::from_str(r#"{"symbology":"pdf417","ecc_level":9}"#).unwrap();
    assert!(invalid.validate().is_err());
    assert!(symbol.set_options(invalid).is_err());

    let code128: Options = serde_json::from_str(r#"{"symbology":"code128"}"#).unwrap();
    assert_eq!(code128.symbology(), Symbology::Code128);
    assert!(symbol.set_options(code128).is_err());
}

#[test]
fn code128_symbol() {
    let mut symbol = Symbol::new(Symbology::Code128);
    symbol.set_content("Hello");
    let encoded = symbol.encode().unwrap();
    assert_eq!((encoded.width(), encoded.height()), (90, 50));
    assert!(encoded.codewords().is_none());
    assert_eq!(info_value(&symbol, "Symbol Values"), "104 40 69 76 76 79 76");

    let grid = symbol.encoded().unwrap().grid();
    // start character B begins with a two module bar
    assert_eq!([grid.get(0, 0), grid.get(1, 0), grid.get(2, 0)], [Some(true), Some(true), Some(false)]);
}
