use proptest::prelude::*;

use symbology::ecc::pdf417_coder;
use symbology::pdf417::{assemble, Pdf417Options};
use symbology::{encode, Content, Input, Options, Symbology};

fn bytes_content(bytes: Vec<u8>) -> Content {
    Content::resolve(&Input::Bytes(bytes), None, None).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pdf417_codewords_are_consistent(bytes in prop::collection::vec(any::<u8>(), 1..300)) {
        let content = bytes_content(bytes);
        let asm = assemble(&content, &Pdf417Options::default(), &mut Vec::new()).unwrap();

        prop_assert_eq!(asm.codewords.len(), asm.rows as usize * asm.cols as usize);
        prop_assert_eq!(asm.codewords[0] as usize, asm.data_len);
        prop_assert!(asm.data().iter().all(|&cw| cw < 929));
        prop_assert!(pdf417_coder(asm.level).unwrap().verify(&asm.codewords));
    }

    #[test]
    fn pdf417_is_deterministic(text in "[ -~]{1,120}") {
        let content = Content::resolve(&Input::Text(text), None, None).unwrap();
        let options = Options::new(Symbology::Pdf417);
        let first = encode(&content, &options).unwrap();
        let second = encode(&content, &options).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn digits_use_fewer_codewords_than_text(digits in "[0-9]{45,200}") {
        let content = Content::resolve(&Input::Text(digits.clone()), None, None).unwrap();
        let asm = assemble(&content, &Pdf417Options::default(), &mut Vec::new()).unwrap();
        let needed = asm.data_len - asm.padding;
        // one text codeword per two digits at best
        prop_assert!(needed < 1 + digits.len() / 2);
    }

    #[test]
    fn code128_width_matches_values(text in "[ -~]{1,60}") {
        let content = Content::resolve(&Input::Text(text), None, None).unwrap();
        let encoded = encode(&content, &Options::new(Symbology::Code128)).unwrap();
        let values = encoded
            .info()
            .iter()
            .find_map(|line| line.strip_prefix("Symbol Values: "))
            .unwrap()
            .split(' ')
            .count();
        // eleven modules per value, thirteen for the stop pattern
        prop_assert_eq!(encoded.width(), values * 11 + 13);
    }
}
