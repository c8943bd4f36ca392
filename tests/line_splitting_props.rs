// tests/line_splitting_props.rs

use proptest::prelude::*;
use remotetail::pipeline::LineSplitter;

// Lines without '\n'; '\r' is allowed and must survive untouched.
fn line_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 \r\u{e9}\u{4e2d}=<>]{0,20}"
}

proptest! {
    #[test]
    fn chunking_does_not_change_the_lines(
        lines in proptest::collection::vec(line_strategy(), 0..20),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut bytes = Vec::new();
        for line in &lines {
            bytes.extend_from_slice(line.as_bytes());
            bytes.push(b'\n');
        }

        // Split the byte stream at arbitrary offsets, even mid-character.
        let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        offsets.push(0);
        offsets.push(bytes.len());
        offsets.sort_unstable();
        offsets.dedup();

        let mut splitter = LineSplitter::default();
        let mut got = Vec::new();
        for pair in offsets.windows(2) {
            got.extend(splitter.push(&bytes[pair[0]..pair[1]]));
        }
        prop_assert_eq!(splitter.finish(), None);
        prop_assert_eq!(got, lines);
    }

    #[test]
    fn trailing_partial_line_is_kept(head in line_strategy(), tail in "[a-z]{1,10}") {
        let mut splitter = LineSplitter::default();
        let input = format!("{head}\n{tail}");
        let got = splitter.push(input.as_bytes());
        prop_assert_eq!(got, vec![head]);
        prop_assert_eq!(splitter.finish(), Some(tail));
    }
}
