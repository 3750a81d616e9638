//! Property-based tests for the schema formatter.
//!
//! These tests use proptest to generate generator blocks and arbitrary
//! schema-like text and verify that formatting invariants hold.

#[cfg(test)]
mod proptest_tests {
    use crate::schema_format::{format_schema, parse_generator_blocks, GENERATOR_PROPERTY_ORDER};
    use proptest::prelude::*;

    fn property_key() -> impl Strategy<Value = String> {
        prop_oneof![
            proptest::sample::select(GENERATOR_PROPERTY_ORDER.to_vec()).prop_map(String::from),
            "[a-zA-Z][a-zA-Z0-9_]{0,15}",
        ]
    }

    fn property_value() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_\"./ \\[\\],]{1,20}"
    }

    /// A generator block with scrambled property order and loose spacing.
    fn generator_block() -> impl Strategy<Value = String> {
        (
            "[a-zA-Z][a-zA-Z0-9_-]{0,10}",
            proptest::collection::vec((property_key(), property_value(), " {0,4}"), 0..10),
        )
            .prop_map(|(name, props)| {
                let mut block = format!("generator {} {{\n", name);
                for (key, value, pad) in props {
                    block.push_str(&format!("{}{}{}={}{}\n", pad, key, pad, pad, value));
                }
                block.push('}');
                block
            })
    }

    proptest! {
        /// Property: formatting a block twice gives the same result as once
        #[test]
        fn formatting_generated_blocks_is_idempotent(block in generator_block()) {
            let once = format_schema(&block);
            let twice = format_schema(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: known keys come first, in canonical order
        #[test]
        fn known_keys_precede_unknown_keys(block in generator_block()) {
            let formatted = format_schema(&block);
            let blocks = parse_generator_blocks(&formatted);
            prop_assert_eq!(blocks.len(), 1);

            let keys: Vec<&str> = blocks[0].properties.iter().map(|(k, _)| k.as_str()).collect();
            let known: Vec<usize> = keys
                .iter()
                .filter_map(|k| GENERATOR_PROPERTY_ORDER.iter().position(|o| o == k))
                .collect();
            let known_count = known.len();

            prop_assert!(known.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(keys[..known_count]
                .iter()
                .all(|k| GENERATOR_PROPERTY_ORDER.contains(k)));
        }

        /// Property: keys are padded to 23 columns, so `=` lines up unless a
        /// key is longer than that
        #[test]
        fn property_lines_are_aligned(block in generator_block()) {
            let formatted = format_schema(&block);
            for line in formatted.lines().filter(|l| l.starts_with("  ")) {
                let key = line.trim_start().split(' ').next().unwrap_or_default();
                let expected = 2 + key.len().max(23) + 1;
                prop_assert_eq!(line.find('='), Some(expected), "misaligned line: {:?}", line);
            }
        }

        /// Property: formatting arbitrary schema-like text is idempotent
        #[test]
        fn formatting_arbitrary_text_is_idempotent(text in "[a-z_ ={}\n/\"-]{0,80}") {
            let input = format!("generator g {{\n{}\n}}\n{}", text, text);
            let once = format_schema(&input);
            let twice = format_schema(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: text without the keyword is never changed
        #[test]
        fn text_without_keyword_is_unchanged(text in "[a-z_ ={}\n]{0,80}") {
            prop_assume!(!text.contains("generator"));
            prop_assert_eq!(format_schema(&text), text);
        }
    }
}
