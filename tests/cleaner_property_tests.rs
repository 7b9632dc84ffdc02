//! Property tests for the cleaning pipeline, projection, and row escaping.

use proptest::prelude::*;
use tmx2csv::{
    CleanOptions, ColumnSpec, DEFAULT_DELIMITER, RowWriter, TranslationUnit, clean, project,
};

fn options_strategy() -> impl Strategy<Value = CleanOptions> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(remove_html, strip_control, collapse, whitespace, lowercase, accents)| {
                CleanOptions::new()
                    .with_remove_html(remove_html)
                    .with_strip_control(strip_control)
                    .with_collapse_punctuation(collapse)
                    .with_normalize_whitespace(whitespace)
                    .with_lowercase(lowercase)
                    .with_strip_accents(accents)
            },
        )
}

fn language_tag_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{2}(-[A-Z]{2})?").expect("valid tag regex")
}

fn text_strategy() -> impl Strategy<Value = String> {
    // Arbitrary Unicode, including controls, marks, and markup-ish noise.
    any::<String>()
}

proptest! {
    #[test]
    fn clean_is_idempotent_for_every_flag_subset(
        text in text_strategy(),
        options in options_strategy(),
    ) {
        let once = clean(&text, &options);
        let twice = clean(&once, &options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn clean_never_panics_and_no_flags_means_identity(text in text_strategy()) {
        let untouched = clean(&text, &CleanOptions::new());
        prop_assert_eq!(untouched, text);
    }

    #[test]
    fn normalized_output_has_no_whitespace_runs(text in text_strategy()) {
        let options = CleanOptions::new().with_normalize_whitespace(true);
        let cleaned = clean(&text, &options);
        prop_assert!(!cleaned.starts_with(' '));
        prop_assert!(!cleaned.ends_with(' '));
        prop_assert!(!cleaned.contains("  "));
        prop_assert!(!cleaned.contains('\n'));
        prop_assert!(!cleaned.contains('\t'));
    }

    #[test]
    fn projection_length_always_matches_spec_count(
        variants in prop::collection::btree_map(language_tag_strategy(), text_strategy(), 0..6),
        selector_tags in prop::collection::vec(language_tag_strategy(), 1..8),
    ) {
        let mut unit = TranslationUnit::default();
        for (language, text) in &variants {
            unit.push_variant(language.clone(), text.clone());
        }

        let specs: Vec<ColumnSpec> = selector_tags
            .iter()
            .enumerate()
            .map(|(i, tag)| ColumnSpec::language(format!("col_{i}"), tag.clone()))
            .collect();

        let row = project(&unit, &specs);
        prop_assert_eq!(row.len(), specs.len());
    }

    #[test]
    fn written_rows_reparse_to_the_same_fields(
        fields in prop::collection::vec(text_strategy(), 2..5),
    ) {
        let mut writer = RowWriter::from_writer(Vec::new(), DEFAULT_DELIMITER);
        writer.write_row(&fields).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        let parsed: Vec<String> = record.iter().map(str::to_string).collect();
        prop_assert_eq!(parsed, fields);
    }
}
