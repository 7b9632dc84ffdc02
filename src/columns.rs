//! Column extraction configuration and row projection.
//!
//! A [`ColumnSpec`] list declares, in output order, which piece of each
//! translation unit becomes which CSV column and how its text is cleaned.
//! [`project`] turns one unit into one row; missing data is an empty string,
//! never an error.

use std::collections::HashSet;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::{
    cleaner::{CleanOptions, clean},
    error::Error,
    types::TranslationUnit,
};

/// What a column reads from a unit: a language variant or a metadata
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// A language tag matched against the unit's variants (exact first, then
    /// by primary subtag, so `"en"` finds `"en-US"`).
    Language(String),

    /// A key in the unit's metadata attributes (`tuid`, `creationdate`,
    /// `<prop type="...">` values).
    Attribute(String),
}

/// One output column: its header name, what it selects, and the cleaning
/// applied to selected text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub selector: Selector,
    #[serde(default)]
    pub clean: CleanOptions,
}

impl ColumnSpec {
    /// A language column with no cleaning.
    pub fn language(name: impl Into<String>, tag: impl Into<String>) -> Self {
        ColumnSpec {
            name: name.into(),
            selector: Selector::Language(tag.into()),
            clean: CleanOptions::default(),
        }
    }

    /// A metadata attribute column with no cleaning.
    pub fn attribute(name: impl Into<String>, key: impl Into<String>) -> Self {
        ColumnSpec {
            name: name.into(),
            selector: Selector::Attribute(key.into()),
            clean: CleanOptions::default(),
        }
    }

    /// Sets the cleaning options for this column.
    pub fn with_clean(mut self, clean: CleanOptions) -> Self {
        self.clean = clean;
        self
    }
}

/// Checks a spec list before a conversion starts: it must be non-empty and
/// column names must be unique. Violations are fatal configuration errors.
pub fn validate_column_specs(specs: &[ColumnSpec]) -> Result<(), Error> {
    if specs.is_empty() {
        return Err(Error::invalid_config("column spec list is empty"));
    }

    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::invalid_config(format!(
                "duplicate column name `{}`",
                spec.name
            )));
        }
    }
    Ok(())
}

/// Loads a `ColumnSpec` list from a JSON reader. This is the configuration
/// boundary the calling layer hands specs across.
pub fn column_specs_from_json<R: BufRead>(reader: R) -> Result<Vec<ColumnSpec>, Error> {
    let specs = serde_json::from_reader(reader)?;
    Ok(specs)
}

/// Projects one unit into one output row, positionally aligned to `specs`.
///
/// Always returns exactly `specs.len()` values; a selector with no match in
/// the unit yields an empty string. Never mutates the unit or the specs.
pub fn project(unit: &TranslationUnit, specs: &[ColumnSpec]) -> Vec<String> {
    specs
        .iter()
        .map(|spec| {
            let raw = match &spec.selector {
                Selector::Language(tag) => unit.text_for_language(tag),
                Selector::Attribute(key) => unit.attributes.get(key).map(String::as_str),
            };
            match raw {
                Some(text) if !spec.clean.is_noop() => clean(text, &spec.clean),
                Some(text) => text.to_string(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_unit() -> TranslationUnit {
        let mut unit = TranslationUnit::default();
        unit.push_variant("en-US".to_string(), "  Hello   WORLD ".to_string());
        unit.push_variant("fr".to_string(), "Bonjour".to_string());
        unit.attributes
            .insert("tuid".to_string(), "unit-1".to_string());
        unit
    }

    #[test]
    fn test_project_row_length_matches_specs() {
        let unit = sample_unit();
        let specs = vec![
            ColumnSpec::language("English", "en"),
            ColumnSpec::language("French", "fr"),
            ColumnSpec::language("Japanese", "ja"),
            ColumnSpec::attribute("Unit ID", "tuid"),
        ];
        let row = project(&unit, &specs);
        assert_eq!(row.len(), 4);
        assert_eq!(row, vec!["  Hello   WORLD ", "Bonjour", "", "unit-1"]);
    }

    #[test]
    fn test_project_missing_selectors_are_empty_strings() {
        let unit = TranslationUnit::default();
        let specs = vec![
            ColumnSpec::language("English", "en"),
            ColumnSpec::attribute("Date", "creationdate"),
        ];
        assert_eq!(project(&unit, &specs), vec!["", ""]);
    }

    #[test]
    fn test_project_applies_cleaning_per_column() {
        let unit = sample_unit();
        let specs = vec![
            ColumnSpec::language("English", "en").with_clean(
                CleanOptions::new()
                    .with_normalize_whitespace(true)
                    .with_lowercase(true),
            ),
            ColumnSpec::language("French", "fr"),
        ];
        assert_eq!(project(&unit, &specs), vec!["hello world", "Bonjour"]);
    }

    #[test]
    fn test_project_does_not_mutate_unit() {
        let unit = sample_unit();
        let before = unit.clone();
        let specs = vec![
            ColumnSpec::language("English", "en")
                .with_clean(CleanOptions::new().with_lowercase(true)),
        ];
        project(&unit, &specs);
        assert_eq!(unit, before);
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        let err = validate_column_specs(&[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let specs = vec![
            ColumnSpec::language("English", "en"),
            ColumnSpec::language("English", "en-GB"),
        ];
        let err = validate_column_specs(&specs).unwrap_err();
        assert!(err.to_string().contains("duplicate column name `English`"));
    }

    #[test]
    fn test_validate_accepts_unique_names() {
        let specs = vec![
            ColumnSpec::language("English", "en"),
            ColumnSpec::attribute("Unit ID", "tuid"),
        ];
        assert!(validate_column_specs(&specs).is_ok());
    }

    #[test]
    fn test_column_specs_from_json() {
        let json = r#"[
            {"name": "English", "selector": {"language": "en"}},
            {
                "name": "French",
                "selector": {"language": "fr"},
                "clean": {"lowercase": true, "normalize_whitespace": true}
            },
            {"name": "Unit ID", "selector": {"attribute": "tuid"}}
        ]"#;
        let specs = column_specs_from_json(Cursor::new(json)).unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0], ColumnSpec::language("English", "en"));
        assert!(specs[1].clean.lowercase);
        assert!(specs[1].clean.normalize_whitespace);
        assert!(!specs[1].clean.strip_accents);
        assert_eq!(specs[2].selector, Selector::Attribute("tuid".to_string()));
    }

    #[test]
    fn test_column_specs_from_json_rejects_garbage() {
        assert!(column_specs_from_json(Cursor::new("{ not json")).is_err());
    }
}
