//! Core types for tmx2csv.
//!
//! A [`TranslationUnit`] is one `<tu>` record pulled from a TMX stream; the
//! reader yields them one at a time wrapped in a [`UnitOutcome`], and the
//! conversion summarizes itself in a [`ConversionSummary`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// One language variant of a translation unit: the text of a single
/// `<tuv xml:lang="...">` segment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Variant {
    /// The language tag as written in the source document (e.g. "en", "fr-CA").
    pub language: String,

    /// The raw segment text, XML entities already unescaped.
    pub text: String,
}

/// One logical record from a TMX document: an ordered set of language
/// variants plus free-form metadata from the `<tu>` attributes and any
/// `<prop>` children.
///
/// Language tags are unique within a unit; when the source repeats a tag the
/// later `<tuv>` replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct TranslationUnit {
    /// Variants in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub variants: Vec<Variant>,

    /// Metadata attributes (`tuid`, `creationdate`, `<prop type="...">`, ...).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl TranslationUnit {
    /// Inserts a variant, replacing any earlier variant with the same
    /// (case-insensitively equal) language tag.
    pub fn push_variant(&mut self, language: String, text: String) {
        if let Some(existing) = self
            .variants
            .iter_mut()
            .find(|v| v.language.eq_ignore_ascii_case(&language))
        {
            existing.text = text;
        } else {
            self.variants.push(Variant { language, text });
        }
    }

    /// Looks up the text for a language tag.
    ///
    /// An exact (case-insensitive) tag match wins; failing that, a variant
    /// whose primary language subtag matches is accepted, so a `"en"` selector
    /// finds an `"en-US"` variant.
    pub fn text_for_language(&self, tag: &str) -> Option<&str> {
        if let Some(v) = self
            .variants
            .iter()
            .find(|v| v.language.eq_ignore_ascii_case(tag))
        {
            return Some(v.text.as_str());
        }

        let target: LanguageIdentifier = tag.parse().ok()?;
        self.variants
            .iter()
            .find(|v| {
                v.language
                    .parse::<LanguageIdentifier>()
                    .map(|id| id.language == target.language)
                    .unwrap_or(false)
            })
            .map(|v| v.text.as_str())
    }

    /// True when the unit carries no language variants at all. Such units are
    /// invalid and are skipped by the conversion, never projected.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Why a unit was dropped instead of becoming an output row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The unit closed without any language variants.
    EmptyUnit,

    /// The markup inside the unit could not be parsed (unbalanced tags,
    /// syntax damage). The reader resynchronized at the next unit boundary.
    MalformedMarkup(String),

    /// The unit contained bytes that could not be decoded.
    InvalidEncoding(String),

    /// The underlying source failed mid-stream; the stream ended after this.
    SourceRead(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyUnit => write!(f, "unit has no language variants"),
            SkipReason::MalformedMarkup(detail) => write!(f, "malformed markup: {}", detail),
            SkipReason::InvalidEncoding(detail) => write!(f, "invalid encoding: {}", detail),
            SkipReason::SourceRead(detail) => write!(f, "source read failed: {}", detail),
        }
    }
}

/// The tagged per-pull result of the streaming reader: a parsed unit, or a
/// recorded skip. Parse trouble never unwinds across the whole stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Unit(TranslationUnit),
    Skipped(SkipReason),
}

/// One recorded skip, positioned by the 1-based index of the unit in document
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
    pub unit_index: u64,
    pub reason: SkipReason,
}

/// Final accounting for a conversion run. This is the reporting surface the
/// calling layer logs from; the library itself does no logging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConversionSummary {
    /// Units pulled from the source, including skipped ones.
    pub units_read: u64,

    /// Units dropped with a recorded reason.
    pub units_skipped: u64,

    /// Data rows written to the sink (the header row is not counted).
    pub rows_written: u64,

    /// The reasons for every skipped unit, in encounter order.
    pub skips: Vec<Skip>,

    /// True when the run stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl ConversionSummary {
    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        self.units_skipped += 1;
        self.skips.push(Skip {
            unit_index: self.units_read,
            reason,
        });
    }
}
