//! Surface text cleaning for extracted segments.
//!
//! [`clean`] runs a fixed, ordered pipeline of flag-gated passes over one
//! string. The order is policy: HTML removal, control-character stripping,
//! punctuation collapsing, whitespace normalization, lowercasing, accent
//! stripping. Only passes whose flag is enabled execute, but enabled passes
//! always run in that order. `clean` is idempotent for every flag combination
//! and total over any Unicode input.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::error::Error;

lazy_static! {
    static ref HTML_TAG_REGEX: Regex = Regex::new(r"<[^<>]*>").unwrap();
    static ref WHITESPACE_RUN_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Independently toggleable cleaning flags. All default to off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Replace `<...>` tag runs with a space.
    pub remove_html: bool,
    /// Drop control characters that are not whitespace.
    pub strip_control: bool,
    /// Collapse runs of the same ASCII punctuation character to one.
    pub collapse_punctuation: bool,
    /// Collapse any whitespace run to a single space and trim the ends.
    pub normalize_whitespace: bool,
    /// Unicode lowercase.
    pub lowercase: bool,
    /// Decompose and drop combining marks ("café" becomes "cafe").
    pub strip_accents: bool,
}

impl CleanOptions {
    /// Creates options with every pass disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no pass is enabled, in which case [`clean`] is the
    /// identity function.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_remove_html(mut self, enabled: bool) -> Self {
        self.remove_html = enabled;
        self
    }

    pub fn with_strip_control(mut self, enabled: bool) -> Self {
        self.strip_control = enabled;
        self
    }

    pub fn with_collapse_punctuation(mut self, enabled: bool) -> Self {
        self.collapse_punctuation = enabled;
        self
    }

    pub fn with_normalize_whitespace(mut self, enabled: bool) -> Self {
        self.normalize_whitespace = enabled;
        self
    }

    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.lowercase = enabled;
        self
    }

    pub fn with_strip_accents(mut self, enabled: bool) -> Self {
        self.strip_accents = enabled;
        self
    }
}

/// The pipeline as an explicit ordered list of (flag, pass) pairs, so the
/// application order is fixed in one place.
const PASSES: &[(fn(&CleanOptions) -> bool, fn(&str) -> String)] = &[
    (|o| o.remove_html, remove_html),
    (|o| o.strip_control, strip_control),
    (|o| o.collapse_punctuation, collapse_punctuation),
    (|o| o.normalize_whitespace, normalize_whitespace),
    (|o| o.lowercase, lowercase),
    (|o| o.strip_accents, strip_accents),
];

/// Cleans one string according to the enabled flags.
///
/// A removal pass can expose new work for an earlier pass (dropping a lone
/// combining mark can join two spaces, stripping a tag can reveal another),
/// so the ordered pipeline is re-applied until the output is stable. The
/// result is therefore a fixed point: cleaning it again changes nothing.
pub fn clean(text: &str, options: &CleanOptions) -> String {
    if options.is_noop() {
        return text.to_string();
    }

    let mut current = apply_passes(text, options);
    loop {
        let next = apply_passes(&current, options);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn apply_passes(text: &str, options: &CleanOptions) -> String {
    let mut current = text.to_string();
    for (enabled, pass) in PASSES {
        if enabled(options) {
            current = pass(&current);
        }
    }
    current
}

fn remove_html(text: &str) -> String {
    HTML_TAG_REGEX.replace_all(text, " ").into_owned()
}

fn strip_control(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

fn collapse_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if c.is_ascii_punctuation() && previous == Some(c) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN_REGEX
        .replace_all(text, " ")
        .trim()
        .to_string()
}

fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Cleans a plain text file line by line, writing the cleaned lines to
/// `out_path`. One line is in memory at a time.
pub fn clean_text_file<P: AsRef<Path>>(
    in_path: P,
    out_path: P,
    options: &CleanOptions,
) -> Result<(), Error> {
    let reader = BufReader::new(File::open(in_path)?);
    let mut writer = BufWriter::new(File::create(out_path)?);

    for line in reader.lines() {
        let line = line?;
        writeln!(writer, "{}", clean(&line, options))?;
    }
    writer.flush()?;
    Ok(())
}
