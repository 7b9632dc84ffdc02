//! Streaming TMX translation-unit reader.
//!
//! [`TmxReader`] is a forward-only cursor over a TMX document. It pulls XML
//! events with `quick-xml` and yields one [`UnitOutcome`] per `<tu>` as soon
//! as the unit's closing tag is seen, so memory use is bounded by the largest
//! single unit, never the document. Markup damage inside one unit drops that
//! unit with a recorded reason and the reader resynchronizes at the next
//! `<tu>`; a single bad unit never ends the stream.
//!
//! The sequence is not restartable. Construct a fresh reader to re-scan.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    error::Error,
    types::{SkipReason, TranslationUnit, UnitOutcome},
};

const TU_TAG: &[u8] = b"tu";
const TUV_TAG: &[u8] = b"tuv";
const SEG_TAG: &[u8] = b"seg";
const PROP_TAG: &[u8] = b"prop";

/// What the inter-unit scan found.
enum NextUnit {
    /// A `<tu>` start tag; the body still has to be read.
    Open(TranslationUnit),
    /// A self-closing `<tu/>`.
    SelfClosed,
}

/// Incremental reader yielding translation units from a TMX stream.
pub struct TmxReader<R: BufRead> {
    xml: Reader<R>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> TmxReader<R> {
    /// Creates a reader over any buffered byte source.
    pub fn from_reader(reader: R) -> Self {
        let mut xml = Reader::from_reader(reader);
        xml.config_mut().check_end_names = true;
        TmxReader {
            xml,
            buf: Vec::new(),
            done: false,
        }
    }

    fn classify(error: &quick_xml::Error) -> SkipReason {
        match error {
            quick_xml::Error::Encoding(e) => SkipReason::InvalidEncoding(e.to_string()),
            other => SkipReason::MalformedMarkup(other.to_string()),
        }
    }

    /// Reads the `xml:lang` (or legacy `lang`) attribute of a `<tuv>`.
    fn variant_language(e: &BytesStart) -> Result<Option<String>, SkipReason> {
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|err| SkipReason::MalformedMarkup(err.to_string()))?;
            if attr.key.as_ref() == b"xml:lang" || attr.key.as_ref() == b"lang" {
                let value = attr
                    .unescape_value()
                    .map_err(|err| Self::classify(&err))?;
                return Ok(Some(value.to_string()));
            }
        }
        Ok(None)
    }

    /// Copies all `<tu>` attributes into unit metadata. Attribute damage on
    /// the start tag itself is tolerated; whatever parsed so far is kept.
    fn unit_attributes(e: &BytesStart, unit: &mut TranslationUnit) {
        for attr in e.attributes().with_checks(false).flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            if let Ok(value) = attr.unescape_value() {
                unit.attributes.insert(key, value.to_string());
            }
        }
    }

    fn prop_type(e: &BytesStart) -> Result<Option<String>, SkipReason> {
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|err| SkipReason::MalformedMarkup(err.to_string()))?;
            if attr.key.as_ref() == b"type" {
                let value = attr
                    .unescape_value()
                    .map_err(|err| Self::classify(&err))?;
                return Ok(Some(value.to_string()));
            }
        }
        Ok(None)
    }

    /// Skips events until the next `<tu>` start. Returns the opened unit, or
    /// a skip for a self-closing `<tu/>`, or `None` at end of input. Parse
    /// errors between units are ignored: markup outside a unit carries no
    /// content, and this scan doubles as the recovery path past a damaged
    /// region.
    fn scan_to_next_unit(&mut self) -> Option<NextUnit> {
        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) if e.name().as_ref() == TU_TAG => {
                    let mut unit = TranslationUnit::default();
                    Self::unit_attributes(e, &mut unit);
                    return Some(NextUnit::Open(unit));
                }
                Ok(Event::Empty(ref e)) if e.name().as_ref() == TU_TAG => {
                    // A self-closing <tu/> has no body and can hold no
                    // variants.
                    return Some(NextUnit::SelfClosed);
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(quick_xml::Error::Io(_)) => {
                    self.done = true;
                    return None;
                }
                Err(_) => {}
            }
        }
    }

    /// Reads the body of one unit whose `<tu>` start has been consumed.
    /// On any in-unit parse failure the unit is dropped and a skip outcome is
    /// returned; the next pull resynchronizes at the next `<tu>`.
    fn finish_unit(&mut self, mut unit: TranslationUnit) -> Option<UnitOutcome> {
        // Per-unit accumulator state, discarded when the unit yields.
        let mut current_language: Option<String> = None;
        let mut in_seg = false;
        let mut seg_text = String::new();
        let mut prop_key: Option<String> = None;
        let mut prop_text = String::new();

        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    TUV_TAG => {
                        current_language = match Self::variant_language(e) {
                            Ok(lang) => lang,
                            Err(reason) => return Some(UnitOutcome::Skipped(reason)),
                        };
                    }
                    SEG_TAG => {
                        in_seg = true;
                        seg_text.clear();
                    }
                    PROP_TAG => {
                        prop_key = match Self::prop_type(e) {
                            Ok(key) => key,
                            Err(reason) => return Some(UnitOutcome::Skipped(reason)),
                        };
                        prop_text.clear();
                    }
                    // Inline markup inside <seg> (<bpt>, <ept>, <ph>, ...):
                    // keep accumulating the text between the tags.
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == SEG_TAG {
                        if let Some(lang) = current_language.clone() {
                            unit.push_variant(lang, String::new());
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let decoded = match e.unescape() {
                        Ok(text) => text,
                        Err(err) => {
                            return Some(UnitOutcome::Skipped(Self::classify(&err)));
                        }
                    };
                    if in_seg {
                        seg_text.push_str(&decoded);
                    } else if prop_key.is_some() {
                        prop_text.push_str(&decoded);
                    }
                }
                Ok(Event::CData(e)) => {
                    let inner = e.into_inner();
                    let decoded = String::from_utf8_lossy(&inner);
                    if in_seg {
                        seg_text.push_str(&decoded);
                    } else if prop_key.is_some() {
                        prop_text.push_str(&decoded);
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    SEG_TAG => {
                        in_seg = false;
                        // A <tuv> without a language tag cannot be addressed
                        // by any selector; its segment is dropped.
                        if let Some(lang) = current_language.clone() {
                            unit.push_variant(lang, std::mem::take(&mut seg_text));
                        }
                    }
                    TUV_TAG => {
                        current_language = None;
                    }
                    PROP_TAG => {
                        if let Some(key) = prop_key.take() {
                            unit.attributes.insert(key, std::mem::take(&mut prop_text));
                        }
                    }
                    TU_TAG => {
                        if unit.is_empty() {
                            return Some(UnitOutcome::Skipped(SkipReason::EmptyUnit));
                        }
                        return Some(UnitOutcome::Unit(unit));
                    }
                    _ => {}
                },
                Ok(Event::Eof) => {
                    // Unterminated unit at end of input: discard it and end
                    // the sequence normally.
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(quick_xml::Error::Io(err)) => {
                    self.done = true;
                    return Some(UnitOutcome::Skipped(SkipReason::SourceRead(
                        err.to_string(),
                    )));
                }
                Err(err) => {
                    return Some(UnitOutcome::Skipped(Self::classify(&err)));
                }
            }
        }
    }
}

impl TmxReader<BufReader<encoding_rs_io::DecodeReaderBytes<File, Vec<u8>>>> {
    /// Opens a TMX file with BOM-aware decoding, so UTF-16 documents are
    /// transparently transcoded to UTF-8 before parsing.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);
        Ok(Self::from_reader(BufReader::new(decoder)))
    }
}

impl<R: BufRead> Iterator for TmxReader<R> {
    type Item = UnitOutcome;

    fn next(&mut self) -> Option<UnitOutcome> {
        if self.done {
            return None;
        }
        match self.scan_to_next_unit()? {
            NextUnit::Open(unit) => self.finish_unit(unit),
            NextUnit::SelfClosed => Some(UnitOutcome::Skipped(SkipReason::EmptyUnit)),
        }
    }
}
