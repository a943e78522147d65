//! NFO metadata record store
//!
//! Loads `.nfo` XML documents into [`NfoRecord`]s and writes them back.
//!
//! Rendering is a streaming rewrite of the original document: every event the
//! store does not own (unknown elements, attributes, comments, whitespace) is
//! written back as it was read. Only the first `title` / `episode` child of the
//! root is touched, and only when the record carries an edit for it. The XML
//! declaration is re-emitted on every write.

use crate::models::{ManagedField, NfoRecord};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Record store errors
#[derive(Debug, Error)]
pub enum NfoError {
    /// Metadata file does not exist
    #[error("Metadata file not found: {0}")]
    NotFound(PathBuf),

    /// File is not well-formed XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// Read or write failure other than a missing file
    #[error("I/O error {0}: {1}")]
    Io(PathBuf, String),

    /// Serialization failure
    #[error("Write error: {0}")]
    Write(String),
}

const ANILIST_ID_TAG: &str = "anilistid";

/// Reads and writes metadata records on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct NfoStore;

impl NfoStore {
    pub fn new() -> Self {
        Self
    }

    /// Load and parse the metadata file at `path`
    pub fn load(&self, path: &Path) -> Result<NfoRecord, NfoError> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NfoError::NotFound(path.to_path_buf())
            } else {
                NfoError::Io(path.to_path_buf(), e.to_string())
            }
        })?;

        let source = String::from_utf8(bytes)
            .map_err(|e| NfoError::Parse(format!("invalid UTF-8: {}", e)))?;

        let source = match source.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => source,
        };

        parse_record(source)
    }

    /// Render `record` and replace the file at `path` with it
    ///
    /// The new content is written to a hidden sibling file and renamed over the
    /// target, so an interrupted write leaves the previous file in place.
    pub fn save(&self, path: &Path, record: &NfoRecord) -> Result<(), NfoError> {
        let rendered = self.render(record)?;
        self.save_rendered(path, &rendered)
    }

    /// Replace the file at `path` with an already rendered document
    pub fn save_rendered(&self, path: &Path, document: &str) -> Result<(), NfoError> {
        write_replacing(path, document.as_bytes())
    }

    /// Render `record` to document text without touching disk
    pub fn render(&self, record: &NfoRecord) -> Result<String, NfoError> {
        render_record(record)
    }
}

fn parse_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> NfoError {
    NfoError::Parse(format!("{} (at byte {})", err, reader.buffer_position()))
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Which root child is currently being captured during parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Captured {
    Managed(ManagedField),
    AnilistId,
}

impl Captured {
    fn from_tag(tag: &str) -> Option<Self> {
        if tag == ANILIST_ID_TAG {
            return Some(Captured::AnilistId);
        }
        ManagedField::from_tag(tag).map(Captured::Managed)
    }
}

#[derive(Default)]
struct ParsedFields {
    title: Option<String>,
    episode: Option<String>,
    anilist_id: Option<String>,
}

impl ParsedFields {
    fn slot(&mut self, which: Captured) -> &mut Option<String> {
        match which {
            Captured::Managed(ManagedField::Title) => &mut self.title,
            Captured::Managed(ManagedField::Episode) => &mut self.episode,
            Captured::AnilistId => &mut self.anilist_id,
        }
    }
}

pub(crate) fn parse_record(source: String) -> Result<NfoRecord, NfoError> {
    let mut fields = ParsedFields::default();
    let mut root_tag: Option<String> = None;

    {
        let mut reader = Reader::from_str(&source);
        let mut depth = 0usize;
        // (field, accumulated text, element depth)
        let mut capture: Option<(Captured, String, usize)> = None;

        loop {
            match reader.read_event().map_err(|e| parse_error(&reader, e))? {
                Event::Start(e) => {
                    let name = tag_name(e.name().as_ref());
                    depth += 1;
                    if depth == 1 {
                        if root_tag.is_some() {
                            return Err(NfoError::Parse(format!(
                                "unexpected second root element <{}>",
                                name
                            )));
                        }
                        root_tag = Some(name);
                    } else if depth == 2 && capture.is_none() {
                        if let Some(which) = Captured::from_tag(&name) {
                            if fields.slot(which).is_none() {
                                capture = Some((which, String::new(), depth));
                            }
                        }
                    }
                }
                Event::Empty(e) => {
                    let name = tag_name(e.name().as_ref());
                    if depth == 0 {
                        if root_tag.is_some() {
                            return Err(NfoError::Parse(format!(
                                "unexpected second root element <{}/>",
                                name
                            )));
                        }
                        root_tag = Some(name);
                    } else if depth == 1 {
                        if let Some(which) = Captured::from_tag(&name) {
                            let slot = fields.slot(which);
                            if slot.is_none() {
                                *slot = Some(String::new());
                            }
                        }
                    }
                }
                Event::End(_) => {
                    if let Some((which, text, at)) = capture.take() {
                        if at == depth {
                            *fields.slot(which) = Some(text);
                        } else {
                            capture = Some((which, text, at));
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Text(e) => {
                    if let Some((_, text, _)) = capture.as_mut() {
                        let unescaped = e.unescape().map_err(|e| parse_error(&reader, e))?;
                        text.push_str(&unescaped);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, text, _)) = capture.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(NfoError::Parse(format!(
                "unexpected end of document ({} unclosed element(s))",
                depth
            )));
        }
    }

    let root_tag = root_tag.ok_or_else(|| NfoError::Parse("no root element".to_string()))?;

    Ok(NfoRecord::new(
        source,
        root_tag,
        fields.title,
        fields.episode,
        fields.anilist_id,
    ))
}

fn field_index(field: ManagedField) -> usize {
    match field {
        ManagedField::Title => 0,
        ManagedField::Episode => 1,
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), NfoError> {
    writer
        .write_event(event)
        .map_err(|e| NfoError::Write(e.to_string()))
}

/// Field text with markup characters escaped; quotes are left as-is
fn field_text(text: &str) -> Event<'_> {
    Event::Text(BytesText::from_escaped(partial_escape(text)))
}

fn write_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), NfoError> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write(writer, field_text(text))?;
    write(writer, Event::End(BytesEnd::new(tag)))
}

/// Edit to apply to a root child, if it is the first occurrence of an edited field
fn pending_edit<'r>(
    record: &'r NfoRecord,
    element: &BytesStart<'_>,
    replaced: &[bool; 2],
) -> Option<(ManagedField, &'r str)> {
    let field = ManagedField::from_tag(&tag_name(element.name().as_ref()))?;
    if replaced[field_index(field)] {
        return None;
    }
    record.edit(field).map(|text| (field, text))
}

/// Append edited fields that had no element in the source, in stable order
fn append_missing(
    writer: &mut Writer<Vec<u8>>,
    record: &NfoRecord,
    replaced: &mut [bool; 2],
) -> Result<(), NfoError> {
    for field in ManagedField::ALL {
        let idx = field_index(field);
        if replaced[idx] {
            continue;
        }
        if let Some(text) = record.edit(field) {
            write_element(writer, field.tag(), text)?;
            replaced[idx] = true;
        }
    }
    Ok(())
}

pub(crate) fn render_record(record: &NfoRecord) -> Result<String, NfoError> {
    let source = record.source();
    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Vec::with_capacity(source.len() + 64));

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    if !source.starts_with("<?xml") {
        write(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
    }

    let mut replaced = [false; 2];
    let mut depth = 0usize;
    // Depth of a managed element whose original content is being dropped
    let mut skip_until: Option<usize> = None;

    loop {
        let event = reader.read_event().map_err(|e| parse_error(&reader, e))?;

        if let Some(target) = skip_until {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(e) => {
                    if depth == target {
                        write(&mut writer, Event::End(e))?;
                        skip_until = None;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => {
                    return Err(NfoError::Parse("unexpected end of document".to_string()))
                }
                _ => {}
            }
            continue;
        }

        match event {
            // Replaced by the canonical declaration written above
            Event::Decl(_) => {}
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    if let Some((field, text)) = pending_edit(record, &e, &replaced) {
                        replaced[field_index(field)] = true;
                        write(&mut writer, Event::Start(e))?;
                        write(&mut writer, field_text(text))?;
                        skip_until = Some(depth);
                        continue;
                    }
                }
                write(&mut writer, Event::Start(e))?;
            }
            Event::Empty(e) => {
                if depth == 1 {
                    if let Some((field, text)) = pending_edit(record, &e, &replaced) {
                        replaced[field_index(field)] = true;
                        let end = e.to_end().into_owned();
                        write(&mut writer, Event::Start(e))?;
                        write(&mut writer, field_text(text))?;
                        write(&mut writer, Event::End(end))?;
                        continue;
                    }
                } else if depth == 0 && record.is_modified() {
                    let end = e.to_end().into_owned();
                    write(&mut writer, Event::Start(e))?;
                    append_missing(&mut writer, record, &mut replaced)?;
                    write(&mut writer, Event::End(end))?;
                    continue;
                }
                write(&mut writer, Event::Empty(e))?;
            }
            Event::End(e) => {
                if depth == 1 {
                    append_missing(&mut writer, record, &mut replaced)?;
                }
                depth = depth.saturating_sub(1);
                write(&mut writer, Event::End(e))?;
            }
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| NfoError::Write(e.to_string()))
}

fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), NfoError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| NfoError::Write(format!("not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp_path, bytes)
        .map_err(|e| NfoError::Io(temp_path.clone(), e.to_string()))?;

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(NfoError::Io(path.to_path_buf(), e.to_string()));
    }

    Ok(())
}
