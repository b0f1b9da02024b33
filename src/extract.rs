//! Extraction of the NZB model from a parsed XML tree
//!
//! Two failure channels are kept apart here. Structural problems (no
//! `<file>`, a file without `<groups>` or without any usable segment) are
//! [`Malformed`] and abort the parse. Problems with a single `<segment>` or
//! `<meta>` entry are local: the entry is skipped and parsing continues,
//! unless [`ParseConfig::lenient_segments`] is off.

use crate::config::ParseConfig;
use crate::nzb::{NzbFile, NzbMeta, NzbSegment};
use crate::subject::compare_subjects;
use crate::xml::Element;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, trace};

/// Well-formed XML that breaks the NZB structure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Malformed {
    #[error("Missing or malformed <file>...</file>!")]
    NoFiles,

    #[error("Missing or malformed <groups>...</groups>!")]
    NoGroups,

    #[error("Missing or malformed <segments>...</segments>!")]
    NoSegments,

    #[error("No valid <segment> in file {0:?}")]
    NoValidSegments(String),

    #[error("Invalid segment in file {subject:?}: {reason}")]
    InvalidSegment { subject: String, reason: String },

    #[error("Missing {0} attribute on <file>")]
    MissingAttribute(&'static str),

    #[error("Invalid date attribute on <file>: {0:?}")]
    InvalidDate(String),
}

/// Read the `<head><meta>` entries of the document
///
/// Never fails: unknown or untyped entries are ignored.
pub(crate) fn extract_meta(root: &Element) -> NzbMeta {
    let Some(head) = root.child("head").filter(|_| root.name() == "nzb") else {
        return NzbMeta::default();
    };

    let mut title = None;
    let mut passwords = Vec::new();
    let mut tags = Vec::new();
    let mut category = None;

    for item in head.children_named("meta") {
        let Some(kind) = item.attr("type") else {
            continue;
        };
        let text = item.text();

        match kind.to_lowercase().as_str() {
            "title" => title = non_empty(text),
            "password" => passwords.extend(non_empty(text)),
            "tag" => tags.extend(non_empty(text.trim())),
            "category" => category = non_empty(text),
            other => debug!("Ignoring <meta> of unknown type {:?}", other),
        }
    }

    NzbMeta::new(title, passwords, tags, category)
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Read every `<file>` of the document, ordered by subject
pub(crate) fn extract_files(
    root: &Element,
    config: &ParseConfig,
) -> Result<Vec<NzbFile>, Malformed> {
    if root.name() != "nzb" {
        return Err(Malformed::NoFiles);
    }

    let mut files = root
        .children_named("file")
        .map(|file| extract_file(file, config))
        .collect::<Result<Vec<_>, _>>()?;

    if files.is_empty() {
        return Err(Malformed::NoFiles);
    }

    files.sort_by(|a, b| compare_subjects(a.subject(), b.subject()));
    Ok(files)
}

fn extract_file(file: &Element, config: &ParseConfig) -> Result<NzbFile, Malformed> {
    let poster = file
        .attr("poster")
        .ok_or(Malformed::MissingAttribute("poster"))?;
    let subject = file
        .attr("subject")
        .ok_or(Malformed::MissingAttribute("subject"))?;
    let datetime = parse_date(file.attr("date").unwrap_or_default())?;

    trace!("Extracting file {:?}", subject);

    let groups = extract_groups(file)?;
    let segments = extract_segments(file, subject, config)?;
    if segments.is_empty() {
        return Err(Malformed::NoValidSegments(subject.to_string()));
    }

    Ok(NzbFile::new(poster, datetime, subject, groups, segments))
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, Malformed> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| Malformed::InvalidDate(raw.to_string()))
}

/// Newsgroup names of a `<file>`; deduplication and sorting happen in [`NzbFile::new`]
///
/// An empty `<group/>` still counts as a group and yields `""`.
fn extract_groups(file: &Element) -> Result<Vec<String>, Malformed> {
    let groups: Vec<String> = file
        .child("groups")
        .ok_or(Malformed::NoGroups)?
        .children_named("group")
        .map(|g| g.text().to_string())
        .collect();

    if groups.is_empty() {
        return Err(Malformed::NoGroups);
    }

    Ok(groups)
}

/// Segments of a `<file>`, ordered by number
///
/// Fails if there is no `<segment>` element at all. Individual malformed
/// segments are dropped in lenient mode, so the result may be empty.
fn extract_segments(
    file: &Element,
    subject: &str,
    config: &ParseConfig,
) -> Result<Vec<NzbSegment>, Malformed> {
    let entries: Vec<&Element> = file
        .child("segments")
        .map(|s| s.children_named("segment").collect())
        .unwrap_or_default();

    if entries.is_empty() {
        return Err(Malformed::NoSegments);
    }

    let mut segments = Vec::with_capacity(entries.len());
    for entry in entries {
        match build_segment(entry, config) {
            Ok(segment) => segments.push(segment),
            Err(reason) if config.lenient_segments => {
                debug!("Dropping segment of {:?}: {}", subject, reason);
            }
            Err(reason) => {
                return Err(Malformed::InvalidSegment {
                    subject: subject.to_string(),
                    reason,
                });
            }
        }
    }

    segments.sort_by_key(NzbSegment::number);
    Ok(segments)
}

/// Build one segment, or explain why the entry is unusable
fn build_segment(entry: &Element, config: &ParseConfig) -> Result<NzbSegment, String> {
    let size = parse_number::<u64>(entry, "bytes")?;
    let number = parse_number::<u32>(entry, "number")?;

    let message_id = entry.text();
    if message_id.is_empty() {
        return Err(format!("segment {} has no message-id", number));
    }
    if config.check_message_ids && !looks_like_message_id(message_id) {
        return Err(format!("segment {} has invalid message-id {:?}", number, message_id));
    }

    Ok(NzbSegment::new(size, number, message_id))
}

fn parse_number<T: std::str::FromStr>(entry: &Element, key: &str) -> Result<T, String> {
    let raw = entry
        .attr(key)
        .ok_or_else(|| format!("missing {} attribute", key))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {} attribute {:?}", key, raw))
}

/// `local@domain`, optionally in angle brackets, without whitespace
fn looks_like_message_id(id: &str) -> bool {
    let id = id
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(id);

    match id.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !id.chars().any(|c| c.is_whitespace() || c.is_control())
        }
        None => false,
    }
}
