//! NZB document model
//!
//! NZB is an XML-based file format used to describe Usenet binary posts.
//! The types here are immutable snapshots built by the parser: every
//! derived value (file size and name, document totals, the main file) is
//! computed once in the constructor and exposed read-only. With the
//! `serde` feature, deserialization goes through the same constructors, so
//! derived values in the input are recomputed rather than trusted.
//!
//! Reference: https://sabnzbd.org/wiki/extra/nzb-spec

use crate::subject::{derive_name, is_par2};
use crate::{NzbError, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

/// Document metadata from the `<head>` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "serde_fields::NzbMetaFields")
)]
pub struct NzbMeta {
    title: Option<String>,
    passwords: Vec<String>,
    tags: Vec<String>,
    category: Option<String>,
}

impl NzbMeta {
    /// Create metadata, dropping repeated passwords and tags
    ///
    /// The first occurrence of each password/tag keeps its position.
    pub fn new(
        title: Option<String>,
        passwords: Vec<String>,
        tags: Vec<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            title,
            passwords: dedup_in_order(passwords),
            tags: dedup_in_order(tags),
            category,
        }
    }

    /// Title of the post, if given
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// All archive passwords in document order
    pub fn passwords(&self) -> &[String] {
        &self.passwords
    }

    /// All tags in document order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Category, if given
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// First password
    pub fn password(&self) -> Option<&str> {
        self.passwords.first().map(String::as_str)
    }

    /// First tag
    pub fn tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// True if no metadata at all was present
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.passwords.is_empty()
            && self.tags.is_empty()
            && self.category.is_none()
    }
}

fn dedup_in_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// A segment (article) of a file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NzbSegment {
    size: u64,
    number: u32,
    message_id: String,
}

impl NzbSegment {
    /// Create a segment from its byte count, 1-based part number and message-id
    pub fn new(size: u64, number: u32, message_id: impl Into<String>) -> Self {
        Self {
            size,
            number,
            message_id: message_id.into(),
        }
    }

    /// Size of this segment in bytes, as claimed by the NZB
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Segment number (1-based)
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Message-ID for retrieving this segment
    pub fn message_id(&self) -> &str {
        &self.message_id
    }
}

/// A single file entry in an NZB
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "serde_fields::NzbFileFields")
)]
pub struct NzbFile {
    poster: String,
    datetime: DateTime<Utc>,
    subject: String,
    groups: Vec<String>,
    segments: Vec<NzbSegment>,
    size: u64,
    name: String,
}

impl NzbFile {
    /// Create a file entry
    ///
    /// Groups are deduplicated and sorted, segments are sorted by number
    /// (segments sharing a number are all kept, in their given order).
    /// `size` and `name` are derived here.
    pub fn new(
        poster: impl Into<String>,
        datetime: DateTime<Utc>,
        subject: impl Into<String>,
        groups: Vec<String>,
        mut segments: Vec<NzbSegment>,
    ) -> Self {
        let subject = subject.into();
        let groups: Vec<String> = groups.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        segments.sort_by_key(|s| s.number);

        let size = segments.iter().map(|s| s.size).sum();
        let name = derive_name(&subject);

        Self {
            poster: poster.into(),
            datetime,
            subject,
            groups,
            segments,
            size,
            name,
        }
    }

    /// Poster name/email, unparsed
    pub fn poster(&self) -> &str {
        &self.poster
    }

    /// Posting date
    pub fn datetime(&self) -> DateTime<Utc> {
        self.datetime
    }

    /// Posting date as Unix seconds
    pub fn timestamp(&self) -> i64 {
        self.datetime.timestamp()
    }

    /// Subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Newsgroups where this file was posted, sorted
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Segments (parts) of this file, ordered by number
    pub fn segments(&self) -> &[NzbSegment] {
        &self.segments
    }

    /// Total size of all segments
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Filename derived from the subject (empty if none could be found)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this file is a PAR2 volume
    pub fn is_par2(&self) -> bool {
        is_par2(&self.name)
    }

    /// Get missing segment numbers (if any)
    pub fn missing_segments(&self) -> Vec<u32> {
        let Some(max_number) = self.segments.iter().map(|s| s.number).max() else {
            return vec![];
        };

        let seen: HashSet<u32> = self.segments.iter().map(|s| s.number).collect();
        (1..=max_number).filter(|i| !seen.contains(i)).collect()
    }
}

/// A parsed NZB document
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "serde_fields::NzbFields")
)]
pub struct Nzb {
    meta: NzbMeta,
    files: Vec<NzbFile>,
    main_file: usize,
    size: u64,
    names: Vec<String>,
    posters: Vec<String>,
    groups: Vec<String>,
    par2_size: u64,
}

impl Nzb {
    /// Build a document from its metadata and files
    ///
    /// Files are kept in the given order. The main file is the largest one;
    /// on a tie the earliest file wins.
    ///
    /// Returns an error if `files` is empty.
    pub fn new(meta: NzbMeta, files: Vec<NzbFile>) -> Result<Self> {
        if files.is_empty() {
            return Err(NzbError::InvalidDocument("NZB has no files".to_string()));
        }

        let mut main_file = 0;
        for (i, file) in files.iter().enumerate() {
            if file.size > files[main_file].size {
                main_file = i;
            }
        }

        let size = files.iter().map(|f| f.size).sum();
        let par2_size = files.iter().filter(|f| f.is_par2()).map(|f| f.size).sum();
        let names = sorted_set(files.iter().map(|f| f.name.as_str()));
        let posters = sorted_set(files.iter().map(|f| f.poster.as_str()));
        let groups = sorted_set(files.iter().flat_map(|f| f.groups.iter().map(String::as_str)));

        Ok(Self {
            meta,
            files,
            main_file,
            size,
            names,
            posters,
            groups,
            par2_size,
        })
    }

    /// Metadata from the `<head>` section
    pub fn meta(&self) -> &NzbMeta {
        &self.meta
    }

    /// All files, ordered by subject
    pub fn files(&self) -> &[NzbFile] {
        &self.files
    }

    /// The main file: the largest file in the document
    pub fn file(&self) -> &NzbFile {
        &self.files[self.main_file]
    }

    /// Total size of all files
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Distinct derived filenames, sorted
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Distinct posters, sorted
    pub fn posters(&self) -> &[String] {
        &self.posters
    }

    /// Distinct newsgroups across all files, sorted
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Total size of all PAR2 volumes
    pub fn par2_size(&self) -> u64 {
        self.par2_size
    }

    /// Files whose derived name ends in `.par2`
    pub fn par2_files(&self) -> impl Iterator<Item = &NzbFile> {
        self.files.iter().filter(|f| f.is_par2())
    }

    /// Number of segments across all files
    pub fn segment_count(&self) -> usize {
        self.files.iter().map(|f| f.segments.len()).sum()
    }
}

fn sorted_set<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Source fields accepted when deserializing the model
#[cfg(feature = "serde")]
mod serde_fields {
    use super::{Nzb, NzbFile, NzbMeta, NzbSegment};
    use crate::NzbError;
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct NzbMetaFields {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        passwords: Vec<String>,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        category: Option<String>,
    }

    impl From<NzbMetaFields> for NzbMeta {
        fn from(f: NzbMetaFields) -> Self {
            NzbMeta::new(f.title, f.passwords, f.tags, f.category)
        }
    }

    #[derive(Deserialize)]
    pub struct NzbFileFields {
        poster: String,
        datetime: DateTime<Utc>,
        subject: String,
        groups: Vec<String>,
        segments: Vec<NzbSegment>,
    }

    impl From<NzbFileFields> for NzbFile {
        fn from(f: NzbFileFields) -> Self {
            NzbFile::new(f.poster, f.datetime, f.subject, f.groups, f.segments)
        }
    }

    #[derive(Deserialize)]
    pub struct NzbFields {
        #[serde(default)]
        meta: NzbMeta,
        files: Vec<NzbFile>,
    }

    impl TryFrom<NzbFields> for Nzb {
        type Error = NzbError;

        fn try_from(f: NzbFields) -> Result<Self, Self::Error> {
            Nzb::new(f.meta, f.files)
        }
    }
}
