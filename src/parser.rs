//! NZB parsing entry points

use crate::config::ParseConfig;
use crate::extract::{Malformed, extract_files, extract_meta};
use crate::nzb::Nzb;
use crate::xml::{self, XmlError};
use crate::{NzbError, Result};
use tracing::{debug, warn};

impl From<XmlError> for NzbError {
    fn from(err: XmlError) -> Self {
        NzbError::InvalidDocument(err.to_string())
    }
}

impl From<Malformed> for NzbError {
    fn from(err: Malformed) -> Self {
        NzbError::InvalidDocument(err.to_string())
    }
}

/// NZB parser with a fixed [`ParseConfig`]
///
/// Holds no state between calls; every call returns a freshly built [`Nzb`].
///
/// # Example
///
/// ```
/// use nzb_rs::{NzbParser, ParseConfig};
///
/// let xml = r#"<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
///   <file poster="user@example.com" date="1234567890" subject="&quot;data.bin&quot; (1/1)">
///     <groups><group>alt.binaries.test</group></groups>
///     <segments>
///       <segment bytes="768000" number="1">part1of1@example.com</segment>
///       <segment bytes="oops" number="2">part2of2@example.com</segment>
///     </segments>
///   </file>
/// </nzb>"#;
///
/// // The default parser skips the broken segment
/// let nzb = NzbParser::default().parse(xml).unwrap();
/// assert_eq!(nzb.file().segments().len(), 1);
///
/// // A strict parser rejects the document
/// assert!(NzbParser::new(ParseConfig::strict()).parse(xml).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NzbParser {
    config: ParseConfig,
}

impl NzbParser {
    /// Create a parser using `config`
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse an NZB document
    ///
    /// Returns [`NzbError::InvalidDocument`] if the text is not well-formed
    /// XML or lacks the NZB skeleton (files, groups, at least one valid
    /// segment per file).
    pub fn parse(&self, xml: &str) -> Result<Nzb> {
        self.build(xml).inspect_err(|e| warn!("Rejecting NZB document: {}", e))
    }

    fn build(&self, xml: &str) -> Result<Nzb> {
        let root = xml::parse(xml)?;

        let meta = extract_meta(&root);
        let files = extract_files(&root, &self.config)?;
        let nzb = Nzb::new(meta, files)?;

        debug!(
            "Parsed NZB: {} files, {} segments, {} bytes",
            nzb.files().len(),
            nzb.segment_count(),
            nzb.size()
        );

        Ok(nzb)
    }
}

/// Parse an NZB document with the default (lenient) configuration
///
/// # Arguments
/// * `xml` - NZB file contents as string
///
/// # Returns
/// Parsed `Nzb` or [`NzbError::InvalidDocument`]
///
/// # Example
/// ```
/// let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
/// <!DOCTYPE nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd">
/// <nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
///   <head>
///     <meta type="title">Example File</meta>
///   </head>
///   <file poster="user@example.com" date="1234567890" subject="Example - example.part1.rar (1/1)">
///     <groups>
///       <group>alt.binaries.test</group>
///     </groups>
///     <segments>
///       <segment bytes="768000" number="1">part1of1@example.com</segment>
///     </segments>
///   </file>
/// </nzb>"#;
///
/// let nzb = nzb_rs::parse(xml).unwrap();
/// assert_eq!(nzb.meta().title(), Some("Example File"));
/// assert_eq!(nzb.file().name(), "Example - example.part1.rar");
/// assert_eq!(nzb.size(), 768000);
/// ```
pub fn parse(xml: &str) -> Result<Nzb> {
    NzbParser::default().parse(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC_EXAMPLE: &str = r#"<?xml version="1.0" encoding="iso-8859-1" ?>
<!DOCTYPE nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd">
<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
    <head>
        <meta type="title">Your File!</meta>
        <meta type="password">secret</meta>
        <meta type="tag">HD</meta>
        <meta type="category">TV</meta>
    </head>
    <file poster="Joe Bloggs &lt;bloggs@nowhere.example&gt;" date="1071674882" subject="Here's your file!  abc-mr2a.r01 (1/2)">
        <groups>
            <group>alt.binaries.newzbin</group>
            <group>alt.binaries.mojo</group>
        </groups>
        <segments>
            <segment bytes="102394" number="1">123456789abcdef@news.newzbin.com</segment>
            <segment bytes="4501" number="2">987654321fedbca@news.newzbin.com</segment>
        </segments>
    </file>
</nzb>"#;

    #[test]
    fn test_parse_spec_example() {
        let nzb = parse(SPEC_EXAMPLE).unwrap();

        assert_eq!(nzb.meta().title(), Some("Your File!"));
        assert_eq!(nzb.meta().password(), Some("secret"));
        assert_eq!(nzb.meta().tag(), Some("HD"));
        assert_eq!(nzb.meta().category(), Some("TV"));
        assert_eq!(nzb.files().len(), 1);
        assert_eq!(nzb.file().name(), "abc-mr2a.r01");
        assert_eq!(nzb.file().poster(), "Joe Bloggs <bloggs@nowhere.example>");
        assert_eq!(nzb.size(), 106895);
        assert_eq!(nzb.groups(), ["alt.binaries.mojo", "alt.binaries.newzbin"]);
        assert_eq!(nzb.par2_size(), 0);
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(SPEC_EXAMPLE).unwrap(), parse(SPEC_EXAMPLE).unwrap());
    }

    #[test]
    fn test_invalid_xml() {
        let truncated = SPEC_EXAMPLE.trim_end().trim_end_matches("</nzb>");
        let err = parse(truncated).unwrap_err();
        assert!(matches!(err, NzbError::InvalidDocument(ref msg) if msg.contains("Unclosed")));
    }

    #[test]
    fn test_valid_xml_invalid_nzb() {
        let xml = r#"<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
            <head><meta type="title">Your File!</meta></head>
            <file poster="p" date="1071674882" subject="s">
                <groups><group>alt.binaries.newzbin</group></groups>
            </file>
        </nzb>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, NzbError::InvalidDocument(ref msg) if msg.contains("<segments>")));
    }

    #[test]
    fn test_parser_config() {
        let parser = NzbParser::new(ParseConfig::strict());
        assert_eq!(parser.config(), &ParseConfig::strict());
        assert!(parser.parse(SPEC_EXAMPLE).is_ok());
    }
}
