//! Parser configuration

/// Configuration options for parsing behavior
///
/// Controls how tolerant the parser is of broken `<segment>` entries.
/// The structural skeleton (files, groups, at least one segment per file)
/// is always required.
///
/// # Examples
///
/// ```
/// use nzb_rs::ParseConfig;
///
/// // Lenient parsing (default): malformed segments are skipped
/// let lenient = ParseConfig::lenient();
///
/// // Strict parsing: a malformed segment rejects the document
/// let strict = ParseConfig::strict();
///
/// // Custom configuration
/// let custom = ParseConfig {
///     lenient_segments: true,
///     check_message_ids: true,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseConfig {
    /// If true, drop segments with unparsable `bytes`/`number` or an empty
    /// message-id and keep going.
    /// If false, the first such segment rejects the whole document.
    #[cfg_attr(feature = "serde", serde(default = "default_lenient"))]
    pub lenient_segments: bool,

    /// If true, also treat message-ids without an `@` or containing
    /// whitespace as malformed segments.
    #[cfg_attr(feature = "serde", serde(default))]
    pub check_message_ids: bool,
}

#[cfg(feature = "serde")]
fn default_lenient() -> bool {
    true
}

impl ParseConfig {
    /// Creates a lenient configuration
    ///
    /// - Malformed segments dropped
    /// - Message-id shape not checked
    pub fn lenient() -> Self {
        Self {
            lenient_segments: true,
            check_message_ids: false,
        }
    }

    /// Creates a strict configuration
    ///
    /// - Malformed segments reject the document
    /// - Message-ids must look like `local@domain`
    pub fn strict() -> Self {
        Self {
            lenient_segments: false,
            check_message_ids: true,
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::lenient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        assert_eq!(ParseConfig::default(), ParseConfig::lenient());
        assert!(ParseConfig::default().lenient_segments);
        assert!(!ParseConfig::default().check_message_ids);
    }

    #[test]
    fn test_strict() {
        let config = ParseConfig::strict();
        assert!(!config.lenient_segments);
        assert!(config.check_message_ids);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_defaults() {
        let config: ParseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ParseConfig::lenient());
    }
}
