//! Filename extraction from Usenet subject lines
//!
//! Subjects are free text. Most posting tools wrap the real filename in
//! double quotes (`[1/5] - "file.mkv" yEnc (1/24)`); some only embed it as a
//! bare token (`Here's your file!  abc-mr2a.r01 (1/2)`). The quoted form is
//! tried first, then the bare filename token.
//!
//! Files are ordered by subject with [`compare_subjects`].

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// First `"..."` pair in the subject.
fn quoted_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("valid quoted-name regex"))
}

/// Bare filename token.
///
/// A run of filename-safe characters, optionally interrupted by bracketed
/// parts such as `[01/10]`, ending in `.` plus a 2-4 character
/// alphanumeric extension, between ASCII word boundaries. Non-ASCII
/// letters count as non-word characters, so `é.file.mkv` yields `file.mkv`.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?-u:\b)([0-9A-Za-z_\-+()' .,]+(?:\[[0-9A-Za-z_\-/+()' .,]*\][0-9A-Za-z_\-+()' .,]*)*\.[A-Za-z0-9]{2,4})(?-u:\b)",
        )
        .expect("valid filename-token regex")
    })
}

/// Derive a display filename from a subject line
///
/// Returns the trimmed content of the first quoted substring if there is
/// one, otherwise the first filename-shaped token, otherwise an empty
/// string.
///
/// # Examples
///
/// ```
/// use nzb_rs::derive_name;
///
/// assert_eq!(
///     derive_name(r#"[1/5] - "Big Buck Bunny - S01E01.mkv" yEnc (1/24) 16981056"#),
///     "Big Buck Bunny - S01E01.mkv"
/// );
/// assert_eq!(derive_name("Here's your file!  abc-mr2a.r01 (1/2)"), "abc-mr2a.r01");
/// assert_eq!(derive_name("nothing to see here"), "");
/// ```
pub fn derive_name(subject: &str) -> String {
    quoted_pattern()
        .captures(subject)
        .or_else(|| token_pattern().captures(subject))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Whether a derived filename names a PAR2 volume
pub fn is_par2(name: &str) -> bool {
    name.ends_with(".par2")
}

/// ASCII punctuation and symbols in collation order
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary collation weight of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
    Space,
    Punctuation(usize),
    Symbol(char),
    Digit(u32),
    Letter(char),
}

/// Collation weights of one character: base, accent, case
fn weights(c: char) -> (Primary, bool, bool) {
    if c.is_whitespace() {
        return (Primary::Space, false, false);
    }
    if let Some(index) = PUNCTUATION_ORDER.find(c) {
        return (Primary::Punctuation(index), false, false);
    }
    if let Some(digit) = c.to_digit(10) {
        return (Primary::Digit(digit), false, false);
    }
    if !c.is_alphanumeric() {
        return (Primary::Symbol(c), false, false);
    }

    let lower = c.to_lowercase().next().unwrap_or(c);
    let base = strip_accent(lower);
    (Primary::Letter(base), base != lower, lower != c)
}

/// Base letter of a lowercase Latin-1 accented letter
fn strip_accent(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

/// Order two subjects the way a root-locale collator would
///
/// Comparison runs in levels: base characters first (whitespace, then
/// punctuation, symbols, digits, letters, ignoring case and Latin-1
/// accents), then accents, then case with lowercase first. Subjects that
/// are still equal fall back to their raw text, so the order is total and
/// does not depend on the host locale.
///
/// # Examples
///
/// ```
/// use nzb_rs::subject::compare_subjects;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_subjects("a~b", "ab"), Ordering::Less);
/// assert_eq!(compare_subjects("b file", "B file"), Ordering::Less);
/// ```
pub fn compare_subjects(a: &str, b: &str) -> Ordering {
    compare_level(a, b, |c| weights(c).0)
        .then_with(|| compare_level(a, b, |c| weights(c).1))
        .then_with(|| compare_level(a, b, |c| weights(c).2))
        .then_with(|| a.cmp(b))
}

fn compare_level<K: Ord>(a: &str, b: &str, key: impl Fn(char) -> K) -> Ordering {
    a.chars().map(&key).cmp(b.chars().map(&key))
}
