use std::fmt;

/// Scheme prepended to destinations that carry none
const DEFAULT_SCHEME: &str = "http://";

/// Prefixes removed when deriving artifact names
const SCHEME_PREFIXES: &[&str] = &["http://", "https://"];

/// Single-level domain suffix removed when deriving artifact names
const ONION_SUFFIX: &str = ".onion";

/// Replacement for path separators in artifact names
const SEPARATOR_PLACEHOLDER: &str = "_";

/// One destination to crawl
///
/// Keeps the string exactly as it appeared in the target list (used in the
/// outcome log) next to the normalized URL handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    original: String,
    url: String,
}

impl Destination {
    /// Creates a destination from a raw target string
    ///
    /// Returns None when the string is empty after trimming.
    ///
    /// # Examples
    ///
    /// ```
    /// use onion_lens::Destination;
    ///
    /// let dest = Destination::new("example.onion").unwrap();
    /// assert_eq!(dest.url(), "http://example.onion");
    /// assert_eq!(dest.as_str(), "example.onion");
    ///
    /// assert!(Destination::new("   ").is_none());
    /// ```
    pub fn new(raw: &str) -> Option<Self> {
        let original = raw.trim();
        if original.is_empty() {
            return None;
        }

        Some(Self {
            original: original.to_string(),
            url: normalize_destination(original),
        })
    }

    /// The destination as written in the target list
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// The destination with an explicit scheme
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Artifact base name for this destination
    pub fn safe_name(&self) -> String {
        safe_name(&self.url)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Gives a destination an explicit scheme
///
/// Destinations already starting with `http://` or `https://` (in any case)
/// are returned unchanged; anything else gets `http://` prepended.
///
/// # Examples
///
/// ```
/// use onion_lens::target::normalize_destination;
///
/// assert_eq!(normalize_destination("abc.onion"), "http://abc.onion");
/// assert_eq!(normalize_destination("https://abc.onion/x"), "https://abc.onion/x");
/// ```
pub fn normalize_destination(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    if SCHEME_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    }
}

/// Derives the filesystem-safe artifact name for a destination
///
/// # Derivation Steps
///
/// 1. Remove every `http://` and `https://`, in any letter case
/// 2. Remove every `.onion`, in any letter case
/// 3. Replace every `/` with `_`
///
/// The mapping is pure and deterministic but not injective: two destinations
/// that reduce to the same name share (and overwrite) one artifact set.
///
/// # Examples
///
/// ```
/// use onion_lens::safe_name;
///
/// assert_eq!(safe_name("https://example.onion/a/b"), "example_a_b");
/// assert_eq!(safe_name("http://abc.onion"), "abc");
/// ```
pub fn safe_name(url: &str) -> String {
    let mut safe = url.to_string();
    for prefix in SCHEME_PREFIXES {
        safe = remove_ignore_ascii_case(&safe, prefix);
    }
    remove_ignore_ascii_case(&safe, ONION_SUFFIX).replace('/', SEPARATOR_PLACEHOLDER)
}

/// Removes every occurrence of a lowercase ASCII `needle`, ignoring case
fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the original
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut pos = 0;

    while let Some(found) = lower[pos..].find(needle) {
        out.push_str(&haystack[pos..pos + found]);
        pos += found + needle.len();
    }
    out.push_str(&haystack[pos..]);
    out
}
