use glob::{MatchOptions, Pattern, PatternError};

const CASE_INSENSITIVE: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Case-insensitive wildcard matcher for blacklist fields.
///
/// `*` matches any sequence, `?` matches a single character and every other
/// character is literal. An empty pattern matches everything.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    pattern: Option<Pattern>,
}

impl WildcardPattern {
    pub fn new(raw: &str) -> Result<Self, PatternError> {
        let raw = collapse_stars(raw.trim());
        let pattern = if raw.is_empty() {
            None
        } else {
            Some(Pattern::new(&escape_brackets(&raw))?)
        };
        Ok(Self { raw, pattern })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches_with(candidate, CASE_INSENSITIVE),
            None => true,
        }
    }

    pub fn matches_all(&self) -> bool {
        self.pattern.is_none() || self.raw == "*"
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Glob rejects `**` outside a whole path component; any run of `*` means the same as one.
fn collapse_stars(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}

/// Glob treats `[` and `]` as character classes; share names may contain them literally.
fn escape_brackets(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '[' => escaped.push_str("[[]"),
            ']' => escaped.push_str("[]]"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Lenient boolean parse. Anything unrecognised is `false`.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
