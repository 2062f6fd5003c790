//! Regular expressions compiled once and shared across the crate

/// Compile the pattern on first use and hand back the cached `Regex`.
macro_rules! regex {
    ($pattern:expr) => {{
        static REGEX: std::sync::OnceLock<::regex::Regex> = std::sync::OnceLock::new();
        REGEX.get_or_init(|| match ::regex::Regex::new($pattern) {
            Ok(regex) => regex,
            Err(error) => panic!("invalid pattern {}: {}", $pattern, error),
        })
    }};
}

pub(crate) use regex;
