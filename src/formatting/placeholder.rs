//! Locate placeholder tokens inside formatted markup text.

use crate::patterns::regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    pub id: &'t str,
    pub start: usize,
    pub end: usize,
}

/// Find every `#~N~#` token in the text, left to right, without overlaps.
/// Text containing no tokens gives back an empty (unallocated) Vec.
pub fn find_placeholders(text: &str) -> Vec<Placeholder<'_>> {
    regex!(r"#~\d+~#")
        .find_iter(text)
        .map(|found| Placeholder {
            id: found.as_str(),
            start: found.start(),
            end: found.end(),
        })
        .collect()
}
