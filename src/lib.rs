//! Formatter for ERB templates: HTML with embedded Ruby.
//!
//! Parsing replaces every ERB tag with a placeholder token, leaving markup
//! the HTML formatter can handle on its own. The Ruby inside each tag is
//! formatted separately, and the results are spliced back in where the
//! placeholders ended up.

mod patterns;

pub mod config;
pub mod delegates;
pub mod formatting;
pub mod language;
pub mod parsing;
