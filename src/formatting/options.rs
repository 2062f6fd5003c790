use serde::Deserialize;

/// Settings passed through every stage of formatting a template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Options {
    /// Column limit the printer tries to keep lines within.
    pub width: usize,
    /// Spaces per level of indentation.
    pub indent: usize,
    /// Put the opening and closing tags of multi-line block openers on
    /// lines of their own, rather than aligning the Ruby after `<%`.
    pub new_line_block: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            width: 80,
            indent: 2,
            new_line_block: false,
        }
    }
}
