//! A built-in Ruby tidier.
//!
//! This is not a Ruby parser. It works a line at a time: whitespace runs
//! outside of literals and comments collapse to a single space, and each
//! line is reindented from how many blocks and brackets are open at that
//! point. Ruby that does not balance its `end`s is rejected.
//!
//! Strings, regexes, percent literals and heredoc bodies are carried from
//! one line to the next. A line that begins inside one of them is kept
//! exactly as written.

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::trace;

use crate::delegates::ScriptFormatter;
use crate::formatting::Options;
use crate::language::DelegateError;
use crate::patterns::regex;

/// Ruby is indented by two spaces whatever the template uses.
const INDENT: usize = 2;

pub struct Ruby;

#[async_trait]
impl ScriptFormatter for Ruby {
    async fn format_script(&self, source: &str, _: &Options) -> Result<String, DelegateError> {
        tidy(source)
    }
}

/// What one line of source amounts to once literals and comments are
/// accounted for.
#[derive(Debug, PartialEq, Eq)]
struct Line {
    text: String,
    /// Brackets opened minus brackets closed.
    balance: isize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Literal {
    /// String, command, or regex closed by the same character it opened
    /// with.
    Quoted(char),
    /// `%q(...)` and friends. Bracket delimiters nest.
    Percent { open: char, close: char, depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Heredoc {
    terminator: String,
    /// `<<~` and `<<-` allow the terminator to be indented.
    indented: bool,
}

impl Heredoc {
    fn ends_at(&self, line: &str) -> bool {
        if self.indented {
            line.trim() == self.terminator
        } else {
            line.trim_end() == self.terminator
        }
    }
}

/// Literal state carried between lines.
#[derive(Debug, Default)]
struct Lexer {
    literal: Option<Literal>,
    heredocs: VecDeque<Heredoc>,
}

impl Lexer {
    fn is_open(&self) -> bool {
        self.literal
            .is_some()
            || !self
                .heredocs
                .is_empty()
    }

    /// Take the next line. Returns whether it began inside a literal, and
    /// so has to be kept as it is, along with the line itself.
    fn feed(&mut self, raw: &str) -> (bool, Line) {
        if let Some(heredoc) = self
            .heredocs
            .front()
        {
            if heredoc.ends_at(raw) {
                self.heredocs
                    .pop_front();
            }
            let line = Line {
                text: raw.to_string(),
                balance: 0,
            };
            return (true, line);
        }

        let continued = self
            .literal
            .is_some();
        (continued, self.scan(raw))
    }

    /// Collapse whitespace outside of literals and measure bracket
    /// balance, picking up whatever literal is still open from the line
    /// before.
    fn scan(&mut self, line: &str) -> Line {
        let chars: Vec<char> = line
            .chars()
            .collect();
        let mut text = String::with_capacity(line.len());
        let mut balance = 0;
        let mut escaped = false;
        let mut space = false;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            if let Some(literal) = &mut self.literal {
                text.push(c);
                i += 1;
                if escaped {
                    escaped = false;
                    continue;
                }
                if c == '\\' {
                    escaped = true;
                    continue;
                }
                let closed = match literal {
                    Literal::Quoted(quote) => c == *quote,
                    Literal::Percent { open, close, depth } => {
                        if c == *close && *depth > 0 {
                            *depth -= 1;
                            false
                        } else if c == *close {
                            true
                        } else {
                            if c == *open && *open != *close {
                                *depth += 1;
                            }
                            false
                        }
                    }
                };
                if closed {
                    self.literal = None;
                }
                continue;
            }

            if c.is_whitespace() {
                space = true;
                i += 1;
                continue;
            }
            if space && !text.is_empty() {
                text.push(' ');
            }
            space = false;

            match c {
                '#' => {
                    // comment runs to the end of the line, untouched
                    text.extend(&chars[i..]);
                    break;
                }
                '"' | '\'' | '`' => self.literal = Some(Literal::Quoted(c)),
                '/' if operand_expected(&text) => self.literal = Some(Literal::Quoted('/')),
                '%' if operand_expected(&text) => {
                    if let Some((width, literal)) = percent_literal(&chars[i + 1..]) {
                        text.extend(&chars[i..=i + width]);
                        i += width + 1;
                        self.literal = Some(literal);
                        continue;
                    }
                }
                '<' => {
                    if let Some((width, heredoc)) = heredoc_start(&chars[i..]) {
                        text.extend(&chars[i..i + width]);
                        i += width;
                        self.heredocs
                            .push_back(heredoc);
                        continue;
                    }
                }
                '(' | '[' | '{' => balance += 1,
                ')' | ']' | '}' => balance -= 1,
                _ => {}
            }
            text.push(c);
            i += 1;
        }

        // whitespace at the end of a line still inside a literal belongs
        // to the literal
        let text = if self
            .literal
            .is_some()
        {
            text
        } else {
            text.trim_end()
                .to_string()
        };

        Line { text, balance }
    }
}

/// Would a `/` or `%` here begin a literal rather than divide?
fn operand_expected(before: &str) -> bool {
    let before = before.trim_end();
    match before
        .chars()
        .last()
    {
        None => true,
        Some(c) if c.is_alphanumeric() || c == '_' => {
            let word = before
                .rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or("");
            matches!(
                word,
                "if" | "unless" | "elsif" | "when" | "while" | "until" | "and" | "or" | "not"
                    | "return" | "in"
            )
        }
        Some(c) => !matches!(c, ')' | ']' | '}' | '"' | '\'' | '`' | '?'),
    }
}

/// Recognize the rest of a percent literal after its `%`. Returns how many
/// characters make up the type letter and opening delimiter.
fn percent_literal(rest: &[char]) -> Option<(usize, Literal)> {
    let typed = matches!(rest.first(), Some(c) if "qQwWiIrsx".contains(*c));
    let at = usize::from(typed);

    let open = *rest.get(at)?;
    let close = match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        '=' if !typed => return None,
        c if c.is_ascii_punctuation() => c,
        _ => return None,
    };

    Some((
        at + 1,
        Literal::Percent {
            open,
            close,
            depth: 0,
        },
    ))
}

/// Recognize a heredoc opener such as `<<~SQL` or `<<-'EOS'`. Returns how
/// many characters it spans.
fn heredoc_start(rest: &[char]) -> Option<(usize, Heredoc)> {
    if rest.len() < 3 || rest[0] != '<' || rest[1] != '<' {
        return None;
    }

    let mut at = 2;
    let indented = matches!(rest[2], '~' | '-');
    if indented {
        at += 1;
    }

    let quote = match rest.get(at) {
        Some(q @ ('\'' | '"' | '`')) => {
            at += 1;
            Some(*q)
        }
        _ => None,
    };

    let start = at;
    while at < rest.len() && (rest[at].is_ascii_alphanumeric() || rest[at] == '_') {
        at += 1;
    }
    if at == start {
        return None;
    }
    let terminator: String = rest[start..at]
        .iter()
        .collect();

    match quote {
        Some(q) => {
            if rest.get(at) != Some(&q) {
                return None;
            }
            at += 1;
        }
        // a bare `<<word` is a shift unless the word is a constant
        None if !indented && !terminator.starts_with(|c: char| c.is_ascii_uppercase()) => {
            return None
        }
        None => {}
    }

    Some((
        at,
        Heredoc {
            terminator,
            indented,
        },
    ))
}

/// For each line of a Ruby program, does it begin inside a string,
/// regex, or heredoc? Such lines must be reproduced exactly, with no
/// indentation added.
pub fn verbatim_lines(source: &str) -> Vec<bool> {
    let mut lexer = Lexer::default();
    source
        .split('\n')
        .map(|line| {
            lexer
                .feed(line)
                .0
        })
        .collect()
}

fn first_word(line: &str) -> &str {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("")
}

fn opens(line: &str) -> bool {
    if regex!(r"(^|[\s;])end\s*$").is_match(line) {
        return false;
    }
    match first_word(line) {
        "if" | "unless" | "while" | "until" | "case" | "def" | "class" | "module" | "begin"
        | "for" => true,
        _ => {
            regex!(r"(^|[\s)])do(\s*\|[^|]*\|)?\s*$").is_match(line)
                || regex!(r"=\s*(if|unless|case|begin)\b").is_match(line)
        }
    }
}

fn is_branch(word: &str) -> bool {
    matches!(word, "else" | "elsif" | "when" | "rescue" | "ensure")
}

/// Normalize a whole Ruby program. The result has no trailing newline.
pub fn tidy(source: &str) -> Result<String, DelegateError> {
    let mut output: Vec<String> = Vec::new();
    let mut depth: usize = 0;
    let mut brackets: usize = 0;
    let mut lexer = Lexer::default();

    for (n, raw) in source
        .lines()
        .enumerate()
    {
        let (verbatim, line) = lexer.feed(raw);
        let open = brackets;
        brackets = (brackets as isize + line.balance).max(0) as usize;

        if verbatim {
            output.push(line.text);
            continue;
        }

        if line
            .text
            .is_empty()
        {
            if output
                .last()
                .map(|previous| !previous.is_empty())
                .unwrap_or(false)
            {
                output.push(String::new());
            }
            continue;
        }

        let word = first_word(&line.text);

        let mut level = if word == "end" {
            depth = depth
                .checked_sub(1)
                .ok_or_else(|| {
                    DelegateError::Rejected(format!("line {}: unexpected end", n + 1))
                })?;
            depth
        } else if is_branch(word) {
            // a lone `when` from a template tag has nothing to dedent from
            depth.saturating_sub(1)
        } else {
            depth
        };

        level += open;
        if line
            .text
            .starts_with([')', ']', '}'])
        {
            level = level.saturating_sub(1);
        }

        let mut result = " ".repeat(level * INDENT);
        result.push_str(&line.text);
        output.push(result);

        if opens(&line.text) {
            depth += 1;
        }
    }

    if lexer.is_open() {
        return Err(DelegateError::Rejected(
            "string, regex, or heredoc is never closed".to_string(),
        ));
    }

    if depth > 0 {
        return Err(DelegateError::Rejected(format!(
            "{} block{} missing end",
            depth,
            if depth == 1 { "" } else { "s" }
        )));
    }

    while output
        .last()
        .map(|line| line.is_empty())
        .unwrap_or(false)
    {
        output.pop();
    }

    trace!(lines = output.len(), "tidied Ruby");
    Ok(output.join("\n"))
}
