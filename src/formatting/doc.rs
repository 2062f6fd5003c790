//! Layout documents and the printer that turns them into text.
//!
//! Formatters build a `Doc` tree; the printer decides for each `Group`
//! whether it fits flat on the remainder of the line or has to break, in
//! the Wadler/Leijen style. A hard line anywhere inside a group forces that
//! group (and every group enclosing it) to break.

use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub enum Doc {
    Nil,
    Text(String),
    Line(LineKind),
    Concat(Vec<Doc>),
    Indent(Box<Doc>),
    Dedent(Box<Doc>),
    Group { doc: Box<Doc>, broken: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Always a line break.
    Hard,
    /// Nothing when flat, a line break otherwise.
    Soft,
    /// A space when flat, a line break otherwise.
    Space,
}

impl Doc {
    pub fn nil() -> Doc {
        Doc::Nil
    }

    pub fn text<T: Into<String>>(text: T) -> Doc {
        Doc::Text(text.into())
    }

    pub fn hardline() -> Doc {
        Doc::Line(LineKind::Hard)
    }

    pub fn softline() -> Doc {
        Doc::Line(LineKind::Soft)
    }

    pub fn line() -> Doc {
        Doc::Line(LineKind::Space)
    }

    pub fn concat(items: Vec<Doc>) -> Doc {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Doc::Nil => {}
                Doc::Concat(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Doc::Nil,
            1 => out
                .pop()
                .unwrap_or(Doc::Nil),
            _ => Doc::Concat(out),
        }
    }

    /// Put `separator` between each of the items.
    pub fn join(separator: Doc, items: Vec<Doc>) -> Doc {
        let mut out = Vec::with_capacity(items.len() * 2);
        for (i, item) in items
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                out.push(separator.clone());
            }
            out.push(item);
        }
        Doc::concat(out)
    }

    pub fn indent(self) -> Doc {
        match self {
            Doc::Nil => Doc::Nil,
            doc => Doc::Indent(Box::new(doc)),
        }
    }

    /// Back out one level of indentation from whatever encloses this.
    pub fn dedent(self) -> Doc {
        match self {
            Doc::Nil => Doc::Nil,
            doc => Doc::Dedent(Box::new(doc)),
        }
    }

    pub fn group(self) -> Doc {
        Doc::Group {
            doc: Box::new(self),
            broken: false,
        }
    }

    /// A group that always breaks, and so breaks every group around it.
    pub fn broken(self) -> Doc {
        Doc::Group {
            doc: Box::new(self),
            broken: true,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Doc::Nil)
    }

    /// Build a new document by replacing every text leaf with whatever the
    /// function returns for it. Everything else keeps its place.
    pub fn map_text<F>(self, f: &mut F) -> Doc
    where
        F: FnMut(String) -> Doc,
    {
        match self {
            Doc::Text(text) => f(text),
            Doc::Concat(items) => Doc::Concat(
                items
                    .into_iter()
                    .map(|item| item.map_text(f))
                    .collect(),
            ),
            Doc::Indent(doc) => Doc::Indent(Box::new(doc.map_text(f))),
            Doc::Dedent(doc) => Doc::Dedent(Box::new(doc.map_text(f))),
            Doc::Group { doc, broken } => Doc::Group {
                doc: Box::new(doc.map_text(f)),
                broken,
            },
            other => other,
        }
    }

    /// Visit every text leaf, in document order.
    pub fn visit_text<F>(&self, f: &mut F)
    where
        F: FnMut(&str),
    {
        match self {
            Doc::Text(text) => f(text),
            Doc::Concat(items) => {
                for item in items {
                    item.visit_text(f);
                }
            }
            Doc::Indent(doc) | Doc::Dedent(doc) | Doc::Group { doc, .. } => doc.visit_text(f),
            Doc::Nil | Doc::Line(_) => {}
        }
    }

    /// Turn plain text into a document, one text leaf per line.
    pub fn lines(text: &str) -> Doc {
        Doc::join(
            Doc::hardline(),
            text.lines()
                .map(Doc::text)
                .collect(),
        )
    }

    /// Turn text that is already laid out into a document. Leading
    /// whitespace is read back as levels of `indent` columns, so whatever
    /// gets spliced into a line later nests at that line's depth. Blank
    /// lines at either end and the indentation common to every line are
    /// dropped.
    pub fn indented_lines(text: &str, indent: usize) -> Doc {
        let indent = indent.max(1);
        let columns = |line: &str| -> usize {
            line.chars()
                .take_while(|c| c.is_whitespace())
                .map(|c| if c == '\t' { indent } else { 1 })
                .sum()
        };
        let blank = |line: &&str| {
            line.trim()
                .is_empty()
        };

        let mut lines: Vec<&str> = text
            .lines()
            .skip_while(blank)
            .collect();
        while lines
            .last()
            .map(blank)
            .unwrap_or(false)
        {
            lines.pop();
        }

        let common = lines
            .iter()
            .filter(|line| !blank(*line))
            .map(|line| columns(*line))
            .min()
            .unwrap_or(0);

        let mut parts = Vec::with_capacity(lines.len());
        for (i, line) in lines
            .into_iter()
            .enumerate()
        {
            let depth = columns(line).saturating_sub(common);
            let content = line.trim_start();

            if i == 0 {
                parts.push(Doc::text(format!("{}{}", " ".repeat(depth), content)));
                continue;
            }

            let mut doc = Doc::concat(vec![
                Doc::hardline(),
                Doc::text(format!("{}{}", " ".repeat(depth % indent), content)),
            ]);
            for _ in 0..depth / indent {
                doc = doc.indent();
            }
            parts.push(doc);
        }
        Doc::concat(parts)
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Doc::Nil => write!(f, "Nil"),
            Doc::Text(t) => write!(f, "Text({t:?})"),
            Doc::Line(k) => write!(f, "Line({k:?})"),
            Doc::Concat(items) => f
                .debug_tuple("Concat")
                .field(items)
                .finish(),
            Doc::Indent(doc) => f
                .debug_tuple("Indent")
                .field(doc)
                .finish(),
            Doc::Dedent(doc) => f
                .debug_tuple("Dedent")
                .field(doc)
                .finish(),
            Doc::Group { doc, broken } => f
                .debug_struct("Group")
                .field("broken", broken)
                .field("doc", doc)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

/// Print a document within `width` columns, indenting each level by
/// `indent` spaces. Trailing whitespace is dropped from every line.
pub fn render(doc: &Doc, width: usize, indent: usize) -> String {
    let mut out = String::new();

    // Work stack: (level, mode, doc)
    let mut stack: Vec<(usize, Mode, &Doc)> = vec![(0, Mode::Break, doc)];
    let mut col = 0usize;

    while let Some((level, mode, doc)) = stack.pop() {
        match doc {
            Doc::Nil => {}
            Doc::Text(text) => {
                out.push_str(text);
                col = match text.rfind('\n') {
                    Some(i) => text[i + 1..]
                        .chars()
                        .count(),
                    None => {
                        col + text
                            .chars()
                            .count()
                    }
                };
            }
            Doc::Line(kind) => match (kind, mode) {
                (LineKind::Soft, Mode::Flat) => {}
                (LineKind::Space, Mode::Flat) => {
                    out.push(' ');
                    col += 1;
                }
                _ => {
                    newline(&mut out, level * indent);
                    col = level * indent;
                }
            },
            Doc::Concat(items) => {
                for item in items
                    .iter()
                    .rev()
                {
                    stack.push((level, mode, item));
                }
            }
            Doc::Indent(doc) => stack.push((level + 1, mode, doc.as_ref())),
            Doc::Dedent(doc) => stack.push((level.saturating_sub(1), mode, doc.as_ref())),
            Doc::Group { doc, broken } => {
                let mode = if *broken {
                    Mode::Break
                } else if mode == Mode::Flat {
                    Mode::Flat
                } else if fits(width.saturating_sub(col), level, doc, &stack) {
                    Mode::Flat
                } else {
                    Mode::Break
                };
                stack.push((level, mode, doc.as_ref()));
            }
        }
    }

    out
}

fn newline(out: &mut String, spaces: usize) {
    let trimmed = out
        .trim_end_matches([' ', '\t'])
        .len();
    out.truncate(trimmed);
    out.push('\n');
    for _ in 0..spaces {
        out.push(' ');
    }
}

/// Would `doc` laid out flat, followed by whatever is already queued, fit
/// in the remaining columns up to the next line break?
fn fits(remaining: usize, level: usize, doc: &Doc, rest: &[(usize, Mode, &Doc)]) -> bool {
    let mut remaining = remaining as isize;
    let mut stack: Vec<(usize, Mode, &Doc)> = Vec::new();
    for (l, m, d) in rest {
        stack.push((*l, *m, *d));
    }
    // marks where the candidate group's own contents end
    let boundary = stack.len();
    stack.push((level, Mode::Flat, doc));

    while remaining >= 0 {
        let Some((level, mode, doc)) = stack.pop() else {
            return true;
        };
        let own = stack.len() >= boundary;
        match doc {
            Doc::Nil => {}
            Doc::Text(text) => match text.find('\n') {
                Some(i) => {
                    if own {
                        return false;
                    }
                    remaining -= text[..i]
                        .chars()
                        .count() as isize;
                    return remaining >= 0;
                }
                None => {
                    remaining -= text
                        .chars()
                        .count() as isize;
                }
            },
            Doc::Line(kind) => match (kind, mode) {
                (LineKind::Hard, _) if own => return false,
                (LineKind::Soft, Mode::Flat) => {}
                (LineKind::Space, Mode::Flat) => remaining -= 1,
                _ => return true,
            },
            Doc::Concat(items) => {
                for item in items
                    .iter()
                    .rev()
                {
                    stack.push((level, mode, item));
                }
            }
            Doc::Indent(doc) => stack.push((level + 1, mode, doc.as_ref())),
            Doc::Dedent(doc) => stack.push((level.saturating_sub(1), mode, doc.as_ref())),
            Doc::Group { doc, broken } => {
                if *broken && own {
                    return false;
                }
                let mode = if *broken { Mode::Break } else { mode };
                stack.push((level, mode, doc.as_ref()));
            }
        }
    }

    false
}
