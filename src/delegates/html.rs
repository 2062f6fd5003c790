//! A built-in HTML formatter.
//!
//! Markup is read into a loose element tree (nothing is ever rejected;
//! unclosed elements and stray close tags are carried along as they are)
//! and laid out with block-level elements on lines of their own and
//! inline elements flowing with the text around them.

use async_trait::async_trait;
use tracing::trace;

use crate::delegates::MarkupFormatter;
use crate::formatting::{Doc, Options};
use crate::language::DelegateError;

pub struct Html;

#[async_trait]
impl MarkupFormatter for Html {
    async fn format_markup(&self, source: &str, _: &Options) -> Result<Doc, DelegateError> {
        let nodes = parse_markup(source);
        trace!(nodes = nodes.len(), "parsed markup");
        Ok(layout(&nodes))
    }
}

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is kept byte for byte.
const RAW: &[&str] = &["script", "style", "pre", "textarea"];

const INLINE: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "textarea", "time", "u", "var",
];

fn is_one_of(name: &str, list: &[&str]) -> bool {
    list.iter()
        .any(|known| name.eq_ignore_ascii_case(known))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Markup {
    Text(String),
    Element(Element),
    /// Comments, doctypes, and close tags matching no open element.
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    /// The opening tag, attributes normalized.
    open: String,
    children: Vec<Markup>,
    close: Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Close {
    /// Void or self-closing; there is no body.
    Empty,
    /// Closed by a matching end tag.
    Tag,
    /// Body kept verbatim, and whether an end tag followed it.
    Raw(String, bool),
    /// Never closed. Whatever followed belongs to the parent.
    Missing,
}

struct OpenTag<'s> {
    name: &'s str,
    attributes: Vec<String>,
    self_closing: bool,
    width: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Read `<name attr ...>` from the start of the input.
fn open_tag(rest: &str) -> Option<OpenTag<'_>> {
    let body = rest.strip_prefix('<')?;
    if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let length = body
        .find(|c: char| !is_name_char(c))
        .unwrap_or(body.len());
    let name = &body[..length];

    let mut quote = None;
    let mut end = None;
    for (i, c) in body[length..].char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '>' => {
                    end = Some(length + i);
                    break;
                }
                _ => {}
            },
        }
    }
    let end = end?;

    let inner = body[length..end].trim();
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(inner) => (inner.trim_end(), true),
        None => (inner, false),
    };

    Some(OpenTag {
        name,
        attributes: attributes(inner),
        self_closing,
        width: end + 2,
    })
}

/// Split the inside of a tag into attributes, joining `name = value` back
/// into `name=value`.
fn attributes(inner: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote = None;

    for c in inner.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '=' => {
                if current.is_empty() {
                    if let Some(previous) = result.pop() {
                        current = previous;
                    }
                }
                current.push(c);
            }
            c if c.is_whitespace() => {
                if !current.is_empty() && !current.ends_with('=') {
                    result.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Name of the element a `</name ...>` tag closes.
fn close_name(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix("</")?;
    if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let length = body
        .find(|c: char| !is_name_char(c))
        .unwrap_or(body.len());
    Some(&body[..length])
}

fn looks_like_markup(rest: &str) -> bool {
    match rest.strip_prefix('<') {
        Some(body) => {
            body.starts_with(|c: char| c.is_ascii_alphabetic() || c == '!')
                || body
                    .strip_prefix('/')
                    .map(|after| after.starts_with(|c: char| c.is_ascii_alphabetic()))
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// Width up to and including the next `>`, or everything.
fn through(rest: &str, needle: &str) -> usize {
    rest.find(needle)
        .map(|i| i + needle.len())
        .unwrap_or(rest.len())
}

fn attach(stack: &mut [Element], roots: &mut Vec<Markup>, node: Markup) {
    match stack.last_mut() {
        Some(parent) => parent
            .children
            .push(node),
        None => roots.push(node),
    }
}

/// An element that was never closed: its tag stands alone and what it
/// would have contained follows it as siblings.
fn dangle(mut element: Element, stack: &mut [Element], roots: &mut Vec<Markup>) {
    let children = std::mem::take(&mut element.children);
    element.close = Close::Missing;
    attach(stack, roots, Markup::Element(element));
    for child in children {
        attach(stack, roots, child);
    }
}

fn parse_markup(source: &str) -> Vec<Markup> {
    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Markup> = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        if rest.starts_with("<!--") {
            let width = 4 + through(&rest[4..], "-->");
            attach(&mut stack, &mut roots, Markup::Verbatim(rest[..width].to_string()));
            rest = &rest[width..];
        } else if rest.starts_with("<!") {
            let width = through(rest, ">");
            attach(&mut stack, &mut roots, Markup::Verbatim(rest[..width].to_string()));
            rest = &rest[width..];
        } else if let Some(name) = close_name(rest) {
            let width = through(rest, ">");
            let raw = &rest[..width];

            match stack
                .iter()
                .rposition(|element| {
                    element
                        .name
                        .eq_ignore_ascii_case(name)
                }) {
                Some(i) => {
                    while stack.len() > i + 1 {
                        if let Some(inner) = stack.pop() {
                            dangle(inner, &mut stack, &mut roots);
                        }
                    }
                    if let Some(mut element) = stack.pop() {
                        element.close = Close::Tag;
                        attach(&mut stack, &mut roots, Markup::Element(element));
                    }
                }
                None => attach(&mut stack, &mut roots, Markup::Verbatim(raw.to_string())),
            }
            rest = &rest[width..];
        } else if let Some(tag) = open_tag(rest) {
            let mut open = format!("<{}", tag.name);
            for attribute in &tag.attributes {
                open.push(' ');
                open.push_str(attribute);
            }
            open.push_str(if tag.self_closing { " />" } else { ">" });

            let mut element = Element {
                name: tag
                    .name
                    .to_string(),
                open,
                children: Vec::new(),
                close: Close::Empty,
            };
            rest = &rest[tag.width..];

            if tag.self_closing || is_one_of(tag.name, VOID) {
                attach(&mut stack, &mut roots, Markup::Element(element));
            } else if is_one_of(tag.name, RAW) {
                let lower = rest.to_ascii_lowercase();
                let needle = format!(
                    "</{}",
                    tag.name
                        .to_ascii_lowercase()
                );
                match lower.find(&needle) {
                    Some(i) => {
                        let body = rest[..i].to_string();
                        let width = i + through(&rest[i..], ">");
                        element.close = Close::Raw(body, true);
                        rest = &rest[width..];
                    }
                    None => {
                        element.close = Close::Raw(rest.to_string(), false);
                        rest = "";
                    }
                }
                attach(&mut stack, &mut roots, Markup::Element(element));
            } else {
                stack.push(element);
            }
        } else {
            let width = rest
                .char_indices()
                .skip(1)
                .find(|(i, c)| *c == '<' && looks_like_markup(&rest[*i..]))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            attach(&mut stack, &mut roots, Markup::Text(rest[..width].to_string()));
            rest = &rest[width..];
        }
    }

    while let Some(element) = stack.pop() {
        dangle(element, &mut stack, &mut roots);
    }
    roots
}

/// Accumulates laid out content a line at a time.
#[derive(Default)]
struct Flow {
    lines: Vec<(bool, Vec<Doc>)>,
    current: Vec<Doc>,
    blank: bool,
    newlines: usize,
    space: bool,
}

impl Flow {
    fn begin(&mut self) {
        // at most one blank line survives, and never at the start
        self.blank = self.newlines > 1
            && !self
                .lines
                .is_empty();
        self.newlines = 0;
    }

    fn flush(&mut self) {
        if !self
            .current
            .is_empty()
        {
            let line = std::mem::take(&mut self.current);
            self.lines
                .push((self.blank, line));
        }
    }

    fn newline(&mut self) {
        self.flush();
        self.newlines += 1;
        self.space = false;
    }

    fn inline(&mut self, doc: Doc) {
        if self
            .current
            .is_empty()
        {
            self.begin();
        } else if self.space {
            self.current
                .push(Doc::text(" "));
        }
        self.current
            .push(doc);
        self.space = false;
    }

    fn block(&mut self, doc: Doc) {
        self.flush();
        self.begin();
        self.lines
            .push((self.blank, vec![doc]));
        self.space = false;
    }

    fn text(&mut self, text: &str) {
        for (i, piece) in text
            .split('\n')
            .enumerate()
        {
            if i > 0 {
                self.newline();
            }
            if piece.starts_with(char::is_whitespace) {
                self.space = true;
            }
            let words: Vec<&str> = piece
                .split_whitespace()
                .collect();
            if !words.is_empty() {
                self.inline(Doc::text(words.join(" ")));
                if piece.ends_with(char::is_whitespace) {
                    self.space = true;
                }
            }
        }
    }

    fn finish(mut self) -> Doc {
        self.flush();
        let mut parts = Vec::new();
        for (i, (blank, line)) in self
            .lines
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                parts.push(Doc::hardline());
                if blank {
                    parts.push(Doc::hardline());
                }
            }
            parts.push(Doc::concat(line));
        }
        Doc::concat(parts)
    }
}

fn layout(nodes: &[Markup]) -> Doc {
    let mut flow = Flow::default();
    for node in nodes {
        match node {
            Markup::Text(text) => flow.text(text),
            Markup::Verbatim(raw) => flow.block(Doc::text(raw.as_str())),
            Markup::Element(element) => {
                let doc = element_doc(element);
                if element.close != Close::Missing && is_one_of(&element.name, INLINE) {
                    flow.inline(doc);
                } else {
                    flow.block(doc);
                }
            }
        }
    }
    flow.finish()
}

fn element_doc(element: &Element) -> Doc {
    match &element.close {
        Close::Empty | Close::Missing => Doc::text(
            element
                .open
                .as_str(),
        ),
        Close::Raw(body, closed) => {
            let mut text = element
                .open
                .clone();
            text.push_str(body);
            if *closed {
                text.push_str(&format!("</{}>", element.name));
            }
            Doc::text(text)
        }
        Close::Tag => {
            let close = format!("</{}>", element.name);
            let body = layout(&element.children);
            if body.is_nil() {
                return Doc::text(format!("{}{}", element.open, close));
            }
            // inside inline elements whitespace at either edge is part of
            // the rendered text
            let inline = is_one_of(&element.name, INLINE);
            let edge = |text: Option<&Markup>, test: fn(&str) -> bool| match text {
                Some(Markup::Text(text)) if inline && test(text) => Doc::line(),
                _ => Doc::softline(),
            };
            let lead = edge(
                element
                    .children
                    .first(),
                |text| text.starts_with(char::is_whitespace),
            );
            let trail = edge(
                element
                    .children
                    .last(),
                |text| text.ends_with(char::is_whitespace),
            );

            Doc::concat(vec![
                Doc::text(
                    element
                        .open
                        .as_str(),
                ),
                Doc::concat(vec![lead, body]).indent(),
                trail,
                Doc::text(close),
            ])
            .group()
        }
    }
}
