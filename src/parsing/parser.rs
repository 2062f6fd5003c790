use std::fmt;

use tracing::warn;

use crate::language::*;
use crate::parsing::scope::{Frame, Scope};
use crate::patterns::regex;

/// Prefix and suffix of the placeholder tokens that stand in for tags
/// inside markup content.
pub const SENTINEL_OPEN: &str = "#~";
pub const SENTINEL_CLOSE: &str = "~#";

pub fn placeholder(n: usize) -> NodeId {
    format!("{}{}{}", SENTINEL_OPEN, n, SENTINEL_CLOSE)
}

pub fn parse_template(content: &str) -> Result<Tree, ParsingError> {
    let mut input = Parser::new();
    input.initialize(content);
    input.parse_from_start()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    UnterminatedTag(usize),
    UnexpectedEnd(usize),
    OrphanBranch(usize, Keyword),
    UnclosedBlock(usize),
}

impl ParsingError {
    pub fn offset(&self) -> usize {
        match self {
            ParsingError::UnterminatedTag(offset) => *offset,
            ParsingError::UnexpectedEnd(offset) => *offset,
            ParsingError::OrphanBranch(offset, _) => *offset,
            ParsingError::UnclosedBlock(offset) => *offset,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParsingError::UnterminatedTag(_) => "unterminated ERB tag".to_string(),
            ParsingError::UnexpectedEnd(_) => "end without an open block".to_string(),
            ParsingError::OrphanBranch(_, keyword) => format!(
                "{} outside of a conditional block",
                match keyword {
                    Keyword::Elsif => "elsif",
                    _ => "else",
                }
            ),
            ParsingError::UnclosedBlock(_) => "block is never closed with end".to_string(),
        }
    }

    pub fn details(&self) -> &'static str {
        match self {
            ParsingError::UnterminatedTag(_) => "Every <% tag needs a matching %>.",
            ParsingError::UnexpectedEnd(_) => {
                "This <% end %> does not close any if, unless, loop, or do block."
            }
            ParsingError::OrphanBranch(_, _) => {
                "Branch tags have to appear between an opening <% if %> and its <% end %>."
            }
            ParsingError::UnclosedBlock(_) => {
                "The block opened here is still open when the template ends."
            }
        }
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message(), self.offset())
    }
}

impl std::error::Error for ParsingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Comment,
    Expression,
    Raw,
    Statement,
}

/// Does this fragment of Ruby open a block that a later `<% end %>` will
/// close?
pub fn opens_block(content: &str) -> bool {
    // one-liners like `if x then y end` close themselves
    if regex!(r"(^|[\s;])end\s*$").is_match(content) {
        return false;
    }

    let word = content
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("");

    match word {
        "if" | "unless" | "case" | "while" | "until" | "for" | "begin" => true,
        _ => regex!(r"(^|[\s)])do(\s*\|[^|]*\|)?\s*$").is_match(content),
    }
}

#[derive(Debug)]
pub struct Parser<'i> {
    original: &'i str,
    source: &'i str,
    offset: usize,
    count: usize,
    scope: Scope,
    nodes: Vec<Node>,
}

impl<'i> Parser<'i> {
    pub fn new() -> Parser<'i> {
        Parser {
            original: "",
            source: "",
            offset: 0,
            count: 0,
            scope: Scope::new(),
            nodes: Vec::new(),
        }
    }

    pub fn initialize(&mut self, content: &'i str) {
        self.original = content;
        self.source = content;
        self.offset = 0;
        self.count = 0;
        self.scope = Scope::new();
        self.nodes
            .clear();
    }

    fn advance(&mut self, width: usize) {
        // advance the parser position
        self.source = &self.source[width..];
        self.offset += width;
    }

    fn is_finished(&self) -> bool {
        self.source
            .is_empty()
    }

    fn next_id(&mut self) -> NodeId {
        self.count += 1;
        placeholder(self.count)
    }

    pub fn parse_from_start(&mut self) -> Result<Tree, ParsingError> {
        if self
            .original
            .contains(SENTINEL_OPEN)
        {
            warn!(
                "template already contains {:?}, which may be mistaken for a placeholder",
                SENTINEL_OPEN
            );
        }

        while !self.is_finished() {
            match find_tag(self.source) {
                Some(i) => {
                    self.take_markup(i);
                    self.read_tag()?;
                }
                None => {
                    self.take_markup(
                        self.source
                            .len(),
                    );
                }
            }
        }

        let scope = std::mem::replace(&mut self.scope, Scope::new());
        let document = match scope.finish() {
            Ok(frame) => frame,
            Err(frame) => return Err(ParsingError::UnclosedBlock(frame.offset)),
        };

        let root = Container {
            id: placeholder(0),
            span: Span {
                index: 0,
                length: self
                    .original
                    .len(),
            },
            content: document.content,
            nodes: document.nodes,
        };

        let mut tree = Tree::new(root);
        for node in self
            .nodes
            .drain(..)
        {
            tree.insert(node);
        }
        Ok(tree)
    }

    /// Copy markup verbatim into whichever container is currently open.
    fn take_markup(&mut self, width: usize) {
        let text = &self.source[..width];
        self.scope
            .current()
            .content
            .push_str(text);
        self.advance(width);
    }

    pub fn read_tag(&mut self) -> Result<(), ParsingError> {
        let start = self.offset;
        let rest = &self.source[2..];

        let (tag, width) = match rest
            .chars()
            .next()
        {
            Some('#') => (Tag::Comment, 3),
            Some('=') if rest.starts_with("==") => (Tag::Raw, 4),
            Some('=') => (Tag::Expression, 3),
            Some('-') => (Tag::Statement, 3),
            _ => (Tag::Statement, 2),
        };

        let close = match self.source[width..].find("%>") {
            Some(i) => i,
            None => return Err(ParsingError::UnterminatedTag(start)),
        };

        let inner = &self.source[width..width + close];
        let inner = inner
            .strip_suffix('-')
            .unwrap_or(inner);
        let content = inner
            .trim()
            .to_string();

        let length = width + close + 2;
        let span = Span {
            index: start,
            length,
        };
        self.advance(length);

        match tag {
            Tag::Comment => {
                let id = self.next_id();
                self.scope
                    .current()
                    .place(&id);
                self.nodes
                    .push(Node::Comment(Comment { id, span, content }));
            }
            Tag::Expression | Tag::Raw => {
                let id = self.next_id();
                let start_block = opens_block(&content);
                self.open_or_place(&id, start_block, start);
                let fragment = Fragment::new(id, span, content, start_block);
                self.nodes
                    .push(Node::Expression(if tag == Tag::Raw {
                        fragment.unescaped()
                    } else {
                        fragment
                    }));
            }
            Tag::Statement => {
                let keyword = Keyword::from_content(&content);
                let id = self.next_id();

                match keyword {
                    Keyword::End => {
                        self.nodes
                            .push(Node::Statement(Statement {
                                fragment: Fragment::new(id.clone(), span, content, false),
                                keyword,
                            }));
                        self.close_block(id, start)?;
                    }
                    Keyword::Else | Keyword::Elsif => {
                        if self
                            .scope
                            .depth()
                            == 0
                        {
                            return Err(ParsingError::OrphanBranch(start, keyword));
                        }
                        self.scope
                            .current()
                            .place(&id);
                        self.nodes
                            .push(Node::Statement(Statement {
                                fragment: Fragment::new(id, span, content, false),
                                keyword,
                            }));
                    }
                    _ => {
                        let start_block = opens_block(&content);
                        self.open_or_place(&id, start_block, start);
                        self.nodes
                            .push(Node::Statement(Statement {
                                fragment: Fragment::new(id, span, content, start_block),
                                keyword,
                            }));
                    }
                }
            }
        }

        Ok(())
    }

    fn open_or_place(&mut self, id: &str, start_block: bool, offset: usize) {
        if start_block {
            self.scope
                .push(id.to_string(), offset);
        } else {
            self.scope
                .current()
                .place(id);
        }
    }

    fn close_block(&mut self, end: NodeId, offset: usize) -> Result<(), ParsingError> {
        let frame = match self
            .scope
            .pop()
        {
            Some(frame) => frame,
            None => return Err(ParsingError::UnexpectedEnd(offset)),
        };

        let Frame {
            start,
            offset: index,
            content,
            mut nodes,
        } = frame;

        let start = match start {
            Some(start) => start,
            None => return Err(ParsingError::UnexpectedEnd(offset)),
        };

        nodes.insert(end.clone());

        let id = self.next_id();
        let parent = self
            .scope
            .current();
        parent
            .nodes
            .extend(
                nodes
                    .iter()
                    .cloned(),
            );
        parent.place(&id);

        self.nodes
            .push(Node::Block(Block {
                id,
                span: Span {
                    index,
                    length: self.offset - index,
                },
                content,
                start,
                end,
                nodes,
            }));

        Ok(())
    }
}

/// Find the next opening tag, skipping the `<%%` escape for a literal `<%`.
fn find_tag(source: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(i) = source[from..].find("<%") {
        let at = from + i;
        if source[at + 2..].starts_with('%') {
            from = at + 3;
            continue;
        }
        return Some(at);
    }
    None
}
