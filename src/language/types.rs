//! Types representing a parsed ERB template as an arena of nodes

use std::collections::HashMap;

use indexmap::IndexSet;

/// Identifier of a node. These are also the placeholder tokens that stand
/// in for the node inside the markup content of its container.
pub type NodeId = String;

/// Location of a node within the original source, for diagnostics only.
#[derive(Eq, Debug, PartialEq, Clone, Copy, Default)]
pub struct Span {
    pub index: usize,
    pub length: usize,
}

/// The parsed template. Nodes refer to one another by id, never by
/// ownership; the root is just another entry in the arena.
#[derive(Eq, Debug, PartialEq, Clone)]
pub struct Tree {
    pub root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

impl Tree {
    pub fn new(root: Container) -> Tree {
        let id = root
            .id
            .clone();
        let mut nodes = HashMap::new();
        nodes.insert(id.clone(), Node::Root(root));
        Tree { root: id, nodes }
    }

    pub fn insert(&mut self, node: Node) {
        self.nodes
            .insert(
                node.id()
                    .to_string(),
                node,
            );
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes
            .get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes
            .get_mut(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .values()
    }

    pub fn len(&self) -> usize {
        self.nodes
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes
            .is_empty()
    }
}

#[derive(Eq, Debug, PartialEq, Clone)]
pub enum Node {
    Root(Container),
    Block(Block),
    Expression(Fragment),
    Statement(Statement),
    Comment(Comment),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Root(root) => &root.id,
            Node::Block(block) => &block.id,
            Node::Expression(expression) => &expression.id,
            Node::Statement(statement) => &statement
                .fragment
                .id,
            Node::Comment(comment) => &comment.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Root(root) => root.span,
            Node::Block(block) => block.span,
            Node::Expression(expression) => expression.span,
            Node::Statement(statement) => {
                statement
                    .fragment
                    .span
            }
            Node::Comment(comment) => comment.span,
        }
    }

    /// The script fragment carried by this node, if it is one that gets
    /// sent to the script formatter.
    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            Node::Expression(expression) => Some(expression),
            Node::Statement(statement) => Some(&statement.fragment),
            _ => None,
        }
    }

    pub fn fragment_mut(&mut self) -> Option<&mut Fragment> {
        match self {
            Node::Expression(expression) => Some(expression),
            Node::Statement(statement) => Some(&mut statement.fragment),
            _ => None,
        }
    }

    /// Markup content and member ids, for the two container kinds.
    pub fn scope(&self) -> Option<(&str, &IndexSet<NodeId>)> {
        match self {
            Node::Root(root) => Some((&root.content, &root.nodes)),
            Node::Block(block) => Some((&block.content, &block.nodes)),
            _ => None,
        }
    }

    pub fn keyword(&self) -> Keyword {
        match self {
            Node::Statement(statement) => statement.keyword,
            _ => Keyword::None,
        }
    }
}

/// The whole document: markup with every top level tag replaced by its
/// placeholder. `nodes` lists every id reachable from the document,
/// including those nested inside blocks.
#[derive(Eq, Debug, PartialEq, Clone)]
pub struct Container {
    pub id: NodeId,
    pub span: Span,
    pub content: String,
    pub nodes: IndexSet<NodeId>,
}

/// A paired control construct such as `<% if %> ... <% end %>`. The
/// content is the markup strictly between the opening and closing tags.
#[derive(Eq, Debug, PartialEq, Clone)]
pub struct Block {
    pub id: NodeId,
    pub span: Span,
    pub content: String,
    pub start: NodeId,
    pub end: NodeId,
    pub nodes: IndexSet<NodeId>,
}

/// Embedded Ruby source from an `<%= %>` or `<% %>` tag.
#[derive(Eq, Debug, PartialEq, Clone)]
pub struct Fragment {
    pub id: NodeId,
    pub span: Span,
    pub content: String,
    pub state: State,
    pub start_block: bool,
    /// Written with `<%==`, output that skips HTML escaping.
    pub raw: bool,
}

impl Fragment {
    pub fn new(id: NodeId, span: Span, content: String, start_block: bool) -> Fragment {
        Fragment {
            id,
            span,
            content,
            state: State::Unformatted,
            start_block,
            raw: false,
        }
    }

    pub fn unescaped(mut self) -> Fragment {
        self.raw = true;
        self
    }

    pub fn is_formatted(&self) -> bool {
        matches!(self.state, State::Formatted { .. })
    }

    /// Replace the content with its formatted form. This happens at most
    /// once; later calls leave the node untouched.
    pub fn settle(&mut self, formatted: String) {
        if self.is_formatted() {
            return;
        }
        let original = std::mem::replace(&mut self.content, formatted);
        self.state = State::Formatted { original };
    }
}

#[derive(Eq, Debug, PartialEq, Clone)]
pub enum State {
    Unformatted,
    Formatted { original: String },
}

#[derive(Eq, Debug, PartialEq, Clone)]
pub struct Statement {
    pub fragment: Fragment,
    pub keyword: Keyword,
}

#[derive(Eq, Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    None,
    If,
    Unless,
    Elsif,
    Else,
    End,
}

impl Keyword {
    pub fn from_content(content: &str) -> Keyword {
        let word = content
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .next()
            .unwrap_or("");

        match word {
            "if" => Keyword::If,
            "unless" => Keyword::Unless,
            "elsif" => Keyword::Elsif,
            "else" => Keyword::Else,
            "end" => Keyword::End,
            _ => Keyword::None,
        }
    }

    /// Does this keyword separate the branches of a conditional?
    pub fn is_branch(&self) -> bool {
        matches!(self, Keyword::Else | Keyword::Elsif)
    }
}

/// An `<%# %>` comment. Never sent to the script formatter.
#[derive(Eq, Debug, PartialEq, Clone)]
pub struct Comment {
    pub id: NodeId,
    pub span: Span,
    pub content: String,
}
