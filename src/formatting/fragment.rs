//! Format one Ruby fragment by way of a whole-program formatter.
//!
//! A tag like `<% else %>` is not a Ruby program on its own. Before handing
//! it over we wrap it in just enough synthetic code to make it one, and
//! afterwards cut exactly that synthetic code back off.

use tracing::debug;

use crate::delegates::ScriptFormatter;
use crate::formatting::Options;
use crate::language::{FormattingError, Keyword, Node, Tree};

const OPENER: &str = "if true\n";
const CLOSER: &str = "\nend";
const BODY: &str = "\n  @erbfmt_a = 1\n  @erbfmt_b = 2\nend";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaffold {
    /// Complete program as it stands.
    Bare,
    /// Opens a block, so needs an `end` after it.
    Closer,
    /// Opens a block that would otherwise be empty; the filler statements
    /// stop the formatter from collapsing it onto one line.
    Body,
    /// `else`/`elsif`, which need an `if` before and an `end` after.
    Branch,
}

impl Scaffold {
    pub fn head(&self) -> &'static str {
        match self {
            Scaffold::Branch => OPENER,
            _ => "",
        }
    }

    pub fn tail(&self) -> &'static str {
        match self {
            Scaffold::Bare => "",
            Scaffold::Closer | Scaffold::Branch => CLOSER,
            Scaffold::Body => BODY,
        }
    }

    pub fn wrap(&self, content: &str) -> String {
        let mut result = String::with_capacity(
            self.head()
                .len()
                + content.len()
                + self
                    .tail()
                    .len(),
        );
        result.push_str(self.head());
        result.push_str(content);
        result.push_str(self.tail());
        result
    }

    /// Remove the synthetic head and tail from formatted output. Returns
    /// None if the formatter changed them, since cutting by length would
    /// then eat into the fragment itself.
    pub fn unwrap<'f>(&self, formatted: &'f str) -> Option<&'f str> {
        formatted
            .strip_prefix(self.head())?
            .strip_suffix(self.tail())
    }
}

/// Which wrapping a node needs, or None if it is never formatted.
pub fn scaffold_for(node: &Node) -> Option<Scaffold> {
    match node {
        Node::Expression(expression) => {
            if expression.start_block {
                Some(Scaffold::Closer)
            } else {
                Some(Scaffold::Bare)
            }
        }
        Node::Statement(statement) => match statement.keyword {
            Keyword::End => None,
            Keyword::Else | Keyword::Elsif => Some(Scaffold::Branch),
            Keyword::If | Keyword::Unless if statement
                .fragment
                .start_block =>
            {
                Some(Scaffold::Closer)
            }
            _ if statement
                .fragment
                .start_block =>
            {
                Some(Scaffold::Body)
            }
            _ => Some(Scaffold::Bare),
        },
        Node::Root(_) | Node::Block(_) | Node::Comment(_) => None,
    }
}

/// Wrap, format, and unwrap one fragment's content.
pub async fn format_fragment(
    script: &dyn ScriptFormatter,
    options: &Options,
    id: &str,
    content: &str,
    scaffold: Scaffold,
) -> Result<String, FormattingError> {
    let wrapped = scaffold.wrap(content);

    let formatted = script
        .format_script(&wrapped, options)
        .await
        .map_err(|source| FormattingError::Script {
            id: id.to_string(),
            source,
        })?;

    // formatters conventionally end their output with a newline
    let formatted = formatted.trim_end_matches('\n');

    match scaffold.unwrap(formatted) {
        Some(inner) => {
            debug!(id, ?scaffold, "formatted fragment");
            Ok(inner.to_string())
        }
        None => Err(FormattingError::Scaffolding {
            id: id.to_string(),
            formatted: formatted.to_string(),
        }),
    }
}

/// Format a single node of the tree in place. Nodes that are already
/// formatted, or that are never formatted, are left alone.
pub async fn format_node(
    tree: &mut Tree,
    id: &str,
    script: &dyn ScriptFormatter,
    options: &Options,
) -> Result<(), FormattingError> {
    let (content, scaffold) = match tree.get(id) {
        Some(node) => match (node.fragment(), scaffold_for(node)) {
            (Some(fragment), Some(scaffold)) if !fragment.is_formatted() => {
                (
                    fragment
                        .content
                        .clone(),
                    scaffold,
                )
            }
            _ => return Ok(()),
        },
        None => return Ok(()),
    };

    let formatted = format_fragment(script, options, id, &content, scaffold).await?;

    if let Some(fragment) = tree
        .get_mut(id)
        .and_then(Node::fragment_mut)
    {
        fragment.settle(formatted);
    }
    Ok(())
}
