//! Split a container's markup at its `else`/`elsif` tags, so each branch
//! can go to the markup formatter on its own.

use indexmap::IndexSet;

use crate::formatting::placeholder::find_placeholders;
use crate::language::{NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'c> {
    /// Markup of one branch, placeholders and all.
    Markup(&'c str),
    /// Placeholder of the `else`/`elsif` tag separating two branches.
    Branch(&'c str),
}

/// Partition content into markup segments and the branch tags between
/// them, in document order. Only whole placeholder tokens naming branch
/// statements of this container count; branches of nested blocks are
/// further down the tree and never appear in this content. Empty segments
/// are dropped.
pub fn split_branches<'c>(tree: &Tree, content: &'c str, scope: &IndexSet<NodeId>) -> Vec<Segment<'c>> {
    let is_branch = |id: &str| {
        scope.contains(id)
            && tree
                .get(id)
                .map(|node| {
                    node.keyword()
                        .is_branch()
                })
                .unwrap_or(false)
    };

    let mut segments = Vec::new();
    let mut last = 0;

    for placeholder in find_placeholders(content) {
        if !is_branch(placeholder.id) {
            continue;
        }
        let before = &content[last..placeholder.start];
        if !before.is_empty() {
            segments.push(Segment::Markup(before));
        }
        segments.push(Segment::Branch(placeholder.id));
        last = placeholder.end;
    }

    if last == 0 {
        return vec![Segment::Markup(content)];
    }

    let rest = &content[last..];
    if !rest.is_empty() {
        segments.push(Segment::Markup(rest));
    }
    segments
}
