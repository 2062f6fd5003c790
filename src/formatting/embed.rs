//! Compose the formatted template.
//!
//! Each container (the document, then every block within it) goes through
//! the same three steps: format the Ruby of its tags, format its markup one
//! branch at a time, then splice rendered tags and nested blocks back in
//! where their placeholders ended up.

use std::collections::HashMap;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::delegates::{MarkupFormatter, ScriptFormatter};
use crate::formatting::branches::{split_branches, Segment};
use crate::formatting::fragment::{format_fragment, scaffold_for};
use crate::formatting::placeholder::find_placeholders;
use crate::formatting::printer::render_node;
use crate::formatting::{Doc, LineKind, Options};
use crate::language::{FormattingError, Keyword, Node, NodeId, Tree};

pub struct Composer<'a> {
    tree: &'a mut Tree,
    markup: &'a dyn MarkupFormatter,
    script: &'a dyn ScriptFormatter,
    options: &'a Options,
}

impl<'a> Composer<'a> {
    pub fn new(
        tree: &'a mut Tree,
        markup: &'a dyn MarkupFormatter,
        script: &'a dyn ScriptFormatter,
        options: &'a Options,
    ) -> Composer<'a> {
        Composer {
            tree,
            markup,
            script,
            options,
        }
    }

    /// Build the document for the whole template.
    pub async fn compose(&mut self) -> Result<Doc, FormattingError> {
        let root = self
            .tree
            .root
            .clone();
        self.embed(root)
            .await
    }

    /// Build the document for one container, recursing into the blocks
    /// it holds.
    pub fn embed(&mut self, id: NodeId) -> BoxFuture<'_, Result<Doc, FormattingError>> {
        async move {
            let (content, scope) = match self
                .tree
                .get(&id)
                .and_then(Node::scope)
            {
                Some((content, scope)) => (content.to_string(), scope.clone()),
                None => {
                    return Err(FormattingError::Structure(format!(
                        "{} is not a root or block",
                        id
                    )))
                }
            };

            trace!(id = %id, nodes = scope.len(), "embedding");

            self.prepare(&scope)
                .await?;

            let docs = self
                .segments(&content, &scope)
                .await?;

            let nested = self
                .nested(&docs, &scope)
                .await?;

            let spliced = docs
                .into_iter()
                .map(|doc| self.splice(doc, &scope, &nested))
                .collect();

            self.assemble(&id, spliced)
        }
        .boxed()
    }

    /// Format the Ruby of every tag in scope that has not been formatted
    /// yet. All of them are independent, so they run together.
    async fn prepare(&mut self, scope: &IndexSet<NodeId>) -> Result<(), FormattingError> {
        let jobs: Vec<_> = scope
            .iter()
            .filter_map(|id| {
                let node = self
                    .tree
                    .get(id)?;
                let fragment = node.fragment()?;
                if fragment.is_formatted() {
                    return None;
                }
                let scaffold = scaffold_for(node)?;
                Some((
                    id.clone(),
                    fragment
                        .content
                        .clone(),
                    scaffold,
                ))
            })
            .collect();

        if jobs.is_empty() {
            return Ok(());
        }
        debug!("formatting {} Ruby fragments", jobs.len());

        let script = self.script;
        let options = self.options;

        let results = try_join_all(
            jobs.iter()
                .map(|(id, content, scaffold)| {
                    format_fragment(script, options, id, content, *scaffold)
                }),
        )
        .await?;

        for ((id, _, _), formatted) in jobs
            .iter()
            .zip(results)
        {
            if let Some(fragment) = self
                .tree
                .get_mut(id)
                .and_then(Node::fragment_mut)
            {
                fragment.settle(formatted);
            }
        }
        Ok(())
    }

    /// Format each branch of markup separately. Branch tags, and segments
    /// that are nothing but one placeholder, pass through as bare text.
    async fn segments(
        &self,
        content: &str,
        scope: &IndexSet<NodeId>,
    ) -> Result<Vec<Doc>, FormattingError> {
        let segments = split_branches(&*self.tree, content, scope);

        let markup = self.markup;
        let options = self.options;

        try_join_all(
            segments
                .into_iter()
                .map(|segment| async move {
                    match segment {
                        Segment::Branch(id) => Ok(Doc::text(id)),
                        Segment::Markup(text) if scope.contains(text) => Ok(Doc::text(text)),
                        Segment::Markup(text) => markup
                            .format_markup(text, options)
                            .await
                            .map_err(|source| FormattingError::Markup { source }),
                    }
                }),
        )
        .await
    }

    /// Render every block whose placeholder survived into these documents.
    /// Blocks are done one after another since each needs the tree.
    async fn nested(
        &mut self,
        docs: &[Doc],
        scope: &IndexSet<NodeId>,
    ) -> Result<HashMap<NodeId, Doc>, FormattingError> {
        let mut blocks: Vec<NodeId> = Vec::new();
        {
            let tree = &*self.tree;
            for doc in docs {
                doc.visit_text(&mut |text: &str| {
                    for placeholder in find_placeholders(text) {
                        let id = placeholder.id;
                        if scope.contains(id)
                            && matches!(tree.get(id), Some(Node::Block(_)))
                            && !blocks
                                .iter()
                                .any(|known| known == id)
                        {
                            blocks.push(id.to_string());
                        }
                    }
                });
            }
        }

        let mut rendered = HashMap::with_capacity(blocks.len());
        for id in blocks {
            let doc = self
                .embed(id.clone())
                .await?;
            rendered.insert(id, doc);
        }
        Ok(rendered)
    }

    /// Replace placeholders in the text leaves with what they stand for.
    /// Tokens that name nothing in this scope are left exactly as they are.
    fn splice(&self, doc: Doc, scope: &IndexSet<NodeId>, nested: &HashMap<NodeId, Doc>) -> Doc {
        let tree = &*self.tree;
        let options = self.options;

        doc.map_text(&mut |text: String| {
            let found = find_placeholders(&text);
            if found.is_empty() {
                return Doc::Text(text);
            }

            let mut parts = Vec::with_capacity(found.len() * 2 + 1);
            let mut last = 0;

            for placeholder in &found {
                if last < placeholder.start {
                    parts.push(Doc::text(&text[last..placeholder.start]));
                }

                let resolved = if scope.contains(placeholder.id) {
                    match nested.get(placeholder.id) {
                        Some(block) => Some(block.clone()),
                        None => match tree.get(placeholder.id) {
                            Some(
                                node @ (Node::Expression(_) | Node::Statement(_) | Node::Comment(_)),
                            ) => Some(render_node(Some(node), options)),
                            _ => None,
                        },
                    }
                } else {
                    None
                };

                parts.push(resolved.unwrap_or_else(|| Doc::text(placeholder.id)));
                last = placeholder.end;
            }

            if last < text.len() {
                parts.push(Doc::text(&text[last..]));
            }
            Doc::concat(parts)
        })
    }

    fn assemble(&self, id: &str, segments: Vec<Doc>) -> Result<Doc, FormattingError> {
        match self
            .tree
            .get(id)
        {
            Some(Node::Root(_)) => {
                let mut segments = segments;
                segments.push(Doc::hardline());
                Ok(Doc::concat(segments))
            }
            Some(Node::Block(block)) => {
                let start = self
                    .tree
                    .get(&block.start)
                    .filter(|node| {
                        node.fragment()
                            .map(|fragment| fragment.start_block)
                            .unwrap_or(false)
                    })
                    .ok_or_else(|| {
                        FormattingError::Structure(format!(
                            "block {} does not start with a block opener",
                            id
                        ))
                    })?;

                let end = self
                    .tree
                    .get(&block.end)
                    .filter(|node| node.keyword() == Keyword::End)
                    .ok_or_else(|| {
                        FormattingError::Structure(format!(
                            "block {} does not finish with end",
                            id
                        ))
                    })?;

                let open = render_node(Some(start), self.options);
                let close = render_node(Some(end), self.options);

                // a branch tag first or last already supplies the line
                // break at that edge
                let (lead, body) = match Doc::concat(segments) {
                    Doc::Concat(items) => {
                        let mut items = collapse_empty_branches(items);
                        if matches!(items.last(), Some(Doc::Line(LineKind::Hard))) {
                            items.pop();
                        }
                        let lead = if matches!(items.first(), Some(Doc::Dedent(_))) {
                            Doc::nil()
                        } else {
                            Doc::softline()
                        };
                        (lead, Doc::concat(items))
                    }
                    other => (Doc::softline(), other),
                };

                if body.is_nil() {
                    return Ok(Doc::concat(vec![open, Doc::hardline(), close]).group());
                }

                Ok(Doc::concat(vec![
                    open,
                    Doc::concat(vec![lead, body]).indent(),
                    Doc::hardline(),
                    close,
                ])
                .group())
            }
            _ => Err(FormattingError::Structure(format!(
                "{} is not a root or block",
                id
            ))),
        }
    }
}

/// Two branch tags with nothing between them would leave the line break
/// after the first followed by the one before the second.
fn collapse_empty_branches(items: Vec<Doc>) -> Vec<Doc> {
    let mut out: Vec<Doc> = Vec::with_capacity(items.len());
    for item in items {
        if matches!(item, Doc::Dedent(_))
            && matches!(out.last(), Some(Doc::Line(LineKind::Hard)))
        {
            out.pop();
        }
        out.push(item);
    }
    out
}
