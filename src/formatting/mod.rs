//! Formatting of ERB templates: Ruby fragments, markup, and the layout
//! document that stitches them back together.

use tracing::debug;

use crate::delegates::{MarkupFormatter, ScriptFormatter};
use crate::language::{FormattingError, Tree};
use crate::parsing::parser::parse_template;

mod branches;
mod doc;
mod embed;
mod fragment;
mod options;
mod placeholder;
mod printer;

pub use branches::{split_branches, Segment};
pub use doc::{render, Doc, LineKind};
pub use embed::Composer;
pub use fragment::{format_fragment, format_node, scaffold_for, Scaffold};
pub use options::Options;
pub use placeholder::{find_placeholders, Placeholder};
pub use printer::render_node;

/// Format an already parsed template. The tree is updated in place as
/// fragments are formatted; nothing is returned unless every part
/// succeeded.
pub async fn format_tree(
    tree: &mut Tree,
    markup: &dyn MarkupFormatter,
    script: &dyn ScriptFormatter,
    options: &Options,
) -> Result<String, FormattingError> {
    let doc = Composer::new(tree, markup, script, options)
        .compose()
        .await?;

    let result = render(&doc, options.width, options.indent);
    debug!("rendered {} bytes", result.len());
    Ok(result)
}

/// Parse and format template source text.
pub async fn format_text(
    source: &str,
    markup: &dyn MarkupFormatter,
    script: &dyn ScriptFormatter,
    options: &Options,
) -> Result<String, FormattingError> {
    let mut tree = parse_template(source)?;
    format_tree(&mut tree, markup, script, options).await
}
