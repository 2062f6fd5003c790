//! Turn a single ERB tag node back into a layout document.

use crate::delegates::verbatim_lines;
use crate::formatting::{Doc, Options};
use crate::language::{Node, Statement};

const EXPRESSION: &str = "<%=";
const RAW: &str = "<%==";
const STATEMENT: &str = "<%";
const COMMENT: &str = "<%#";
const CLOSE: &str = "%>";

/// Render a tag node. Containers, and ids that name nothing, render as
/// nothing at all; they are spliced in elsewhere or not at all.
pub fn render_node(node: Option<&Node>, options: &Options) -> Doc {
    match node {
        Some(Node::Expression(fragment)) => {
            let open = if fragment.raw { RAW } else { EXPRESSION };
            render_tag(open, &fragment.content, fragment.start_block, options)
        }
        Some(Node::Statement(statement)) => render_statement(statement, options),
        Some(Node::Comment(comment)) => render_comment(&comment.content),
        Some(Node::Root(_)) | Some(Node::Block(_)) | None => Doc::Nil,
    }
}

fn render_comment(content: &str) -> Doc {
    let parts = if content.is_empty() {
        vec![Doc::text(COMMENT), Doc::text(" "), Doc::text(CLOSE)]
    } else {
        vec![
            Doc::text(COMMENT),
            Doc::text(" "),
            Doc::text(content),
            Doc::text(" "),
            Doc::text(CLOSE),
        ]
    };
    Doc::concat(parts).broken()
}

fn render_statement(statement: &Statement, options: &Options) -> Doc {
    let fragment = &statement.fragment;
    let tag = render_tag(STATEMENT, &fragment.content, fragment.start_block, options);

    if statement
        .keyword
        .is_branch()
    {
        // the branch sits one level out from the markup around it, which
        // always ends up on lines of its own
        Doc::concat(vec![
            Doc::hardline().dedent(),
            tag,
            Doc::hardline(),
        ])
    } else {
        tag
    }
}

fn render_tag(open: &str, content: &str, start_block: bool, options: &Options) -> Doc {
    if content.is_empty() {
        return Doc::concat(vec![Doc::text(open), Doc::text(" "), Doc::text(CLOSE)]);
    }

    if !content.contains('\n') {
        return Doc::join(
            Doc::text(" "),
            vec![Doc::text(open), Doc::text(content), Doc::text(CLOSE)],
        )
        .group();
    }

    let lines: Vec<&str> = content
        .split('\n')
        .collect();
    let verbatim = verbatim_lines(content);
    let last_verbatim = verbatim
        .last()
        .copied()
        .unwrap_or(false);

    let (mut parts, pad) = if start_block && options.new_line_block {
        (vec![Doc::text(open), Doc::hardline()], String::new())
    } else {
        // continuation lines line up under the first character of Ruby
        (
            vec![Doc::text(open), Doc::text(" ")],
            " ".repeat(open.len() + 1),
        )
    };

    for (i, (line, verbatim)) in lines
        .into_iter()
        .zip(verbatim)
        .enumerate()
    {
        if i > 0 {
            if verbatim {
                // inside a string or heredoc, so not ours to indent
                parts.push(Doc::text(format!("\n{}", line)));
                continue;
            }
            parts.push(Doc::hardline());
            if !line.is_empty() && !pad.is_empty() {
                parts.push(Doc::text(pad.as_str()));
            }
        }
        parts.push(Doc::text(line));
    }

    if start_block && options.new_line_block {
        // everything after the open tag is one level in
        let open = parts.remove(0);
        return Doc::concat(vec![
            open,
            Doc::concat(parts).indent(),
            Doc::hardline(),
            Doc::text(CLOSE),
        ]);
    }

    // a heredoc terminator has to stay alone on its line
    if last_verbatim {
        parts.push(Doc::hardline());
    } else {
        parts.push(Doc::text(" "));
    }
    parts.push(Doc::text(CLOSE));

    Doc::concat(parts)
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::formatting::render;
    use crate::language::{Comment, Fragment, Keyword, Span};

    fn fragment(content: &str, start_block: bool) -> Fragment {
        Fragment::new("#~1~#".to_string(), Span::default(), content.to_string(), start_block)
    }

    fn statement(content: &str, keyword: Keyword, start_block: bool) -> Node {
        Node::Statement(Statement {
            fragment: fragment(content, start_block),
            keyword,
        })
    }

    fn print(node: &Node, options: &Options) -> String {
        render(&render_node(Some(node), options), options.width, options.indent)
    }

    #[test]
    fn single_line_tags() {
        let options = Options::default();

        let node = Node::Expression(fragment("user.name", false));
        assert_eq!(print(&node, &options), "<%= user.name %>");

        let node = statement("x = 1", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% x = 1 %>");

        let node = statement("", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% %>");
    }

    #[test]
    fn unescaped_output_keeps_its_marker() {
        let options = Options::default();

        let node = Node::Expression(fragment("raw html", false).unescaped());
        assert_eq!(print(&node, &options), "<%== raw html %>");

        let node = Node::Expression(fragment("a(
  b
)", false).unescaped());
        assert_eq!(print(&node, &options), "<%== a(
       b
     ) %>");
    }

    #[test]
    fn multi_line_statements_align() {
        let options = Options::default();

        let node = statement("a = 1\nb = 2", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% a = 1\n   b = 2 %>");

        let node = Node::Expression(fragment("link_to(\n  name,\n  path\n)", false));
        assert_eq!(
            print(&node, &options),
            "<%= link_to(\n      name,\n      path\n    ) %>"
        );
    }

    #[test]
    fn literal_lines_are_not_padded() {
        let options = Options::default();

        let node = statement("x = \"one\n      two\"\ny = 1", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% x = \"one\n      two\"\n   y = 1 %>");

        let node = statement("sql = <<~SQL\n  SELECT   *\nSQL", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% sql = <<~SQL\n  SELECT   *\nSQL\n%>");
    }

    #[test]
    fn blank_lines_carry_no_padding() {
        let options = Options::default();

        let node = statement("a = 1\n\nb = 2", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% a = 1\n\n   b = 2 %>");
    }

    #[test]
    fn new_line_block_openers() {
        let options = Options {
            new_line_block: true,
            ..Options::default()
        };

        let node = Node::Expression(fragment("form_with(\n  model: @user\n) do |f|", true));
        assert_eq!(
            print(&node, &options),
            "<%=\n  form_with(\n    model: @user\n  ) do |f|\n%>"
        );

        // only block openers are affected
        let node = statement("a = 1\nb = 2", Keyword::None, false);
        assert_eq!(print(&node, &options), "<% a = 1\n   b = 2 %>");
    }

    #[test]
    fn branches_sit_on_their_own_lines() {
        let options = Options::default();

        let node = statement("else", Keyword::Else, false);
        let doc = Doc::concat(vec![
            Doc::text("<% if x %>"),
            Doc::concat(vec![
                Doc::hardline(),
                Doc::text("a"),
                render_node(Some(&node), &options),
                Doc::text("b"),
            ])
            .indent(),
            Doc::hardline(),
            Doc::text("<% end %>"),
        ]);
        assert_eq!(
            render(&doc, 80, 2),
            "<% if x %>\n  a\n<% else %>\n  b\n<% end %>"
        );
    }

    #[test]
    fn comments_always_break() {
        let options = Options::default();
        let node = Node::Comment(Comment {
            id: "#~1~#".to_string(),
            span: Span::default(),
            content: "note".to_string(),
        });

        let doc = render_node(Some(&node), &options);
        assert!(matches!(doc, Doc::Group { broken: true, .. }));
        assert_eq!(print(&node, &options), "<%# note %>");

        let empty = Node::Comment(Comment {
            id: "#~1~#".to_string(),
            span: Span::default(),
            content: String::new(),
        });
        assert_eq!(print(&empty, &options), "<%# %>");

        let doc = Doc::concat(vec![Doc::text("<p>"), Doc::softline(), doc])
            .group();
        assert_eq!(render(&doc, 80, 2), "<p>\n<%# note %>");
    }

    #[test]
    fn nothing_for_containers_or_missing_nodes() {
        let options = Options::default();
        assert!(render_node(None, &options).is_nil());
    }
}
