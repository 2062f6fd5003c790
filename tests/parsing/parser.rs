#[cfg(test)]
mod verify {
    use std::path::Path;

    use erbfmt::language::*;
    use erbfmt::parsing::{self, parser::parse_template};

    fn ids(set: &indexmap::IndexSet<NodeId>) -> Vec<&str> {
        set.iter()
            .map(|id| id.as_str())
            .collect()
    }

    #[test]
    fn markup_only() {
        let tree = parse_template("<p>Hello</p>\n").unwrap();
        assert_eq!(tree.root, "#~0~#");
        assert_eq!(tree.len(), 1);

        let root = tree
            .get("#~0~#")
            .unwrap();
        assert_eq!(root.scope(), Some(("<p>Hello</p>\n", &Default::default())));
    }

    #[test]
    fn tags_become_placeholders() {
        let tree = parse_template("<p><%= user.name %></p><% x = 1 %><%# note %>").unwrap();

        let (content, scope) = tree
            .get(&tree.root)
            .and_then(Node::scope)
            .unwrap();
        assert_eq!(content, "<p>#~1~#</p>#~2~##~3~#");
        assert_eq!(ids(scope), vec!["#~1~#", "#~2~#", "#~3~#"]);

        match tree.get("#~1~#") {
            Some(Node::Expression(fragment)) => {
                assert_eq!(fragment.content, "user.name");
                assert_eq!(fragment.state, State::Unformatted);
                assert!(!fragment.start_block);
                assert_eq!(
                    fragment.span,
                    Span {
                        index: 3,
                        length: 16
                    }
                );
            }
            other => panic!("expected an expression, found {:?}", other),
        }

        match tree.get("#~2~#") {
            Some(Node::Statement(statement)) => {
                assert_eq!(statement.keyword, Keyword::None);
                assert_eq!(
                    statement
                        .fragment
                        .content,
                    "x = 1"
                );
            }
            other => panic!("expected a statement, found {:?}", other),
        }

        match tree.get("#~3~#") {
            Some(Node::Comment(comment)) => assert_eq!(comment.content, "note"),
            other => panic!("expected a comment, found {:?}", other),
        }
    }

    #[test]
    fn unescaped_output_tags() {
        let tree = parse_template("<p><%== raw %><%= escaped %></p>").unwrap();

        match tree.get("#~1~#") {
            Some(Node::Expression(fragment)) => {
                assert_eq!(fragment.content, "raw");
                assert!(fragment.raw);
                assert_eq!(
                    fragment.span,
                    Span {
                        index: 3,
                        length: 11
                    }
                );
            }
            other => panic!("expected an expression, found {:?}", other),
        }

        match tree.get("#~2~#") {
            Some(Node::Expression(fragment)) => {
                assert_eq!(fragment.content, "escaped");
                assert!(!fragment.raw);
            }
            other => panic!("expected an expression, found {:?}", other),
        }
    }

    #[test]
    fn blocks_hold_their_content() {
        let tree = parse_template(
            "<div><% if a %><b><%= x %></b><% else %><i>y</i><% end %></div>",
        )
        .unwrap();

        let (content, scope) = tree
            .get(&tree.root)
            .and_then(Node::scope)
            .unwrap();
        assert_eq!(content, "<div>#~5~#</div>");
        // every id reachable from the document, nested ones included
        assert_eq!(ids(scope), vec!["#~1~#", "#~2~#", "#~3~#", "#~4~#", "#~5~#"]);

        match tree.get("#~5~#") {
            Some(Node::Block(block)) => {
                assert_eq!(block.content, "<b>#~2~#</b>#~3~#<i>y</i>");
                assert_eq!(block.start, "#~1~#");
                assert_eq!(block.end, "#~4~#");
                assert_eq!(ids(&block.nodes), vec!["#~1~#", "#~2~#", "#~3~#", "#~4~#"]);
            }
            other => panic!("expected a block, found {:?}", other),
        }

        assert_eq!(
            tree.get("#~1~#")
                .unwrap()
                .keyword(),
            Keyword::If
        );
        assert_eq!(
            tree.get("#~3~#")
                .unwrap()
                .keyword(),
            Keyword::Else
        );
        assert_eq!(
            tree.get("#~4~#")
                .unwrap()
                .keyword(),
            Keyword::End
        );
    }

    #[test]
    fn nested_blocks() {
        let tree = parse_template(
            "<% @rows.each do |row| %><% row.each do |cell| %><%= cell %><% end %><% end %>",
        )
        .unwrap();

        let outer = match tree.get("#~7~#") {
            Some(Node::Block(block)) => block.clone(),
            other => panic!("expected a block, found {:?}", other),
        };
        assert_eq!(outer.content, "#~5~#");
        assert_eq!(
            ids(&outer.nodes),
            vec!["#~1~#", "#~2~#", "#~3~#", "#~4~#", "#~5~#", "#~6~#"]
        );

        let inner = match tree.get("#~5~#") {
            Some(Node::Block(block)) => block.clone(),
            other => panic!("expected a block, found {:?}", other),
        };
        assert_eq!(inner.content, "#~3~#");
        assert_eq!(inner.start, "#~2~#");
    }

    #[test]
    fn expressions_can_open_blocks() {
        let tree = parse_template("<%= form_with do |f| %>x<% end %>").unwrap();

        match tree.get("#~1~#") {
            Some(Node::Expression(fragment)) => assert!(fragment.start_block),
            other => panic!("expected an expression, found {:?}", other),
        }
        assert!(matches!(tree.get("#~3~#"), Some(Node::Block(_))));
    }

    #[test]
    fn recognizing_templates() {
        assert!(parsing::is_template(Path::new("app/views/users/show.html.erb")));
        assert!(!parsing::is_template(Path::new("show.erb")));
        assert!(!parsing::is_template(Path::new("show.html")));
    }

    #[test]
    fn loading_missing_files() {
        let result = parsing::load(Path::new("tests/golden/missing.html.erb"));
        let error = result.unwrap_err();
        assert_eq!(error.problem, "File not found");
    }
}
