#[cfg(test)]
mod syntax {
    use erbfmt::language::Keyword;
    use erbfmt::parsing::parser::{parse_template, ParsingError};

    /// Helper function to check parsing fails with the expected error
    fn expect_error(content: &str, expected: ParsingError) {
        match parse_template(content) {
            Ok(_) => panic!(
                "Expected parsing to fail, but it succeeded for input: {}",
                content
            ),
            Err(error) => assert_eq!(error, expected, "for input '{}'", content),
        }
    }

    #[test]
    fn unterminated_tag() {
        expect_error("<p><%= user.name </p>", ParsingError::UnterminatedTag(3));
    }

    #[test]
    fn end_without_block() {
        expect_error("<p>x</p>\n<% end %>", ParsingError::UnexpectedEnd(9));
    }

    #[test]
    fn branch_outside_block() {
        expect_error("<% else %>", ParsingError::OrphanBranch(0, Keyword::Else));
        expect_error("a<% elsif b %>", ParsingError::OrphanBranch(1, Keyword::Elsif));
    }

    #[test]
    fn block_never_closed() {
        expect_error(
            "<ul>\n<% @items.each do |item| %>\n<li>x</li>",
            ParsingError::UnclosedBlock(5),
        );
        expect_error(
            "<% if a %><% if b %><% end %>",
            ParsingError::UnclosedBlock(0),
        );
    }

    #[test]
    fn messages_name_the_problem() {
        let error = parse_template("<% else %>").unwrap_err();
        assert_eq!(error.message(), "else outside of a conditional block");
        assert_eq!(error.offset(), 0);
        assert!(error
            .to_string()
            .contains("at byte 0"));
    }
}
