#[cfg(test)]
mod verify {
    use async_trait::async_trait;

    use erbfmt::delegates::{Html, MarkupFormatter, Ruby, ScriptFormatter};
    use erbfmt::formatting::{find_placeholders, format_text, Doc, Options};
    use erbfmt::language::{DelegateError, FormattingError};

    async fn format(source: &str) -> String {
        format_text(source, &Html, &Ruby, &Options::default())
            .await
            .unwrap()
    }

    async fn format_with(source: &str, options: &Options) -> String {
        format_text(source, &Html, &Ruby, options)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn conditional_with_branches() {
        let input = r#"
<div>
<% if user.admin?   %>
<p>Admin: <%=user.name%></p>
<%   elsif user.guest? %>
<p>Guest: <%= user.name   %></p>
<% else %>
<p>Member: <%=  user.name %></p>
<% end %>
</div>
        "#
        .trim_ascii();

        let expected = r#"
<div>
  <% if user.admin? %>
    <p>Admin: <%= user.name %></p>
  <% elsif user.guest? %>
    <p>Guest: <%= user.name %></p>
  <% else %>
    <p>Member: <%= user.name %></p>
  <% end %>
</div>
        "#
        .trim_ascii()
        .to_string()
            + "\n";

        let result = format(input).await;
        assert_eq!(result, expected);
        assert_eq!(format(&result).await, result);
    }

    #[tokio::test]
    async fn every_tag_comes_back_in_order() {
        let result = format("<p><%= a %>, <%= b %> and <%= c %></p>").await;

        assert_eq!(result, "<p><%= a %>, <%= b %> and <%= c %></p>\n");
        assert!(find_placeholders(&result).is_empty());
    }

    #[tokio::test]
    async fn foreign_placeholders_are_left_alone() {
        let result = format("<p>#~42~# <%= x %></p>").await;
        assert_eq!(result, "<p>#~42~# <%= x %></p>\n");
    }

    #[tokio::test]
    async fn trim_markers_are_dropped() {
        let result = format("<%- if x -%>\n<p>y</p>\n<%- end -%>\n").await;
        assert_eq!(result, "<% if x %>\n  <p>y</p>\n<% end %>\n");
    }

    #[tokio::test]
    async fn escaped_tags_are_markup() {
        let result = format("<p><%% raw %></p>").await;
        assert_eq!(result, "<p><%% raw %></p>\n");
    }

    #[tokio::test]
    async fn unescaped_output_is_kept() {
        let result = format("<p><%==   html   %></p>").await;
        assert_eq!(result, "<p><%== html %></p>\n");
        assert_eq!(format(&result).await, result);
    }

    #[tokio::test]
    async fn literals_are_left_alone() {
        let result = format("<% x   =~ /a  b/ %>\n<% s = %q(a   b) %>").await;
        assert_eq!(result, "<% x =~ /a  b/ %>\n<% s = %q(a   b) %>\n");

        let input = "<div>\n<% x = \"line one\n      line   two\" %>\n</div>";
        let expected = "<div>\n  <% x = \"line one\n      line   two\" %>\n</div>\n";
        let result = format(input).await;
        assert_eq!(result, expected);
        assert_eq!(format(&result).await, result);

        let input = "<% sql = <<~SQL\n  SELECT   *\n    FROM users\n  SQL\n%>\n";
        let result = format(input).await;
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn unless_blocks() {
        let result = format("<% unless x %>\n<b>y</b>\n<% end %>").await;
        assert_eq!(result, "<% unless x %>\n  <b>y</b>\n<% end %>\n");
    }

    #[tokio::test]
    async fn multi_line_block_openers() {
        let input = "<%= form_with(\nmodel: @user,\nlocal: true\n) do |f| %>\n<%= f.submit %>\n<% end %>\n";

        let aligned = "<%= form_with(\n      model: @user,\n      local: true\n    ) do |f| %>\n  <%= f.submit %>\n<% end %>\n";
        let result = format(input).await;
        assert_eq!(result, aligned);
        assert_eq!(format(&result).await, result);

        let options = Options {
            new_line_block: true,
            ..Options::default()
        };
        let separate = "<%=\n  form_with(\n    model: @user,\n    local: true\n  ) do |f|\n%>\n  <%= f.submit %>\n<% end %>\n";
        let result = format_with(input, &options).await;
        assert_eq!(result, separate);
        assert_eq!(format_with(&result, &options).await, result);
    }

    #[tokio::test]
    async fn indent_width_is_configurable() {
        let options = Options {
            indent: 4,
            ..Options::default()
        };
        let result = format_with("<ul>\n<li>a</li>\n<li>b</li>\n</ul>", &options).await;
        assert_eq!(result, "<ul>\n    <li>a</li>\n    <li>b</li>\n</ul>\n");
    }

    struct Refuses;

    #[async_trait]
    impl ScriptFormatter for Refuses {
        async fn format_script(&self, _: &str, _: &Options) -> Result<String, DelegateError> {
            Err(DelegateError::Rejected("no".to_string()))
        }
    }

    #[async_trait]
    impl MarkupFormatter for Refuses {
        async fn format_markup(&self, _: &str, _: &Options) -> Result<Doc, DelegateError> {
            Err(DelegateError::Rejected("no".to_string()))
        }
    }

    #[tokio::test]
    async fn delegate_failures_are_fatal() {
        let options = Options::default();

        let result = format_text("<p><%= x %></p>", &Html, &Refuses, &options).await;
        assert!(matches!(result, Err(FormattingError::Script { ref id, .. }) if id == "#~1~#"));

        let result = format_text("<p><%= x %></p>", &Refuses, &Ruby, &options).await;
        assert!(matches!(result, Err(FormattingError::Markup { .. })));
    }

    #[tokio::test]
    async fn parse_failures_are_reported() {
        let options = Options::default();

        let result = format_text("<p><% end %></p>", &Html, &Ruby, &options).await;
        assert!(matches!(result, Err(FormattingError::Parsing { .. })));
    }
}
