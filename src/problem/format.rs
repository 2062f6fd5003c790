use super::messages::{config_error_message, formatting_error_message};
use erbfmt::{
    config::ConfigError,
    language::{FormattingError, LoadingError},
    parsing::ParsingError,
};
use owo_colors::OwoColorize;
use std::path::Path;

/// Format a parsing error with full details including source code context
pub fn full_parsing_error<'i>(error: &ParsingError, filename: &'i Path, source: &'i str) -> String {
    let problem = error.message();
    let details = error.details();
    let offset = error.offset();

    let i = calculate_line_number(source, offset);
    let j = calculate_column_number(source, offset);

    let code = source
        .lines()
        .nth(i)
        .unwrap_or("?");
    let line = i + 1;
    let column = j + 1;
    let width = 3.max(
        line.to_string()
            .len(),
    );

    format!(
        r#"
{}: {}:{}:{} {}

{:width$} {}
{:width$} {} {}
{:width$} {} {:>column$}

{}
        "#,
        "error".bright_red(),
        filename.to_string_lossy(),
        line,
        column,
        problem.bold(),
        ' ',
        '|'.bright_blue(),
        line.bright_blue(),
        '|'.bright_blue(),
        code,
        ' ',
        '|'.bright_blue(),
        '^'.bright_red(),
        details
    )
    .trim_ascii()
    .to_string()
}

/// Format a formatting failure. Parse failures inside it get the full
/// treatment with source context.
pub fn full_formatting_error<'i>(
    error: &FormattingError,
    filename: &'i Path,
    source: &'i str,
) -> String {
    if let FormattingError::Parsing { source: inner } = error {
        return full_parsing_error(inner, filename, source);
    }

    let (problem, details) = formatting_error_message(error);

    format!(
        "{}: {}: {}\n\n{}",
        "error".bright_red(),
        filename.to_string_lossy(),
        problem.bold(),
        details
    )
}

/// Format a LoadingError with concise single-line output
pub fn concise_loading_error<'i>(error: &LoadingError<'i>) -> String {
    format!(
        "{}: {}:{}",
        "error".bright_red(),
        error
            .filename
            .display(),
        error
            .problem
            .bold()
    )
}

pub fn concise_config_error(error: &ConfigError) -> String {
    let (problem, details) = config_error_message(error);
    format!(
        "{}: {}\n\n{}",
        "error".bright_red(),
        problem.bold(),
        details
    )
}

// Helper functions for line/column calculation
fn calculate_line_number(content: &str, offset: usize) -> usize {
    content[..offset]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
}

fn calculate_column_number(content: &str, offset: usize) -> usize {
    let before = &content[..offset];
    match before.rfind('\n') {
        Some(start) => content[start + 1..offset]
            .chars()
            .count(),
        None => before
            .chars()
            .count(),
    }
}
