use erbfmt::{
    config::ConfigError,
    language::{DelegateError, FormattingError},
};

/// Problem and detail messages for a failure after parsing succeeded.
pub fn formatting_error_message(error: &FormattingError) -> (String, String) {
    match error {
        FormattingError::Parsing { source } => (source.message(), source.details().to_string()),
        FormattingError::Script { id, source } => (
            format!("Unable to format Ruby in tag {}", id),
            delegate_details(source),
        ),
        FormattingError::Markup { source } => {
            ("Unable to format HTML".to_string(), delegate_details(source))
        }
        FormattingError::Scaffolding { id, formatted } => (
            format!("Ruby formatter rewrote the code surrounding tag {}", id),
            format!(
                r#"
The fragment was wrapped in synthetic code so it could be formatted as a
complete program, but that code did not come back unchanged:

{}
                "#,
                formatted
            )
            .trim_ascii()
            .to_string(),
        ),
        FormattingError::Structure(message) => (
            "Malformed template structure".to_string(),
            format!("{}. This should not have happened! Sorry.", message),
        ),
    }
}

fn delegate_details(error: &DelegateError) -> String {
    match error {
        DelegateError::Rejected(message) => message.clone(),
        DelegateError::Spawn { program, source } => {
            format!("Could not run {}: {}. Is it installed?", program, source)
        }
        DelegateError::Exit {
            program,
            status,
            stderr,
        } => {
            if stderr.is_empty() {
                format!("{} exited with {}.", program, status)
            } else {
                format!("{} exited with {}:\n\n{}", program, status, stderr)
            }
        }
        DelegateError::Encoding { program } => {
            format!("{} wrote something other than UTF-8 text.", program)
        }
    }
}

pub fn config_error_message(error: &ConfigError) -> (String, String) {
    match error {
        ConfigError::Read { path, source } => (
            format!("Unable to read {}", path.display()),
            source.to_string(),
        ),
        ConfigError::Invalid { path, source } => (
            format!("Invalid configuration in {}", path.display()),
            source
                .message()
                .to_string(),
        ),
    }
}
