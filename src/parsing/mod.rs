//! parser for ERB templates

use std::path::Path;
use tracing::debug;

use crate::language::{LoadingError, Node, Tree};

pub mod parser;
mod scope;

pub use parser::ParsingError;

/// Templates combining HTML with embedded Ruby are recognized by this
/// double extension.
pub const EXTENSION: &str = ".html.erb";

pub fn is_template(filename: &Path) -> bool {
    filename
        .to_str()
        .map(|name| name.ends_with(EXTENSION))
        .unwrap_or(false)
}

/// Read a file and return an owned String. The Tree produced by parse()
/// copies what it needs, so the caller is free to keep or drop it.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    match std::fs::read_to_string(filename) {
        Ok(content) => Ok(content),
        Err(error) => {
            debug!(?error);
            match error.kind() {
                std::io::ErrorKind::NotFound => Err(LoadingError {
                    problem: "File not found".to_string(),
                    details: String::new(),
                    filename,
                }),
                _ => Err(LoadingError {
                    problem: "Failed reading".to_string(),
                    details: error
                        .kind()
                        .to_string(),
                    filename,
                }),
            }
        }
    }
}

/// Parse template text into a Tree, or return the error that stopped us.
pub fn parse(filename: &Path, content: &str) -> Result<Tree, ParsingError> {
    let result = parser::parse_template(content);

    match result {
        Ok(tree) => {
            let blocks = tree
                .nodes()
                .filter(|node| matches!(node, Node::Block(_)))
                .count();
            debug!(
                "Found {} node{} and {} block{} in {}",
                tree.len() - 1,
                if tree.len() == 2 { "" } else { "s" },
                blocks,
                if blocks == 1 { "" } else { "s" },
                filename.display()
            );
            Ok(tree)
        }
        Err(error) => {
            debug!("error: {}", error);
            Err(error)
        }
    }
}
