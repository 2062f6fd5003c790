//! The formatters that the composition hands each language to.
//!
//! Composition only ever talks to the two traits here. A markup formatter
//! must leave placeholder tokens inside its text leaves exactly as it found
//! them; a script formatter must accept a whole program and return text.

use async_trait::async_trait;

use crate::formatting::{Doc, Options};
use crate::language::DelegateError;

mod command;
mod html;
mod ruby;

pub use command::Command;
pub use html::Html;
pub use ruby::{verbatim_lines, Ruby};

#[async_trait]
pub trait MarkupFormatter: Send + Sync {
    async fn format_markup(&self, source: &str, options: &Options) -> Result<Doc, DelegateError>;
}

#[async_trait]
pub trait ScriptFormatter: Send + Sync {
    async fn format_script(&self, source: &str, options: &Options)
        -> Result<String, DelegateError>;
}
