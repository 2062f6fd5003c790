// Types representing ERB templates and the errors raised while handling them

mod error;
mod types;

// Re-export all public symbols
pub use error::*;
pub use types::*;
