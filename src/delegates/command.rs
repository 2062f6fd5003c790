//! Delegate formatting to an external program, feeding it source on
//! standard input and reading the result from standard output.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::delegates::{MarkupFormatter, ScriptFormatter};
use crate::formatting::{Doc, Options};
use crate::language::DelegateError;

/// An external formatter, given as a program and its arguments. For
/// example `rufo` or `prettier --parser html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    arguments: Vec<String>,
}

impl Command {
    pub fn new(program: impl Into<String>, arguments: Vec<String>) -> Command {
        Command {
            program: program.into(),
            arguments,
        }
    }

    /// Split a command line on whitespace. Returns None if there is no
    /// program named at all.
    pub fn parse(line: &str) -> Option<Command> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Command::new(
            program,
            words
                .map(str::to_string)
                .collect(),
        ))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, source: &str) -> Result<String, DelegateError> {
        debug!(program = %self.program, "running external formatter");

        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.arguments)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DelegateError::Spawn {
                program: self
                    .program
                    .clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take();
        let input = async move {
            if let Some(mut stdin) = stdin {
                match stdin
                    .write_all(source.as_bytes())
                    .await
                {
                    // a program that quits without reading still has an
                    // exit status worth reporting
                    Err(error) if error.kind() != std::io::ErrorKind::BrokenPipe => {
                        return Err(error)
                    }
                    _ => {}
                }
                // closing stdin lets the program know the input is complete
                drop(stdin);
            }
            Ok(())
        };

        // output has to be drained while input is still going in, or a
        // program that streams will fill its pipe and stall
        let (written, output) = tokio::join!(input, child.wait_with_output());

        let spawn_error = |source| DelegateError::Spawn {
            program: self
                .program
                .clone(),
            source,
        };
        written.map_err(spawn_error)?;
        let output = output.map_err(spawn_error)?;

        if !output
            .status
            .success()
        {
            let stderr = String::from_utf8_lossy(&output.stderr)
                .trim()
                .to_string();
            info!(program = %self.program, status = %output.status, "external formatter failed");
            return Err(DelegateError::Exit {
                program: self
                    .program
                    .clone(),
                status: output.status,
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| DelegateError::Encoding {
            program: self
                .program
                .clone(),
        })
    }
}

#[async_trait]
impl ScriptFormatter for Command {
    async fn format_script(&self, source: &str, _: &Options) -> Result<String, DelegateError> {
        self.run(source)
            .await
    }
}

#[async_trait]
impl MarkupFormatter for Command {
    async fn format_markup(&self, source: &str, options: &Options) -> Result<Doc, DelegateError> {
        let output = self
            .run(source)
            .await?;
        Ok(Doc::indented_lines(&output, options.indent))
    }
}
