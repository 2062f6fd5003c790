use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};

use erbfmt::config::{self, ConfigError};
use erbfmt::delegates::{self, Html, MarkupFormatter, Ruby, ScriptFormatter};
use erbfmt::formatting::{self, Options};
use erbfmt::parsing;

mod problem;

fn formatting_arguments(command: Command) -> Command {
    command
        .arg(
            Arg::new("width")
                .long("width")
                .value_parser(value_parser!(usize))
                .help("Column limit to keep lines within. The default is 80."),
        )
        .arg(
            Arg::new("indent")
                .long("indent")
                .value_parser(value_parser!(usize))
                .help("Spaces per level of indentation. The default is 2."),
        )
        .arg(
            Arg::new("new-line-block")
                .long("new-line-block")
                .action(ArgAction::SetTrue)
                .help("Put the Ruby of multi-line block openers on lines of its own, between the <% and %>."),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Read options from this TOML file rather than .erbfmt.toml in the current directory."),
        )
        .arg(
            Arg::new("markup-command")
                .long("markup-command")
                .help("External program to format HTML with, reading standard input and writing standard output. The built-in formatter is used otherwise."),
        )
        .arg(
            Arg::new("script-command")
                .long("script-command")
                .help("External program to format Ruby with, reading standard input and writing standard output. The built-in formatter is used otherwise."),
        )
        .arg(
            Arg::new("filename")
                .required(true)
                .help("The ERB template to format."),
        )
}

#[tokio::main]
async fn main() {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    let matches = Command::new("erbfmt")
        .version(VERSION)
        .propagate_version(true)
        .about("Formatter for ERB templates, HTML with embedded Ruby.")
        .disable_help_subcommand(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Report progress on standard error. Repeat for more detail."),
        )
        .subcommand(formatting_arguments(
            Command::new("format")
                .about("Format the given template, printing the result")
                .arg(
                    Arg::new("write")
                        .short('w')
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Overwrite the file with the formatted result rather than printing it."),
                ),
        ))
        .subcommand(formatting_arguments(
            Command::new("check")
                .about("Check that the given template is already formatted"),
        ))
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match matches.subcommand() {
        Some(("format", submatches)) => {
            let write = submatches.get_flag("write");
            run(submatches, if write { Mode::Write } else { Mode::Print }).await;
        }
        Some(("check", submatches)) => {
            run(submatches, Mode::Check).await;
        }
        Some(_) => {
            println!("No valid subcommand was used")
        }
        None => {
            println!("usage: erbfmt [COMMAND] ...");
            println!("Try '--help' for more information.");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Print,
    Write,
    Check,
}

fn options_from(submatches: &ArgMatches) -> Result<Options, ConfigError> {
    let explicit = submatches
        .get_one::<String>("config")
        .map(Path::new);
    let directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut options = config::resolve(explicit, &directory)?;

    if let Some(width) = submatches.get_one::<usize>("width") {
        options.width = *width;
    }
    if let Some(indent) = submatches.get_one::<usize>("indent") {
        options.indent = *indent;
    }
    if submatches.get_flag("new-line-block") {
        options.new_line_block = true;
    }

    debug!(?options);
    Ok(options)
}

async fn run(submatches: &ArgMatches, mode: Mode) {
    let filename = match submatches.get_one::<String>("filename") {
        Some(filename) => Path::new(filename),
        None => {
            eprintln!("{}: no template given", "error".bright_red());
            std::process::exit(1);
        }
    };

    if !parsing::is_template(filename) {
        warn!(
            "{} does not end in {}; formatting it as an ERB template anyway",
            filename.display(),
            parsing::EXTENSION
        );
    }

    let options = match options_from(submatches) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("{}", problem::concise_config_error(&error));
            std::process::exit(1);
        }
    };

    let content = match parsing::load(filename) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}", problem::concise_loading_error(&error));
            std::process::exit(1);
        }
    };

    let mut tree = match parsing::parse(filename, &content) {
        Ok(tree) => tree,
        Err(error) => {
            eprintln!(
                "{}",
                problem::full_parsing_error(&error, filename, &content)
            );
            std::process::exit(1);
        }
    };

    let markup: Box<dyn MarkupFormatter> = match submatches
        .get_one::<String>("markup-command")
        .and_then(|line| delegates::Command::parse(line))
    {
        Some(command) => {
            info!("Formatting HTML with {}", command.program());
            Box::new(command)
        }
        None => Box::new(Html),
    };

    let script: Box<dyn ScriptFormatter> = match submatches
        .get_one::<String>("script-command")
        .and_then(|line| delegates::Command::parse(line))
    {
        Some(command) => {
            info!("Formatting Ruby with {}", command.program());
            Box::new(command)
        }
        None => Box::new(Ruby),
    };

    let result = match formatting::format_tree(
        &mut tree,
        markup.as_ref(),
        script.as_ref(),
        &options,
    )
    .await
    {
        Ok(result) => result,
        Err(error) => {
            eprintln!(
                "{}",
                problem::full_formatting_error(&error, filename, &content)
            );
            std::process::exit(1);
        }
    };

    match mode {
        Mode::Print => print!("{}", result),
        Mode::Write => {
            if result == content {
                info!("{} is already formatted", filename.display());
                return;
            }
            if let Err(error) = std::fs::write(filename, &result) {
                eprintln!(
                    "{}: {}: {}",
                    "error".bright_red(),
                    filename.display(),
                    error
                );
                std::process::exit(1);
            }
            info!("Wrote {}", filename.display());
        }
        Mode::Check => {
            if result != content {
                eprintln!(
                    "{}: {} is not formatted",
                    "error".bright_red(),
                    filename.display()
                );
                std::process::exit(1);
            }
            info!("{} is formatted", filename.display());
        }
    }
}
