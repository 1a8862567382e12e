//! Command-line argument parsing
//!
//! Hand-rolled rather than derived: unknown flags are skipped, a value flag
//! takes the next token whatever it looks like, and `--help` goes to
//! standard error.

use crate::domain::error::ArgParseError;
use crate::domain::notification::NotifyConfig;

/// Usage text, printed to standard error
pub const USAGE: &str = "\
Usage:
  notifytool --title <title> --body <body> [--subtitle <subtitle>] [--no-sound]

Examples:
  notifytool --title \"Backup Complete\" --body \"Your backup finished successfully.\"
  notifytool --title \"Job Done\" --body \"Task finished.\" --subtitle \"Job #42\"
";

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    Run(NotifyConfig),
    Help,
}

/// Parse arguments, excluding the program name.
///
/// `--help` wins as soon as it is seen; required flags are checked only
/// after every token was consumed.
pub fn parse_args<I>(args: I) -> Result<ParsedArgs, ArgParseError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);

    let mut title = None;
    let mut subtitle = None;
    let mut body = None;
    let mut sound = true;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => title = Some(value_for(&mut args, "--title")?),
            "--subtitle" => subtitle = Some(value_for(&mut args, "--subtitle")?),
            "--body" | "--message" => body = Some(value_for(&mut args, "--body")?),
            "--no-sound" => sound = false,
            "--help" | "-h" => return Ok(ParsedArgs::Help),
            _ => {}
        }
    }

    let title = title.ok_or_else(|| ArgParseError::MissingRequired("--title".to_string()))?;
    let body = body.ok_or_else(|| ArgParseError::MissingRequired("--body".to_string()))?;

    Ok(ParsedArgs::Run(NotifyConfig {
        title,
        subtitle,
        body,
        sound,
    }))
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ArgParseError> {
    args.next()
        .ok_or_else(|| ArgParseError::MissingValue(flag.to_string()))
}
