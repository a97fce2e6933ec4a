//! Batch session options and the `-flag value` processor that fills them.

use std::fmt;

use crate::tokenizer::EscapeStyle;

/// Field width for the pass, fail, and prompt texts; longer values are
/// truncated on assignment.
pub const MAX_TEXT: usize = 256;

/// Prompt used when reading commands interactively with no explicit file.
pub const DEFAULT_PROMPT: &str = "GM> ";

pub const USAGE: &str = "\
Usage: gmbatch [options ...] [file|-]

Read commands one per line from a file, or interactively from the terminal,
and dispatch each one to the toolkit command registry.

Options:
  -echo on|off            echo each command line before it is executed
  -escape unix|windows    quoting convention for command lines
  -fail text              text printed after a failed command
  -feedback on|off        print pass/fail feedback after each command
  -help, -?               print this message and exit
  -pass text              text printed after a successful command
  -prompt text            interactive prompt; the literal 'off' disables it
  -stop-on-error on|off   stop at the first failing command";

/// Live settings of one batch session.
///
/// Constructed once at batch entry and mutated only through [`apply`] /
/// [`apply_atomic`], both at startup and from the `set` sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub escape: EscapeStyle,
    pub echo: bool,
    pub feedback: bool,
    pub stop_on_error: bool,
    pub pass_text: String,
    pub fail_text: String,
    /// `None` until set; the entry point substitutes [`DEFAULT_PROMPT`] for
    /// interactive sessions. An empty string disables prompting.
    pub prompt: Option<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            escape: EscapeStyle::Unix,
            echo: false,
            feedback: false,
            stop_on_error: false,
            pass_text: "PASS".to_owned(),
            fail_text: "FAIL".to_owned(),
            prompt: None,
        }
    }
}

/// Successful result of option processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Index of the first non-option argument; equals the vector length when
    /// every argument was an option.
    Positional(usize),
    /// `-help` or `-?` was seen; the caller prints usage and stops.
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    Unknown(String),
    MissingValue(String),
    InvalidValue { option: String, value: String },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::Unknown(option) => write!(f, "unrecognized option '{option}'"),
            OptionError::MissingValue(option) => write!(f, "option '{option}' requires a value"),
            OptionError::InvalidValue { option, value } => {
                write!(f, "invalid value '{value}' for option '{option}'")
            }
        }
    }
}

impl std::error::Error for OptionError {}

/// Process leading `-flag value` pairs of `args` into `options`.
///
/// Stops at the first argument that does not start with `-` (or is the bare
/// `-` standing for standard input) and reports its index. Errors may leave
/// `options` partially updated; use [`apply_atomic`] when that matters.
pub fn apply<S: AsRef<str>>(args: &[S], options: &mut BatchOptions) -> Result<Outcome, OptionError> {
    let mut i = 0;
    while i < args.len() {
        let option = args[i].as_ref();
        if !option.starts_with('-') || option == "-" {
            return Ok(Outcome::Positional(i));
        }
        match option {
            "-help" | "-?" => return Ok(Outcome::Help),
            "-echo" | "-escape" | "-fail" | "-feedback" | "-pass" | "-prompt"
            | "-stop-on-error" => {}
            _ => return Err(OptionError::Unknown(option.to_owned())),
        }
        let value = match args.get(i + 1) {
            Some(v) => v.as_ref(),
            None => return Err(OptionError::MissingValue(option.to_owned())),
        };
        match option {
            "-echo" => options.echo = parse_switch(option, value)?,
            "-escape" => {
                options.escape = value.parse().map_err(|()| OptionError::InvalidValue {
                    option: option.to_owned(),
                    value: value.to_owned(),
                })?;
            }
            "-fail" => options.fail_text = bounded(value),
            "-feedback" => options.feedback = parse_switch(option, value)?,
            "-pass" => options.pass_text = bounded(value),
            // The literal value "off" clears the prompt; a prompt that reads
            // "off" cannot be configured.
            "-prompt" => {
                options.prompt = Some(if value == "off" {
                    String::new()
                } else {
                    bounded(value)
                });
            }
            "-stop-on-error" => options.stop_on_error = parse_switch(option, value)?,
            _ => unreachable!("option validated above"),
        }
        i += 2;
    }
    Ok(Outcome::Positional(args.len()))
}

/// Like [`apply`], but all-or-nothing: `options` is updated only when the
/// whole vector parses as options with nothing left over. Backs the `set`
/// sub-command, where a bad flag must not disturb the live session.
pub fn apply_atomic<S: AsRef<str>>(
    args: &[S],
    options: &mut BatchOptions,
) -> Result<Outcome, OptionError> {
    let mut trial = options.clone();
    let outcome = apply(args, &mut trial)?;
    if outcome == Outcome::Positional(args.len()) {
        *options = trial;
    }
    Ok(outcome)
}

fn parse_switch(option: &str, value: &str) -> Result<bool, OptionError> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(OptionError::InvalidValue {
            option: option.to_owned(),
            value: value.to_owned(),
        }),
    }
}

fn bounded(value: &str) -> String {
    value.chars().take(MAX_TEXT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_every_flag() {
        let mut options = BatchOptions::default();
        let args = [
            "-escape",
            "windows",
            "-echo",
            "on",
            "-feedback",
            "on",
            "-fail",
            "no",
            "-pass",
            "yes",
            "-prompt",
            "batch> ",
            "-stop-on-error",
            "on",
        ];
        let outcome = apply(&args, &mut options).unwrap();
        assert_eq!(outcome, Outcome::Positional(args.len()));
        assert_eq!(options.escape, EscapeStyle::Windows);
        assert!(options.echo);
        assert!(options.feedback);
        assert!(options.stop_on_error);
        assert_eq!(options.pass_text, "yes");
        assert_eq!(options.fail_text, "no");
        assert_eq!(options.prompt.as_deref(), Some("batch> "));
    }

    #[test]
    fn stops_at_first_positional() {
        let mut options = BatchOptions::default();
        let outcome = apply(&["-echo", "on", "script.txt", "-feedback", "on"], &mut options);
        assert_eq!(outcome, Ok(Outcome::Positional(2)));
        assert!(options.echo);
        assert!(!options.feedback);
    }

    #[test]
    fn bare_dash_is_positional() {
        let mut options = BatchOptions::default();
        assert_eq!(apply(&["-"], &mut options), Ok(Outcome::Positional(0)));
    }

    #[test]
    fn help_short_circuits() {
        let mut options = BatchOptions::default();
        assert_eq!(apply(&["-echo", "on", "-help"], &mut options), Ok(Outcome::Help));
        assert_eq!(apply(&["-?"], &mut options), Ok(Outcome::Help));
    }

    #[test]
    fn unknown_option_is_reported() {
        let mut options = BatchOptions::default();
        assert_eq!(
            apply(&["-bogus", "on"], &mut options),
            Err(OptionError::Unknown("-bogus".to_owned()))
        );
    }

    #[test]
    fn missing_value_is_reported() {
        let mut options = BatchOptions::default();
        assert_eq!(
            apply(&["-echo"], &mut options),
            Err(OptionError::MissingValue("-echo".to_owned()))
        );
    }

    #[test]
    fn invalid_switch_value_is_reported() {
        let mut options = BatchOptions::default();
        assert_eq!(
            apply(&["-feedback", "bogus"], &mut options),
            Err(OptionError::InvalidValue {
                option: "-feedback".to_owned(),
                value: "bogus".to_owned(),
            })
        );
    }

    #[test]
    fn prompt_off_clears_the_prompt() {
        let mut options = BatchOptions::default();
        apply(&["-prompt", "go: "], &mut options).unwrap();
        assert_eq!(options.prompt.as_deref(), Some("go: "));
        apply(&["-prompt", "off"], &mut options).unwrap();
        assert_eq!(options.prompt.as_deref(), Some(""));
    }

    #[test]
    fn texts_are_truncated_to_field_width() {
        let mut options = BatchOptions::default();
        let long = "x".repeat(MAX_TEXT + 40);
        apply(&["-pass", &long], &mut options).unwrap();
        assert_eq!(options.pass_text.chars().count(), MAX_TEXT);
    }

    #[test]
    fn atomic_apply_rolls_back_on_error() {
        let mut options = BatchOptions::default();
        let err = apply_atomic(&["-echo", "on", "-feedback", "bogus"], &mut options);
        assert!(err.is_err());
        assert!(!options.echo);
    }

    #[test]
    fn atomic_apply_rejects_trailing_positionals() {
        let mut options = BatchOptions::default();
        let outcome = apply_atomic(&["-echo", "on", "stray"], &mut options).unwrap();
        assert_eq!(outcome, Outcome::Positional(2));
        assert!(!options.echo);
    }

    #[test]
    fn atomic_apply_commits_on_success() {
        let mut options = BatchOptions::default();
        apply_atomic(&["-echo", "on"], &mut options).unwrap();
        assert!(options.echo);
    }

    #[test]
    fn error_messages_name_the_offender() {
        let e = OptionError::InvalidValue {
            option: "-escape".to_owned(),
            value: "dos".to_owned(),
        };
        assert_eq!(e.to_string(), "invalid value 'dos' for option '-escape'");
        assert_eq!(
            OptionError::Unknown("-x".to_owned()).to_string(),
            "unrecognized option '-x'"
        );
    }
}
