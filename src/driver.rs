//! The batch read-eval-dispatch loop.

use std::io::Write;

use crate::command::CommandRegistry;
use crate::input::CommandInput;
use crate::options::BatchOptions;
use crate::tokenizer::{self, LineParse, MAX_LINE_BYTES, MAX_PARAMS};

/// Runs commands read from a [`CommandInput`] until end of input, a stream
/// error, or a failure with stop-on-error in effect.
///
/// The driver owns the session's [`BatchOptions`]; the registry receives a
/// mutable borrow with every dispatch so that `set` can adjust them
/// mid-session. Prompt, echo, and feedback text go to `out`, diagnostics to
/// `err`, both flushed after every command so the loop stays responsive when
/// piped.
///
/// ```
/// use gmbatch::{BatchDriver, BatchOptions};
/// use gmbatch::command::Registry;
/// use gmbatch::input::ReaderInput;
/// use std::io::Cursor;
///
/// let mut registry = Registry::default();
/// let mut driver = BatchDriver::new("gm", BatchOptions::default(), &mut registry);
/// let mut input = ReaderInput::new(Cursor::new("set -echo on\n"));
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// assert!(driver.run(&mut input, &mut out, &mut err));
/// assert!(driver.options().echo);
/// ```
pub struct BatchDriver<'r> {
    client: String,
    options: BatchOptions,
    registry: &'r mut dyn CommandRegistry,
}

impl<'r> BatchDriver<'r> {
    pub fn new(
        client: impl Into<String>,
        options: BatchOptions,
        registry: &'r mut dyn CommandRegistry,
    ) -> Self {
        Self {
            client: client.into(),
            options,
            registry,
        }
    }

    /// The session options as they stand right now.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run the loop to completion. Returns the last command's verdict, or
    /// `true` when the input ended with nothing having run.
    pub fn run(
        &mut self,
        input: &mut dyn CommandInput,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> bool {
        let mut status = true;
        loop {
            let prompt = self.options.prompt.clone().unwrap_or_default();
            input.begin_command(&prompt);
            if !prompt.is_empty()
                && !input.prompts()
                && write!(out, "{prompt}").and_then(|()| out.flush()).is_err()
            {
                break;
            }
            let parsed =
                match tokenizer::read_command(input, self.options.escape, MAX_PARAMS, MAX_LINE_BYTES)
                {
                    Ok(parsed) => parsed,
                    Err(_) => break,
                };
            let passed = match parsed {
                LineParse::Eof => break,
                LineParse::Args(words) => {
                    if self.options.echo
                        && writeln!(out, "{}", words.join(" "))
                            .and_then(|()| out.flush())
                            .is_err()
                    {
                        break;
                    }
                    // A blank line runs nothing and produces no feedback.
                    if words.is_empty() {
                        continue;
                    }
                    let mut argv = Vec::with_capacity(words.len() + 1);
                    argv.push(self.client.clone());
                    argv.extend(words);
                    match self.registry.dispatch(&mut self.options, &argv) {
                        Ok(passed) => passed,
                        Err(e) => {
                            if writeln!(err, "{}: {e:#}", self.client).is_err() {
                                break;
                            }
                            false
                        }
                    }
                }
                LineParse::TooManyArgs => {
                    if writeln!(
                        err,
                        "{}: too many parameters on command line (limit {MAX_PARAMS})",
                        self.client
                    )
                    .is_err()
                    {
                        break;
                    }
                    false
                }
                LineParse::LineTooLong => {
                    if writeln!(
                        err,
                        "{}: command line too long (limit {MAX_LINE_BYTES} characters)",
                        self.client
                    )
                    .is_err()
                    {
                        break;
                    }
                    false
                }
            };
            status = passed;
            if self.options.feedback {
                let text = if passed {
                    self.options.pass_text.as_str()
                } else {
                    self.options.fail_text.as_str()
                };
                if writeln!(out, "{text}").is_err() {
                    break;
                }
            }
            if err.flush().and(out.flush()).is_err() {
                break;
            }
            if self.options.stop_on_error && !passed {
                break;
            }
        }
        if self.options.prompt.as_deref().is_some_and(|p| !p.is_empty()) {
            let _ = writeln!(out);
        }
        status
    }
}
