//! Splits one line of batch input into an argument vector.
//!
//! Two quoting conventions are supported: Unix (`'`, `"`, `\`) and Windows
//! (`"` with doubled `""` for a literal quote). The splitter reads bytes
//! directly from a [`CommandInput`], so a quoted string may span physical
//! lines; it keeps no state between calls.

use std::io;
use std::mem;
use std::str::FromStr;

use crate::input::CommandInput;

/// Maximum number of arguments accepted on one command line.
pub const MAX_PARAMS: usize = 256;

/// Maximum number of bytes accepted across all arguments of one line.
pub const MAX_LINE_BYTES: usize = 4096;

/// Quoting convention used when splitting a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeStyle {
    /// `'…'` verbatim, `"…"` with backslash escapes, bare `\` escapes one byte.
    #[default]
    Unix,
    /// `"…"` with `""` as an embedded quote; backslash has no meaning.
    Windows,
}

impl FromStr for EscapeStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unix" => Ok(EscapeStyle::Unix),
            "windows" => Ok(EscapeStyle::Windows),
            _ => Err(()),
        }
    }
}

/// Outcome of reading one command line.
///
/// The three failure-ish variants are deliberately distinct: the driver skips
/// nothing on `Eof`, reports a per-variant diagnostic for the two overflow
/// cases, and only ever dispatches the arguments of `Args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineParse {
    /// End of input reached before any token of a new command.
    Eof,
    /// The parsed arguments; empty for a blank or whitespace-only line.
    Args(Vec<String>),
    /// The line held more arguments than the limit; the rest was discarded.
    TooManyArgs,
    /// The line exceeded the byte limit or a quote was left open at end of
    /// input; the rest of the physical line was discarded.
    LineTooLong,
}

/// Read and split the next command line from `input`.
///
/// `max_params` bounds the number of arguments, `max_line` the total bytes
/// stored across them. On either overflow the remainder of the physical line
/// is consumed and discarded so the next call starts on a fresh line.
pub fn read_command(
    input: &mut dyn CommandInput,
    style: EscapeStyle,
    max_params: usize,
    max_line: usize,
) -> io::Result<LineParse> {
    let splitter = Splitter {
        input,
        peeked: None,
        args: Vec::new(),
        current: Vec::new(),
        written: 0,
        token_open: false,
        max_params,
        max_line,
    };
    match style {
        EscapeStyle::Unix => splitter.parse_unix(),
        EscapeStyle::Windows => splitter.parse_windows(),
    }
}

struct Splitter<'a> {
    input: &'a mut dyn CommandInput,
    peeked: Option<u8>,
    args: Vec<String>,
    current: Vec<u8>,
    written: usize,
    token_open: bool,
    max_params: usize,
    max_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Gap,
    Word,
    SingleQuote,
    DoubleQuote,
}

impl Splitter<'_> {
    fn parse_unix(mut self) -> io::Result<LineParse> {
        let mut state = State::Gap;
        loop {
            let Some(b) = self.next()? else {
                return match state {
                    // Unterminated quote: same policy as a buffer overflow.
                    State::SingleQuote | State::DoubleQuote => Ok(LineParse::LineTooLong),
                    _ => self.end_of_input(),
                };
            };
            if b == b'\r' {
                continue;
            }
            match state {
                State::Gap => match b {
                    b' ' | b'\t' => {}
                    b'\n' => return self.finish(),
                    b'#' => return self.comment(),
                    b'\'' => {
                        if let Some(r) = self.open_token()? {
                            return Ok(r);
                        }
                        state = State::SingleQuote;
                    }
                    b'"' => {
                        if let Some(r) = self.open_token()? {
                            return Ok(r);
                        }
                        state = State::DoubleQuote;
                    }
                    b'\\' => {
                        if let Some(r) = self.open_token()? {
                            return Ok(r);
                        }
                        match self.next()? {
                            Some(e) => {
                                if let Some(r) = self.put(e)? {
                                    return Ok(r);
                                }
                                state = State::Word;
                            }
                            None => return self.finish(),
                        }
                    }
                    _ => {
                        if let Some(r) = self.open_token()? {
                            return Ok(r);
                        }
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                        state = State::Word;
                    }
                },
                State::Word => match b {
                    b' ' | b'\t' => {
                        self.close_token();
                        state = State::Gap;
                    }
                    b'\n' => return self.finish(),
                    b'#' => return self.comment(),
                    b'\'' => state = State::SingleQuote,
                    b'"' => state = State::DoubleQuote,
                    b'\\' => match self.next()? {
                        Some(e) => {
                            if let Some(r) = self.put(e)? {
                                return Ok(r);
                            }
                        }
                        None => return self.finish(),
                    },
                    _ => {
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                    }
                },
                State::SingleQuote => match b {
                    b'\'' => state = State::Word,
                    _ => {
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                    }
                },
                State::DoubleQuote => match b {
                    b'"' => state = State::Word,
                    b'\\' => {
                        // Only \\ and \" drop the backslash; anything else
                        // keeps it and the next byte is handled normally.
                        let escaped = match self.peek()? {
                            Some(n @ (b'\\' | b'"')) => {
                                self.next()?;
                                n
                            }
                            _ => b'\\',
                        };
                        if let Some(r) = self.put(escaped)? {
                            return Ok(r);
                        }
                    }
                    _ => {
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                    }
                },
            }
        }
    }

    fn parse_windows(mut self) -> io::Result<LineParse> {
        let mut state = State::Gap;
        loop {
            let Some(b) = self.next()? else {
                return match state {
                    State::DoubleQuote => Ok(LineParse::LineTooLong),
                    _ => self.end_of_input(),
                };
            };
            // CR survives only inside a quoted string.
            if b == b'\r' && state != State::DoubleQuote {
                continue;
            }
            match state {
                State::Gap => match b {
                    b' ' | b'\t' => {}
                    b'\n' => return self.finish(),
                    b'#' => return self.comment(),
                    b'"' => {
                        if let Some(r) = self.open_token()? {
                            return Ok(r);
                        }
                        state = State::DoubleQuote;
                    }
                    _ => {
                        if let Some(r) = self.open_token()? {
                            return Ok(r);
                        }
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                        state = State::Word;
                    }
                },
                State::Word => match b {
                    b' ' | b'\t' => {
                        self.close_token();
                        state = State::Gap;
                    }
                    b'\n' => return self.finish(),
                    b'#' => return self.comment(),
                    b'"' => state = State::DoubleQuote,
                    _ => {
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                    }
                },
                State::DoubleQuote => match b {
                    b'"' => {
                        if self.peek()? == Some(b'"') {
                            self.next()?;
                            if let Some(r) = self.put(b'"')? {
                                return Ok(r);
                            }
                        } else {
                            state = State::Word;
                        }
                    }
                    _ => {
                        if let Some(r) = self.put(b)? {
                            return Ok(r);
                        }
                    }
                },
                State::SingleQuote => unreachable!("no single quotes in windows style"),
            }
        }
    }

    fn next(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.peeked.take() {
            return Ok(Some(b));
        }
        self.input.next_byte()
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.peeked.is_none() {
            self.peeked = self.input.next_byte()?;
        }
        Ok(self.peeked)
    }

    /// Begin a new token, enforcing the argument-count limit.
    fn open_token(&mut self) -> io::Result<Option<LineParse>> {
        if self.args.len() >= self.max_params {
            self.discard_line()?;
            return Ok(Some(LineParse::TooManyArgs));
        }
        self.token_open = true;
        Ok(None)
    }

    /// Store one byte of the current token, enforcing the byte limit.
    fn put(&mut self, b: u8) -> io::Result<Option<LineParse>> {
        if self.written >= self.max_line {
            self.discard_line()?;
            return Ok(Some(LineParse::LineTooLong));
        }
        self.current.push(b);
        self.written += 1;
        Ok(None)
    }

    fn close_token(&mut self) {
        if self.token_open {
            self.args
                .push(String::from_utf8_lossy(&self.current).into_owned());
            self.current.clear();
            self.token_open = false;
        }
    }

    fn finish(&mut self) -> io::Result<LineParse> {
        self.close_token();
        Ok(LineParse::Args(mem::take(&mut self.args)))
    }

    /// `#` kills the rest of the physical line; the command ends here.
    fn comment(&mut self) -> io::Result<LineParse> {
        self.close_token();
        self.discard_line()?;
        Ok(LineParse::Args(mem::take(&mut self.args)))
    }

    fn end_of_input(&mut self) -> io::Result<LineParse> {
        if self.args.is_empty() && !self.token_open {
            return Ok(LineParse::Eof);
        }
        self.finish()
    }

    fn discard_line(&mut self) -> io::Result<()> {
        while let Some(b) = self.next()? {
            if b == b'\n' {
                break;
            }
        }
        Ok(())
    }
}
