//! Byte-oriented input sources for the batch driver.
//!
//! The tokenizer pulls single bytes through [`CommandInput`], so the same
//! splitter serves script files, pipes, and the interactive editor. The
//! editor source buffers one edited line at a time and hands it out byte by
//! byte, appending the newline the tokenizer expects.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Source of command-line bytes for the driver and tokenizer.
pub trait CommandInput {
    /// Called once before each command is read. `prompt` is the text the
    /// user should see, empty when prompting is disabled.
    fn begin_command(&mut self, _prompt: &str) {}

    /// Whether this source renders the prompt itself. When `false`, the
    /// driver writes the prompt to its output stream.
    fn prompts(&self) -> bool {
        false
    }

    /// Next byte of the stream, or `None` at end of input.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Plain stream input: a script file, a pipe, or locked standard input.
pub struct ReaderInput<R> {
    reader: R,
}

impl<R: BufRead> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> CommandInput for ReaderInput<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        Ok(Some(b))
    }
}

/// Interactive input backed by a line editor with history.
///
/// Both end-of-file and an interrupt from the user end the session; a quoted
/// string left open at the end of a line makes the next line part of the same
/// command, read with an empty continuation prompt.
pub struct EditorInput {
    editor: DefaultEditor,
    pending: VecDeque<u8>,
    prompt: String,
    done: bool,
}

impl EditorInput {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            pending: VecDeque::new(),
            prompt: String::new(),
            done: false,
        })
    }
}

impl CommandInput for EditorInput {
    fn begin_command(&mut self, prompt: &str) {
        prompt.clone_into(&mut self.prompt);
    }

    fn prompts(&self) -> bool {
        true
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some(b) = self.pending.pop_front() {
                return Ok(Some(b));
            }
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    self.pending.extend(line.into_bytes());
                    self.pending.push_back(b'\n');
                    // Continuation lines of the same command get no prompt.
                    self.prompt.clear();
                }
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                    self.done = true;
                }
                Err(e) => return Err(io::Error::other(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_input_yields_bytes_then_none() {
        let mut input = ReaderInput::new(Cursor::new("ab"));
        assert_eq!(input.next_byte().unwrap(), Some(b'a'));
        assert_eq!(input.next_byte().unwrap(), Some(b'b'));
        assert_eq!(input.next_byte().unwrap(), None);
        assert_eq!(input.next_byte().unwrap(), None);
    }

    #[test]
    fn reader_input_does_not_prompt_itself() {
        let input = ReaderInput::new(Cursor::new(""));
        assert!(!input.prompts());
    }
}
