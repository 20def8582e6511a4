//! User confirmation capability injected into the lifecycle manager.
//!
//! Completing tasks by hand is gated on a yes/no answer. The manager only
//! sees the [`Confirm`] trait, so the prompt can come from a terminal, a
//! test double, or a flag that answers for the user.

use std::io::{BufRead, Write};

use parking_lot::Mutex;

/// Asks the user to approve an action.
pub trait Confirm: Send + Sync {
    /// Returns `true` if the user approves `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<T: Confirm + ?Sized> Confirm for Box<T> {
    fn confirm(&self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }
}

/// Approves everything. Used for `--yes` and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl Confirm for AutoDecline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Line-oriented prompt: writes the question, reads one answer line.
///
/// `y` or `yes` (any case) approves; anything else, including end of
/// input or an I/O error, declines.
pub struct PromptConfirm<R, W> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead + Send, W: Write + Send> PromptConfirm<R, W> {
    /// Creates a prompt reading answers from `reader` and writing
    /// questions to `writer`.
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }
}

impl PromptConfirm<std::io::BufReader<std::io::Stdin>, std::io::Stderr> {
    /// Prompt on stderr, answer on stdin.
    #[must_use]
    pub fn terminal() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()), std::io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> Confirm for PromptConfirm<R, W> {
    fn confirm(&self, prompt: &str) -> bool {
        let mut io = self.io.lock();
        let (reader, writer) = &mut *io;
        if write!(writer, "{prompt} [y/N] ")
            .and_then(|()| writer.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match reader.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}
