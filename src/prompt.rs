use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

/// Yes/no question asked before a destructive action.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Blocking notice shown to the user when a sync fails.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Reads `y`/`yes` from stdin; anything else declines.
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Answers every question the same way (`--yes`, or a front-end that already
/// asked through its own modal).
pub struct FixedConfirm(pub bool);

impl ConfirmPrompt for FixedConfirm {
    fn confirm(&self, _question: &str) -> bool {
        self.0
    }
}

pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Keeps notices so a front-end can render them later. Clones share the queue.
#[derive(Clone, Default)]
pub struct NoticeBoard {
    notices: Arc<Mutex<Vec<String>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything posted so far.
    pub fn drain(&self) -> Vec<String> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, message: &str) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
