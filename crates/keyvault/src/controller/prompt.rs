//! Password prompt collaborator

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::secure::SecretString;

/// What the prompt is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Short description of the operation that needs the password
    pub reason: String,
    /// 1 for the first request, incremented after each wrong password
    pub attempt: u32,
}

impl PromptContext {
    /// First attempt for `reason`
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
            attempt: 1,
        }
    }

    /// Same reason, next attempt
    pub fn retry(&self) -> Self {
        Self {
            reason: self.reason.clone(),
            attempt: self.attempt + 1,
        }
    }
}

/// Password flow state, published to controller subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    /// Waiting for the user to enter a password
    AwaitingPassword { attempt: u32 },
    /// Deriving and checking the entered password
    Validating,
    /// Password accepted, derived key cached
    Accepted,
    /// Wrong password; the prompt will be shown again
    Rejected { attempt: u32 },
    /// The user dismissed the prompt
    Cancelled,
}

/// Asks the user for a password
///
/// Implementations are UI front ends (terminal, dialog). The controller
/// guarantees at most one outstanding `request_password` call.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// Ask for a password; `None` means the user cancelled
    async fn request_password(&self, context: &PromptContext) -> Option<SecretString>;

    /// Dismiss the prompt after the password was accepted
    async fn hide(&self) {}

    /// Tell the user the last password was wrong
    async fn notify_wrong_password(&self, _context: &PromptContext) {}
}

/// Prompt that answers from a fixed list
///
/// Each request pops the next answer; an exhausted list cancels. Used for
/// non-interactive runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    requests: AtomicUsize,
    hides: AtomicUsize,
    wrong_notices: AtomicUsize,
}

impl ScriptedPrompt {
    /// Answer with each entry in turn; `None` entries cancel
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| a.map(Into::into)).collect()),
            ..Self::default()
        }
    }

    /// Answer once with `password`, then cancel
    pub fn once(password: &str) -> Self {
        Self::new([Some(password)])
    }

    /// Number of `request_password` calls so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of `hide` calls so far
    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    /// Number of wrong password notices so far
    pub fn wrong_notices(&self) -> usize {
        self.wrong_notices.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordPrompt for ScriptedPrompt {
    async fn request_password(&self, _context: &PromptContext) -> Option<SecretString> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().pop_front().flatten().map(Into::into)
    }

    async fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }

    async fn notify_wrong_password(&self, _context: &PromptContext) {
        self.wrong_notices.fetch_add(1, Ordering::SeqCst);
    }
}
