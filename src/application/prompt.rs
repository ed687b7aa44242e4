use std::sync::Arc;

/// Confirmation dialog provided by the user surface.
pub trait Confirm: Send + Sync {
    /// Ask the user; `true` means proceed.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Answers every prompt the same way. Used for non-interactive runs.
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, title: &str, _message: &str) -> bool {
        tracing::debug!("Auto-answering '{}' with {}", title, self.0);
        self.0
    }
}

pub type SharedConfirm = Arc<dyn Confirm>;
