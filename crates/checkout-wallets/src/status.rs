//! UI state produced by the checkout operations.
//!
//! The page has a single status element. Instead of every adapter writing to it
//! directly, operations return a [`StatusView`] and the [`StatusReporter`] keeps
//! the last one that was shown.

use std::fmt::{Display, Formatter};
use std::sync::RwLock;

/// Style class of the status element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Error,
}

impl StatusClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::Error => "error",
        }
    }
}

/// Text and style of the status element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub message: String,
    pub class: StatusClass,
}

impl StatusView {
    pub const PAYMENT_SUCCESSFUL: &'static str = "Payment successful!";
    pub const PAYMENT_FAILED: &'static str = "Payment failed. Please try again.";

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            class: StatusClass::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            class: StatusClass::Error,
        }
    }

    pub fn payment_successful() -> Self {
        Self::success(Self::PAYMENT_SUCCESSFUL)
    }

    pub fn payment_failed() -> Self {
        Self::error(Self::PAYMENT_FAILED)
    }

    pub fn is_error(&self) -> bool {
        self.class == StatusClass::Error
    }

    /// Full `class` attribute of the status element, e.g. `payment-status error`.
    pub fn css_class(&self) -> String {
        format!("payment-status {}", self.class.as_str())
    }
}

impl Display for StatusView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.class.as_str(), self.message)
    }
}

/// The on-page status element. Remembers only the last message.
#[derive(Debug, Default)]
pub struct StatusReporter {
    last: RwLock<Option<StatusView>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, view: StatusView) {
        tracing::debug!(status = %view, "Status updated");
        let mut guard = self.last.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(view);
    }

    /// What the element currently displays, `None` until something was shown.
    pub fn current(&self) -> Option<StatusView> {
        self.last.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Whether a wallet button is on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Hidden,
    Rendered,
}

impl ButtonState {
    pub fn is_rendered(&self) -> bool {
        matches!(self, ButtonState::Rendered)
    }
}

/// What a click on a wallet button led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Button hidden, or an attempt is already in flight.
    Ignored,
    /// The attempt ran to the end and left this on the status element.
    Finished(StatusView),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_keeps_last_message_only() {
        let reporter = StatusReporter::new();
        assert_eq!(reporter.current(), None);
        reporter.show(StatusView::payment_failed());
        reporter.show(StatusView::payment_successful());
        let current = reporter.current().unwrap();
        assert_eq!(current.message, "Payment successful!");
        assert_eq!(current.css_class(), "payment-status success");
    }

    #[test]
    fn error_view_has_error_class() {
        let view = StatusView::payment_failed();
        assert!(view.is_error());
        assert_eq!(view.css_class(), "payment-status error");
    }
}
