//! Transient user-facing notices.
//!
//! The host owns the real notification surface (usually toasts).
//! [`Notifier`] is the seam; [`LogNotifier`] routes notices to the log
//! for embeddings without a surface, and [`MockNotifier`] captures them
//! for assertion in tests.

/// Trait for transient, non-blocking user notices.
pub trait Notifier {
    /// Informational notice.
    fn notice(&mut self, msg: &str);

    /// Warning about an aborted operation (bad input, no scope).
    fn warning(&mut self, msg: &str);
}

/// Routes notices to the tracing log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notice(&mut self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn warning(&mut self, msg: &str) {
        tracing::warn!("{msg}");
    }
}

/// Captures notices for later assertion.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notices: Vec<String>,
    warnings: Vec<String>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured informational notices.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// All captured warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Notifier for MockNotifier {
    fn notice(&mut self, msg: &str) {
        self.notices.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_captures_in_order() {
        let mut notifier = MockNotifier::new();
        notifier.notice("created");
        notifier.warning("no scope");
        notifier.warning("blank name");

        assert_eq!(notifier.notices(), ["created"]);
        assert_eq!(notifier.warnings(), ["no scope", "blank name"]);
    }
}
