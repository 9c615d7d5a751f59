//! Entity and relationship extraction from free text
//!
//! The extraction itself is an external service. This module owns its
//! contract: request validation, response filtering, error shaping, a
//! background task handle, and the rules for merging a result into a graph.

mod error;
mod import;
mod payload;
mod task;

pub use error::*;
pub use import::*;
pub use payload::*;
pub use task::*;

/// Transport seam for the classification service
pub trait TextClassifier: Send + Sync {
    /// Classify already-validated text
    fn classify(&self, request: &ClassifyRequest) -> Result<Classification, ClassifierError>;
}

/// Classifier that answers every request with a fixed raw response
///
/// Useful for replaying a captured service response, and in tests.
#[derive(Debug, Clone)]
pub struct ReplayClassifier {
    status: u16,
    body: String,
}

impl ReplayClassifier {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl TextClassifier for ReplayClassifier {
    fn classify(&self, _request: &ClassifyRequest) -> Result<Classification, ClassifierError> {
        process_response(self.status, &self.body)
    }
}

/// Validate `text` and classify it synchronously
pub fn analyze_text<C: TextClassifier + ?Sized>(
    classifier: &C,
    text: &str,
) -> Result<Classification, ClassifierError> {
    let request = ClassifyRequest::new(text)?;
    classifier.classify(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl TextClassifier for Counting {
        fn classify(&self, _request: &ClassifyRequest) -> Result<Classification, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Classification::default())
        }
    }

    #[test]
    fn test_blank_text_skips_call() {
        let classifier = Counting::default();
        assert_eq!(
            analyze_text(&classifier, "\t "),
            Err(ClassifierError::MissingText)
        );
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);

        analyze_text(&classifier, "text").unwrap();
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replay_classifier() {
        let classifier = ReplayClassifier::new(200, r#"{"entities":["A", 1]}"#);
        let classification = analyze_text(&classifier, "anything").unwrap();
        assert_eq!(classification.entities, vec!["A".to_string()]);
    }
}
