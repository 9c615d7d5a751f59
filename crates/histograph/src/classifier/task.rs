//! Background classification
//!
//! A [`ClassifierTask`] runs one call on its own thread. The caller polls it
//! with [`ClassifierTask::try_take`] from its event loop and applies the
//! result as a single batch.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use super::error::ClassifierError;
use super::payload::{Classification, ClassifyRequest};
use super::TextClassifier;

type Outcome = Result<Classification, ClassifierError>;

/// Handle to a classification running on a worker thread
#[derive(Debug)]
pub struct ClassifierTask {
    receiver: Receiver<Outcome>,
    handle: Option<JoinHandle<()>>,
    done: bool,
}

impl ClassifierTask {
    /// Validate the text and start the call
    ///
    /// Blank text is rejected here, before any thread is spawned.
    pub fn spawn<C>(classifier: Arc<C>, text: impl Into<String>) -> Result<Self, ClassifierError>
    where
        C: TextClassifier + ?Sized + 'static,
    {
        let request = ClassifyRequest::new(text)?;
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("histograph-classifier".to_string())
            .spawn(move || {
                let outcome = classifier.classify(&request);
                // The receiver may be gone if the task was dropped
                let _ = sender.send(outcome);
            })
            .map_err(|err| ClassifierError::transport(format!("failed to spawn worker: {}", err)))?;

        debug!("Classifier task started");
        Ok(Self {
            receiver,
            handle: Some(handle),
            done: false,
        })
    }

    /// Take the result if it is ready, without blocking
    ///
    /// Returns `Some` exactly once. A worker that exits without a result
    /// (for instance because the classifier panicked) yields a transport
    /// error.
    pub fn try_take(&mut self) -> Option<Outcome> {
        if self.done {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.finish(Err(ClassifierError::transport(
                "classifier worker exited without a result",
            )))),
        }
    }

    /// Block until the result arrives
    pub fn wait(mut self) -> Outcome {
        if self.done {
            return Err(ClassifierError::transport("result already taken"));
        }
        let outcome = self.receiver.recv().unwrap_or_else(|_| {
            Err(ClassifierError::transport(
                "classifier worker exited without a result",
            ))
        });
        self.finish(outcome)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.done = true;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Classifier worker panicked");
            }
        }
        debug!(ok = outcome.is_ok(), "Classifier task finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Relationship;
    use std::time::{Duration, Instant};

    struct Echo;

    impl TextClassifier for Echo {
        fn classify(&self, request: &ClassifyRequest) -> Result<Classification, ClassifierError> {
            Ok(Classification {
                entities: vec![request.text().to_string()],
                relationships: vec![Relationship::new("a", "b", "causes")],
            })
        }
    }

    struct Panics;

    impl TextClassifier for Panics {
        fn classify(&self, _request: &ClassifyRequest) -> Result<Classification, ClassifierError> {
            panic!("boom");
        }
    }

    fn poll_until_done(task: &mut ClassifierTask) -> Outcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = task.try_take() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "classifier task timed out");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_blank_text_never_spawns() {
        let err = ClassifierTask::spawn(Arc::new(Echo), "  ").unwrap_err();
        assert_eq!(err, ClassifierError::MissingText);
    }

    #[test]
    fn test_result_taken_once() {
        let mut task = ClassifierTask::spawn(Arc::new(Echo), "Rome").unwrap();
        let classification = poll_until_done(&mut task).unwrap();
        assert_eq!(classification.entities, vec!["Rome".to_string()]);
        assert!(task.is_done());
        assert!(task.try_take().is_none());
    }

    #[test]
    fn test_wait() {
        let task = ClassifierTask::spawn(Arc::new(Echo), "Carthage").unwrap();
        assert_eq!(task.wait().unwrap().relationships.len(), 1);
    }

    #[test]
    fn test_panicking_classifier_becomes_error() {
        let mut task = ClassifierTask::spawn(Arc::new(Panics), "Rome").unwrap();
        let err = poll_until_done(&mut task).unwrap_err();
        assert!(matches!(err, ClassifierError::Transport { .. }));
    }
}
