//! CommandExecutor - runs one operation and turns its outcome into a printable
//!
//! The executor is the single place where failures are translated into
//! user-facing text: a per-command classifier gets the first look, then the
//! generic table in [`crate::util::generic_message`].

use serde::Serialize;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::output::{ContentKind, Destination, Printable};
use crate::util::generic_message;

/// A deferred unit of work, invoked at most once
pub trait Operation {
    type Output;

    fn invoke(self) -> Result<Self::Output, ApiError>;
}

impl<F, T> Operation for F
where
    F: FnOnce() -> Result<T, ApiError>,
{
    type Output = T;

    fn invoke(self) -> Result<T, ApiError> {
        self()
    }
}

/// Per-command mapping from an error to a message
///
/// Returning `None` defers to the generic table.
pub type Classifier = dyn Fn(&ApiError) -> Option<Printable>;

/// Runs operations and classifies their failures
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    debug: bool,
}

impl CommandExecutor {
    /// Create an executor; in debug mode failures are reported in full and
    /// normal output is suppressed
    pub fn new(debug: bool) -> Self {
        let debug_mode = debug;
        debug!(debug_mode, "CommandExecutor::new: called");
        Self { debug: debug_mode }
    }

    /// Invoke `operation` once and wrap its result
    ///
    /// Success goes to stdout as `kind`. Failure goes to stderr as plain
    /// text, taken from `classifier` when it has an answer.
    pub fn run<O>(&self, operation: O, kind: ContentKind, classifier: Option<&Classifier>) -> Printable
    where
        O: Operation,
        O::Output: Serialize,
    {
        debug!(?kind, classified = classifier.is_some(), "run: called");
        let result = operation
            .invoke()
            .and_then(|output| serde_json::to_value(output).map_err(ApiError::from));

        match result {
            Ok(value) => {
                debug!("run: operation succeeded");
                Printable::stdout(value, kind)
            }
            Err(err) => self.on_failure(err, classifier),
        }
    }

    /// Invoke an operation that builds its own printable
    ///
    /// Used where the content kind depends on the result, such as a
    /// validation report that is either a message or a list of findings.
    pub fn run_printable<O>(&self, operation: O, classifier: Option<&Classifier>) -> Printable
    where
        O: Operation<Output = Printable>,
    {
        debug!(classified = classifier.is_some(), "run_printable: called");
        match operation.invoke() {
            Ok(printable) => {
                debug!("run_printable: operation succeeded");
                printable
            }
            Err(err) => self.on_failure(err, classifier),
        }
    }

    fn on_failure(&self, err: ApiError, classifier: Option<&Classifier>) -> Printable {
        debug!(%err, "on_failure: operation failed");

        if self.debug {
            let report = eyre::Report::new(err);
            error!("operation failed: {:?}", report);
            eprintln!("{:?}", report);
            return Printable::empty();
        }

        if let Some(printable) = classifier.and_then(|classify| classify(&err)) {
            debug!("on_failure: classifier handled error");
            return Printable {
                kind: ContentKind::Plaintext,
                destination: Destination::Stderr,
                ..printable
            };
        }

        debug!("on_failure: using generic message");
        Printable::error(generic_message(&err))
    }
}
