//! Run progress reporting

use eyre::Report;
use std::fmt;

/// Progress and outcome events emitted during a population run
#[derive(Debug)]
pub enum RunEvent<'a> {
    RunStarted,
    CollectionCleared { collection: &'a str, count: usize },
    CollectionSucceeded { collection: &'a str, count: usize },
    CollectionFailed { collection: &'a str, error: &'a Report },
    RunFinished,
}

impl RunEvent<'_> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::CollectionFailed { .. })
    }
}

impl fmt::Display for RunEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted => write!(f, "Starting population run"),
            Self::CollectionCleared { collection, count } => {
                write!(f, "Cleared {} documents from '{}'", count, collection)
            }
            Self::CollectionSucceeded { collection, count } => {
                write!(
                    f,
                    "Successfully populated {} documents in '{}'",
                    count, collection
                )
            }
            Self::CollectionFailed { collection, error } => {
                write!(f, "Error populating '{}': {:#}", collection, error)
            }
            Self::RunFinished => write!(f, "Population run finished"),
        }
    }
}

/// Observer for [`RunEvent`]s
///
/// Reporters never influence control flow.
pub trait Reporter {
    fn report(&self, event: &RunEvent<'_>);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: &RunEvent<'_>) {
        (**self).report(event)
    }
}

/// Prints events to the console
///
/// Failures go to stderr, everything else to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: &RunEvent<'_>) {
        if event.is_failure() {
            eprintln!("{}", event);
        } else {
            println!("{}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;

    #[test]
    fn test_messages() {
        assert_eq!(RunEvent::RunStarted.to_string(), "Starting population run");
        assert_eq!(RunEvent::RunFinished.to_string(), "Population run finished");
        assert_eq!(
            RunEvent::CollectionSucceeded {
                collection: "banners",
                count: 1
            }
            .to_string(),
            "Successfully populated 1 documents in 'banners'"
        );
        assert_eq!(
            RunEvent::CollectionCleared {
                collection: "banners",
                count: 3
            }
            .to_string(),
            "Cleared 3 documents from 'banners'"
        );
    }

    #[test]
    fn test_failure_message_includes_cause_chain() {
        let error = eyre!("PERMISSION_DENIED").wrap_err("write unit 1/1 (5 records) was not committed");
        let event = RunEvent::CollectionFailed {
            collection: "categories",
            error: &error,
        };
        assert!(event.is_failure());
        assert_eq!(
            event.to_string(),
            "Error populating 'categories': write unit 1/1 (5 records) was not committed: PERMISSION_DENIED"
        );
    }
}
