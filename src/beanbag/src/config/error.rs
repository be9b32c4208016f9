use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::registry::BeanError;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[snafu(display(
        "configuration {configuration} is missing resources [{}]",
        resources.join(", ")
    ))]
    #[non_exhaustive]
    MissingResources {
        configuration: &'static str,
        resources: Vec<String>,
    },
    #[snafu(display(
        "could not initialize configurations with unsatisfied resources: {}",
        PendingDisplayer::new(pending)
    ))]
    #[non_exhaustive]
    Initialization { pending: Vec<PendingConfiguration> },
    #[snafu(display("configurations depend on each other: {}", trace.join(" -> ")))]
    #[non_exhaustive]
    Cycle { trace: Vec<String> },
    #[snafu(display("could not construct configuration {configuration}"))]
    #[non_exhaustive]
    Construction {
        configuration: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(transparent)]
    Bean { source: BeanError },
}

impl ConfigurationError {
    /// Wraps an error raised by a configuration's own constructor.
    pub fn construction<E>(configuration: &'static str, err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Construction {
            configuration,
            source: err.into(),
        }
    }
}

/// A configuration left waiting when assembly could make no more progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfiguration {
    pub name: &'static str,
    pub resources: Vec<String>,
}

impl Display for PendingConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} [{}]", self.name, self.resources.join(", "))
    }
}

struct PendingDisplayer<'a> {
    pending: &'a [PendingConfiguration],
}

impl<'a> PendingDisplayer<'a> {
    fn new(pending: &'a [PendingConfiguration]) -> Self {
        Self { pending }
    }
}

impl Display for PendingDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, pending) in self.pending.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{pending}")?;
        }
        Ok(())
    }
}
