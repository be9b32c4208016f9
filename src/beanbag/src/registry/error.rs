use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

pub(crate) const EMPTY_NAME: &str = "bean name cannot be empty";
pub(crate) const DUPLICATED_NAME: &str = "bean name is already registered";
pub(crate) const UNREGISTERED_NAME: &str = "bean is not registered";

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum BeanError {
    #[snafu(display("invalid bean name \"{name}\": {reason}"))]
    #[non_exhaustive]
    InvalidBeanName { name: String, reason: &'static str },
    #[snafu(display("bean \"{name}\" is requested as `{wanted}` but registered as `{actual}`"))]
    #[non_exhaustive]
    InvalidBeanType {
        name: String,
        wanted: &'static str,
        actual: &'static str,
    },
    #[snafu(display("could not resolve beans depending on each other: {}", trace.join(" -> ")))]
    #[non_exhaustive]
    BeanDependencyCycle { trace: Vec<String> },
    #[snafu(display("could not construct the bean \"{name}\""))]
    #[non_exhaustive]
    BeanConstruction {
        name: String,
        source: Arc<dyn Error + Send + Sync>,
    },
}

impl BeanError {
    /// Wraps an error raised by a bean's own constructor.
    pub fn construction<E>(name: impl Into<String>, err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::BeanConstruction {
            name: name.into(),
            source: Arc::from(err.into()),
        }
    }

    pub(crate) fn invalid_name(name: &str, reason: &'static str) -> Self {
        Self::InvalidBeanName {
            name: name.to_owned(),
            reason,
        }
    }

    /// Returns the in-flight bean names if this is a dependency cycle.
    pub fn cycle_trace(&self) -> Option<&[String]> {
        match self {
            Self::BeanDependencyCycle { trace } => Some(trace.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bean_error_display_succeeds() {
        let err = BeanError::invalid_name("", EMPTY_NAME);
        assert_eq!(
            err.to_string(),
            "invalid bean name \"\": bean name cannot be empty"
        );

        let err = BeanError::BeanDependencyCycle {
            trace: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "could not resolve beans depending on each other: a -> b -> a"
        );
        assert_eq!(err.cycle_trace().map(<[String]>::len), Some(3));
    }

    #[test]
    fn bean_error_construction_keeps_source() {
        let err = BeanError::construction("db", "connection refused");
        assert_eq!(err.to_string(), "could not construct the bean \"db\"");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("connection refused")
        );
    }
}
