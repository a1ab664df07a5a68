use crate::context::Cancellation;
use crate::stack::StackName;
use std::fmt;

/// Failure of listing the functions of a stack
///
/// Collaborator failures keep the original report, reachable through
/// [`std::error::Error::source`] or [`Error::cause`].
#[derive(Debug)]
pub enum Error {
    /// The stack inspector could not produce the list of function names
    Enumerate {
        stack: StackName,
        source: eyre::Report,
    },

    /// The function repository could not resolve one of the names
    Resolve { name: String, source: eyre::Report },

    Cancelled,
    DeadlineExceeded,
}

impl Error {
    /// The collaborator report behind the failure, if any
    pub fn cause(&self) -> Option<&eyre::Report> {
        match self {
            Error::Enumerate { source, .. } | Error::Resolve { source, .. } => Some(source),
            Error::Cancelled | Error::DeadlineExceeded => None,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Enumerate { stack, .. } => write!(f, "failed to list functions in stack {stack}"),
            Error::Resolve { name, .. } => write!(f, "failed to get function {name}"),
            Error::Cancelled => write!(f, "{}", Cancellation::Cancelled),
            Error::DeadlineExceeded => write!(f, "{}", Cancellation::DeadlineExceeded),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let report = self.cause()?;
        Some(&**report)
    }
}

impl From<Cancellation> for Error {
    fn from(reason: Cancellation) -> Self {
        match reason {
            Cancellation::Cancelled => Error::Cancelled,
            Cancellation::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}
