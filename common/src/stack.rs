use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a deployed CloudFormation stack
///
/// Not validated, passed on to the stack inspector as is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackName(String);

impl StackName {
    pub fn new(name: impl Into<String>) -> Self {
        StackName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StackName {
    fn from(name: &str) -> Self {
        StackName::new(name)
    }
}

impl From<String> for StackName {
    fn from(name: String) -> Self {
        StackName(name)
    }
}

impl AsRef<str> for StackName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
