use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deployed Lambda function
///
/// Everything except the name is optional, the function repository fills in what it knows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Execution role ARN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Memory in MB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i32>,

    /// Timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,

    /// Size of the deployment package in bytes
    pub code_size: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    /// Lifecycle state, e.g. "Active" or "Pending"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<String>,
}

impl Function {
    /// A record with nothing but the name
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            ..Default::default()
        }
    }
}
