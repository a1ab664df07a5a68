/// Display global error message in unified format
#[derive(Clone, Debug)]
pub struct Error(String, Option<String>);

impl Error {
    pub fn new(message: &str, details: Option<&str>) -> Self {
        Error(message.to_string(), details.map(|d| d.to_string()))
    }

    pub fn title(&self) -> &str {
        &self.0
    }

    pub fn details(&self) -> Option<&str> {
        self.1.as_deref()
    }

    /// Structured form of the error, for the JSON output mode
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0,
            "details": self.1,
        })
    }
}

/// Display the message and details, as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\n\n{}",
            self.0,
            console::style(self.1.clone().unwrap_or("".into())).dim()
        )
    }
}

/// Implement std::error::Error trait for Error
impl std::error::Error for Error {}

/// Convert eyre reports, keeping the Error if it was wrapped into the report
impl From<eyre::ErrReport> for Error {
    fn from(error: eyre::ErrReport) -> Self {
        log::error!("{error:?}");

        error
            .downcast::<Error>()
            .unwrap_or_else(|err| Error::new(&err.to_string(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_keeps_wrapped_error() {
        let report = eyre::Report::new(Error::new("Timed out", Some("Try again.")));
        let error = Error::from(report);
        assert_eq!(error.title(), "Timed out");
        assert_eq!(error.details(), Some("Try again."));
    }

    #[test]
    fn plain_report_becomes_title() {
        let error = Error::from(eyre::eyre!("Failed to write output"));
        assert_eq!(error.title(), "Failed to write output");
        assert_eq!(error.details(), None);
        assert_eq!(error.to_json()["error"], "Failed to write output");
    }
}
