use crate::aws;
use crate::config::Config;
use crate::error::Error;
use crate::writer::Writer;
use aws_config::SdkConfig;
use std::error::Error as StdError;

pub(crate) trait Runner {
    /// Settings assembled from delambda.toml, env and flags
    fn config(&self) -> &Config;

    /// AWS SDK config built from the tool's settings
    async fn sdk_config(&self) -> SdkConfig {
        aws::sdk_config(self.config()).await
    }

    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    async fn run(&mut self) -> Result<(), Error>;

    /// Construct an error shown to the user
    fn error(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        origin: Option<Box<dyn StdError>>,
    ) -> Error {
        if let Some(origin) = origin {
            log::error!("{origin:?}");
        }

        if let Some(title) = title {
            Error::new(title, description)
        } else {
            Error::new(
                "Failed to run the command",
                Some("Run again with RUST_LOG=error to see the details."),
            )
        }
    }
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner<'a>(&self, writer: &'a Writer, config: &'a Config) -> impl Runner + 'a;
}
