pub(crate) mod cloudformation;
pub(crate) mod lambda;

use crate::config::Config;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_lambda::error::DisplayErrorContext;

pub(crate) use cloudformation::CloudFormationStackInspector;
pub(crate) use lambda::LambdaFunctionRepository;

/// Shared AWS SDK config for all service clients
pub(crate) async fn sdk_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.to_owned()));
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

/// Turn an SDK error into a report
///
/// The SDK error's own message is only "service error", so the full context goes on top
/// while the error itself stays in the chain.
pub(crate) fn report<E>(err: E) -> eyre::Report
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    eyre::Report::new(err).wrap_err(message)
}
