use super::report;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::types::FunctionConfiguration;
use chrono::{DateTime, Utc};
use delambda_common::{Context, Function, FunctionRepository};
use eyre::{ContextCompat, WrapErr};

/*
Permissions:
{
    "Action": [
        "lambda:GetFunction",
    ],
    "Resource": "*",
    "Effect": "Allow"
}
*/
pub(crate) struct LambdaFunctionRepository {
    client: aws_sdk_lambda::Client,
}

impl LambdaFunctionRepository {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        LambdaFunctionRepository {
            client: aws_sdk_lambda::Client::new(config),
        }
    }
}

#[async_trait]
impl FunctionRepository for LambdaFunctionRepository {
    async fn find_by_name(&self, ctx: &Context, name: &str) -> eyre::Result<Function> {
        let response = ctx
            .run(self.client.get_function().function_name(name).send())
            .await?;

        let output = match response {
            Ok(output) => output,

            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                return Err(report(err)).wrap_err(format!("Function {name} not found"));
            }

            Err(err) => return Err(report(err)),
        };

        let configuration = output
            .configuration()
            .wrap_err(format!("No configuration returned for function {name}"))?;

        Ok(function(configuration, name))
    }
}

/// Convert Lambda's view of a function into the domain record
///
/// The requested name is used if the configuration lacks one.
fn function(configuration: &FunctionConfiguration, name: &str) -> Function {
    Function {
        name: configuration.function_name().unwrap_or(name).to_string(),
        arn: configuration.function_arn().map(String::from),
        runtime: configuration.runtime().map(|r| r.as_str().to_string()),
        handler: configuration.handler().map(String::from),
        description: configuration
            .description()
            .filter(|d| !d.is_empty())
            .map(String::from),
        role: configuration.role().map(String::from),
        memory_size: configuration.memory_size(),
        timeout: configuration.timeout(),
        code_size: configuration.code_size(),
        last_modified: configuration.last_modified().and_then(last_modified),
        state: configuration.state().map(|s| s.as_str().to_string()),
        architectures: configuration
            .architectures()
            .iter()
            .map(|a| a.as_str().to_string())
            .collect(),
    }
}

/// Lambda reports the update time in ISO-8601 with a numeric offset, e.g. 2024-05-01T10:15:30.123+0000
fn last_modified(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .inspect_err(|e| log::warn!("Unexpected last modified time {value:?}: {e:?}"))
        .ok()
        .map(|time| time.with_timezone(&Utc))
}
