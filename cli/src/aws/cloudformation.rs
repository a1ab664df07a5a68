use super::report;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::types::StackResourceSummary;
use delambda_common::{Context, StackInspector, StackName};

const LAMBDA_FUNCTION_RESOURCE: &str = "AWS::Lambda::Function";

/*
Permissions:
{
    "Action": [
        "cloudformation:ListStackResources",
    ],
    "Resource": "*",
    "Effect": "Allow"
}
*/
/// Finds Lambda functions among the resources of a CloudFormation stack
pub(crate) struct CloudFormationStackInspector {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStackInspector {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        CloudFormationStackInspector {
            client: aws_sdk_cloudformation::Client::new(config),
        }
    }
}

#[async_trait]
impl StackInspector for CloudFormationStackInspector {
    async fn list_functions(&self, ctx: &Context, stack: &StackName) -> eyre::Result<Vec<String>> {
        let mut next_token = None;
        let mut names = Vec::new();

        loop {
            let mut req = self.client.list_stack_resources().stack_name(stack.as_str());

            if let Some(token) = next_token {
                req = req.next_token(token);
            }

            let response = ctx
                .run(req.send())
                .await?
                .map_err(report)?;

            names.extend(function_names(response.stack_resource_summaries()));
            next_token = response.next_token().map(|s| s.to_string());

            if next_token.is_none() {
                break;
            }
        }

        log::debug!("Stack {stack} has functions {names:?}");
        Ok(names)
    }
}

/// Physical ids (i.e. the names) of the Lambda functions, in the order CloudFormation lists them
///
/// Resources which are not created yet have no physical id and are skipped.
fn function_names(summaries: &[StackResourceSummary]) -> Vec<String> {
    summaries
        .iter()
        .filter(|summary| summary.resource_type() == Some(LAMBDA_FUNCTION_RESOURCE))
        .filter_map(|summary| summary.physical_resource_id())
        .map(|id| id.to_string())
        .collect()
}
