use crate::aws::{CloudFormationStackInspector, LambdaFunctionRepository};
use crate::config::{check_concurrency, parse_timeout, Config};
use crate::error::Error;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use delambda_common::{Context, Error as ListError, Function, ListStackFunctions, StackName};
use std::sync::Arc;
use std::time::Duration;
use tabled::settings::{peaker::Priority, style::Style, Width};
use tabled::{Table, Tabled};
use terminal_size::{terminal_size, Width as TerminalWidth};

/// Used when the output is not a terminal
const DEFAULT_WIDTH: usize = 120;

#[derive(Tabled, Clone, Debug, PartialEq)]
struct FunctionRow {
    #[tabled(rename = "Function")]
    function: String,
    #[tabled(rename = "Runtime")]
    runtime: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Timeout")]
    timeout: String,
    #[tabled(rename = "Updated")]
    last_modified: String,
}

#[derive(clap::Args, Clone)]
pub(crate) struct FunctionsCommand {
    /// Name of the CloudFormation stack
    #[arg()]
    stack: String,

    /// Give up after this long, e.g. `30s` or `2m`.
    /// No limit by default.
    #[arg(short, long, value_parser = parse_timeout_arg)]
    timeout: Option<Duration>,

    /// Number of functions fetched at once.
    /// Defaults to 1, i.e. one by one.
    #[arg(short, long, value_parser = parse_concurrency_arg)]
    concurrency: Option<usize>,
}

fn parse_concurrency_arg(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|e| e.to_string())
        .and_then(|concurrency| check_concurrency(concurrency).map_err(|e| e.to_string()))
}

fn parse_timeout_arg(value: &str) -> Result<Duration, String> {
    parse_timeout(value).map_err(|e| e.to_string())
}

impl Runnable for FunctionsCommand {
    fn runner<'a>(&self, writer: &'a Writer, config: &'a Config) -> impl Runner + 'a {
        FunctionsRunner {
            command: self.clone(),
            writer,
            config,
        }
    }
}

struct FunctionsRunner<'a> {
    command: FunctionsCommand,
    writer: &'a Writer,
    config: &'a Config,
}

impl Runner for FunctionsRunner<'_> {
    fn config(&self) -> &Config {
        self.config
    }

    /// Prints out the functions of the stack with their details
    async fn run(&mut self) -> Result<(), Error> {
        let stack = StackName::new(self.command.stack.clone());
        let sdk_config = self.sdk_config().await;

        let concurrency = self
            .command
            .concurrency
            .unwrap_or(self.config.concurrency);

        let usecase = ListStackFunctions::new(
            Arc::new(LambdaFunctionRepository::new(&sdk_config)),
            Arc::new(CloudFormationStackInspector::new(&sdk_config)),
        )
        .with_concurrency(concurrency);

        let (mut ctx, cancel) = Context::background().with_cancel();

        if let Some(timeout) = self.command.timeout.or(self.config.timeout) {
            ctx = ctx.with_timeout(timeout);
        }

        // Stop fetching on Ctrl-C
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        self.writer.text(&format!(
            "\n{} {} {}...\n\n",
            console::style("Fetching functions").green().bold(),
            console::style("of").dim(),
            console::style(&stack).bold()
        ))?;

        let result = usecase.execute(&ctx, &stack).await;
        interrupt.abort();
        let functions = result.map_err(|e| self.list_error(e))?;

        if self.writer.is_structured() {
            let json = serde_json::to_value(&functions)
                .map_err(|e| self.error(None, None, Some(e.into())))?;

            return self.writer.json(json);
        }

        if functions.is_empty() {
            return self.writer.text(&format!(
                "{}\n",
                console::style(format!("No functions found in stack {stack}")).yellow()
            ));
        }

        let mut table = Table::new(rows(&functions));

        table
            .with(Style::modern())
            .with(Width::wrap(terminal_width()).priority(Priority::max(true)));

        self.writer.text(&format!("{table}\n"))
    }
}

impl FunctionsRunner<'_> {
    /// Explain a failed listing to the user
    fn list_error(&self, err: ListError) -> Error {
        let title = match &err {
            ListError::Enumerate { stack, .. } => format!("Could not list functions of stack {stack}"),
            ListError::Resolve { name, .. } => format!("Could not get function {name}"),
            ListError::Cancelled => "Interrupted".into(),
            ListError::DeadlineExceeded => "Timed out".into(),
        };

        let description = match &err {
            ListError::DeadlineExceeded => Some("Try again with a longer --timeout.".into()),
            ListError::Cancelled => None,
            _ => err.cause().map(|cause| cause.to_string()),
        };

        self.error(Some(&title), description.as_deref(), Some(Box::new(err)))
    }
}

fn rows(functions: &[Function]) -> Vec<FunctionRow> {
    functions
        .iter()
        .map(|function| FunctionRow {
            function: function.name.clone(),
            runtime: function.runtime.clone().unwrap_or_else(|| "NA".into()),
            memory: function
                .memory_size
                .map(|mb| format!("{mb} MB"))
                .unwrap_or_else(|| "NA".into()),
            timeout: function
                .timeout
                .map(|seconds| format!("{seconds}s"))
                .unwrap_or_else(|| "NA".into()),
            last_modified: function
                .last_modified
                .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "NA".into()),
        })
        .collect()
}

fn terminal_width() -> usize {
    terminal_size()
        .map(|(TerminalWidth(width), _)| width as usize)
        .unwrap_or(DEFAULT_WIDTH)
}
