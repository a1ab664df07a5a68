use async_trait::async_trait;
use delambda_common::{
    Context, Error, Function, FunctionRepository, ListStackFunctions, StackInspector, StackName,
};
use eyre::eyre;
use std::collections::HashMap;
use std::error::Error as _;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

/// Keeps the levels of records logged by the library
struct LevelRecorder(Mutex<Vec<log::Level>>);

impl log::Log for LevelRecorder {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if record.target().starts_with("delambda_common") {
            self.0.lock().unwrap().push(record.level());
        }
    }

    fn flush(&self) {}
}

static RECORDER: LevelRecorder = LevelRecorder(Mutex::new(Vec::new()));

fn record_logs() -> &'static LevelRecorder {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        log::set_logger(&RECORDER).unwrap();
        log::set_max_level(log::LevelFilter::Debug);
    });

    &RECORDER
}

/// Stacks known by name, anything else is reported as missing
#[derive(Default)]
struct FakeStacks {
    stacks: HashMap<String, Vec<String>>,
}

impl FakeStacks {
    fn with(mut self, stack: &str, functions: &[&str]) -> Self {
        self.stacks.insert(
            stack.into(),
            functions.iter().map(|name| name.to_string()).collect(),
        );

        self
    }
}

#[async_trait]
impl StackInspector for FakeStacks {
    async fn list_functions(&self, _ctx: &Context, stack: &StackName) -> eyre::Result<Vec<String>> {
        self.stacks
            .get(stack.as_str())
            .cloned()
            .ok_or_else(|| eyre!("stack not found"))
    }
}

/// A stack inspector which never answers
struct HangingStacks;

#[async_trait]
impl StackInspector for HangingStacks {
    async fn list_functions(&self, _: &Context, _: &StackName) -> eyre::Result<Vec<String>> {
        futures::future::pending().await
    }
}

/// Resolves every name except the missing ones, records the lookups
#[derive(Default)]
struct FakeFunctions {
    missing: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    deadlines_seen: Mutex<Vec<bool>>,
}

impl FakeFunctions {
    fn missing(mut self, name: &str) -> Self {
        self.missing.push(name.into());
        self
    }

    fn slow(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.into(), delay);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FunctionRepository for FakeFunctions {
    async fn find_by_name(&self, ctx: &Context, name: &str) -> eyre::Result<Function> {
        self.calls.lock().unwrap().push(name.into());
        self.deadlines_seen
            .lock()
            .unwrap()
            .push(ctx.deadline().is_some());

        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }

        if self.missing.iter().any(|missing| missing == name) {
            return Err(eyre!("function not found"));
        }

        Ok(Function::new(name))
    }
}

fn usecase(
    functions: Arc<FakeFunctions>,
    stacks: impl StackInspector + 'static,
) -> ListStackFunctions {
    ListStackFunctions::new(functions, Arc::new(stacks))
}

fn names(functions: &[Function]) -> Vec<&str> {
    functions.iter().map(|f| f.name.as_str()).collect()
}

#[tokio::test]
async fn resolves_every_function_in_stack_order() {
    let functions = Arc::new(FakeFunctions::default());
    let stacks = FakeStacks::default().with("my-stack", &["fn-a", "fn-b"]);

    let result = usecase(functions.clone(), stacks)
        .execute(&Context::background(), &"my-stack".into())
        .await
        .unwrap();

    assert_eq!(result, vec![Function::new("fn-a"), Function::new("fn-b")]);
    assert_eq!(functions.calls(), vec!["fn-a", "fn-b"]);
}

#[tokio::test]
async fn empty_stack_is_not_an_error() {
    let functions = Arc::new(FakeFunctions::default());
    let stacks = FakeStacks::default().with("empty-stack", &[]);

    let result = usecase(functions.clone(), stacks)
        .execute(&Context::background(), &"empty-stack".into())
        .await
        .unwrap();

    assert!(result.is_empty());
    assert!(functions.calls().is_empty());
}

#[tokio::test]
async fn missing_stack_wraps_the_cause() {
    let functions = Arc::new(FakeFunctions::default());

    let err = usecase(functions.clone(), FakeStacks::default())
        .execute(&Context::background(), &"bad-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Enumerate { stack, .. } if stack.as_str() == "bad-stack"));
    assert_eq!(err.to_string(), "failed to list functions in stack bad-stack");
    assert_eq!(err.source().unwrap().to_string(), "stack not found");
    assert!(functions.calls().is_empty());
}

#[tokio::test]
async fn failed_lookup_discards_everything_and_stops() {
    let functions = Arc::new(FakeFunctions::default().missing("fn-b"));
    let stacks = FakeStacks::default().with("my-stack", &["fn-a", "fn-b", "fn-c"]);

    let err = usecase(functions.clone(), stacks)
        .execute(&Context::background(), &"my-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Resolve { name, .. } if name == "fn-b"));
    assert_eq!(err.to_string(), "failed to get function fn-b");
    assert_eq!(err.cause().unwrap().to_string(), "function not found");

    // Nothing is looked up after the failure
    assert_eq!(functions.calls(), vec!["fn-a", "fn-b"]);
}

#[tokio::test]
async fn cancelled_context_stops_before_any_call() {
    let functions = Arc::new(FakeFunctions::default());
    let stacks = FakeStacks::default().with("my-stack", &["fn-a"]);
    let (ctx, handle) = Context::background().with_cancel();
    handle.cancel();

    let err = usecase(functions.clone(), stacks)
        .execute(&ctx, &"my-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert!(err.is_cancellation());
    assert!(functions.calls().is_empty());
}

#[tokio::test]
async fn cancel_interrupts_pending_listing() {
    let functions = Arc::new(FakeFunctions::default());
    let (ctx, handle) = Context::background().with_cancel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
    });

    let err = usecase(functions, HangingStacks)
        .execute(&ctx, &"my-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn deadline_interrupts_slow_lookup() {
    let functions = Arc::new(
        FakeFunctions::default().slow("fn-b", Duration::from_secs(3600)),
    );
    let stacks = FakeStacks::default().with("my-stack", &["fn-a", "fn-b", "fn-c"]);
    let ctx = Context::background().with_timeout(Duration::from_millis(50));

    let err = usecase(functions.clone(), stacks)
        .execute(&ctx, &"my-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DeadlineExceeded));
    assert_eq!(functions.calls(), vec!["fn-a", "fn-b"]);

    // The context is handed down to the repository
    assert!(functions.deadlines_seen.lock().unwrap().iter().all(|seen| *seen));
}

#[tokio::test]
async fn concurrent_lookups_keep_stack_order() {
    let functions = Arc::new(
        FakeFunctions::default()
            .slow("fn-a", Duration::from_millis(40))
            .slow("fn-c", Duration::from_millis(10)),
    );
    let stacks = FakeStacks::default().with("my-stack", &["fn-a", "fn-b", "fn-c"]);

    let result = usecase(functions, stacks)
        .with_concurrency(3)
        .execute(&Context::background(), &"my-stack".into())
        .await
        .unwrap();

    assert_eq!(names(&result), vec!["fn-a", "fn-b", "fn-c"]);
}

#[tokio::test]
async fn concurrent_lookup_failure_fails_everything() {
    let functions = Arc::new(
        FakeFunctions::default()
            .slow("fn-a", Duration::from_millis(20))
            .missing("fn-c"),
    );
    let stacks = FakeStacks::default().with("my-stack", &["fn-a", "fn-b", "fn-c", "fn-d"]);

    let err = usecase(functions, stacks)
        .with_concurrency(4)
        .execute(&Context::background(), &"my-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Resolve { name, .. } if name == "fn-c"));
}

#[tokio::test]
async fn concurrent_failure_does_not_wait_for_earlier_lookups() {
    let functions = Arc::new(
        FakeFunctions::default()
            .slow("fn-a", Duration::from_secs(3600))
            .missing("fn-b"),
    );
    let stacks = FakeStacks::default().with("my-stack", &["fn-a", "fn-b"]);

    let started = std::time::Instant::now();
    let err = usecase(functions.clone(), stacks)
        .with_concurrency(2)
        .execute(&Context::background(), &"my-stack".into())
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Resolve { name, .. } if name == "fn-b"));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(functions.calls(), vec!["fn-a", "fn-b"]);
}

#[tokio::test]
async fn invocations_do_not_share_state() {
    let functions = Arc::new(FakeFunctions::default());
    let stacks = FakeStacks::default()
        .with("first", &["fn-a"])
        .with("second", &["fn-b", "fn-c"]);
    let usecase = usecase(functions, stacks);

    let first = tokio::spawn({
        let usecase = usecase.clone();
        async move { usecase.execute(&Context::background(), &"first".into()).await }
    });

    let second = tokio::spawn({
        let usecase = usecase.clone();
        async move { usecase.execute(&Context::background(), &"second".into()).await }
    });

    assert_eq!(names(&first.await.unwrap().unwrap()), vec!["fn-a"]);
    assert_eq!(names(&second.await.unwrap().unwrap()), vec!["fn-b", "fn-c"]);
}

#[tokio::test]
async fn failures_are_left_to_the_caller_to_report() {
    let recorder = record_logs();
    let functions = Arc::new(FakeFunctions::default().missing("fn-a"));
    let stacks = FakeStacks::default().with("my-stack", &["fn-a"]);

    usecase(functions.clone(), stacks)
        .execute(&Context::background(), &"my-stack".into())
        .await
        .unwrap_err();

    usecase(functions, FakeStacks::default())
        .execute(&Context::background(), &"bad-stack".into())
        .await
        .unwrap_err();

    let levels = recorder.0.lock().unwrap();
    assert!(levels.contains(&log::Level::Debug));
    assert!(!levels.contains(&log::Level::Error));
}
