/// booker's scenario runner
use eyre::WrapErr;
use futures::FutureExt;
use once_cell::sync::Lazy;
use std::{
    ops::Deref,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::sync::broadcast;
use tracing::*;

use crate::{config::get_config, http, reporter::Reporter, ModuleName, TestName};

pub static CHANNEL: Lazy<Mutex<Option<broadcast::Sender<Message>>>> =
    Lazy::new(|| Mutex::new(Some(broadcast::channel(1000).0)));

pub fn publish(msg: Message) -> eyre::Result<()> {
    let Ok(guard) = CHANNEL.lock() else {
        eyre::bail!("failed to acquire runner channel lock");
    };
    let Some(tx) = guard.deref() else {
        eyre::bail!("runner channel has been already closed");
    };

    tx.send(msg)
        .wrap_err("failed to publish message to the runner channel")?;

    Ok(())
}

/// Subscribe to the channel to see the real-time test execution events.
pub fn subscribe() -> eyre::Result<broadcast::Receiver<Message>> {
    let Ok(guard) = CHANNEL.lock() else {
        eyre::bail!("failed to acquire runner channel lock");
    };
    let Some(tx) = guard.deref() else {
        eyre::bail!("runner channel has been already closed");
    };

    Ok(tx.subscribe())
}

/// Signature of a registered scenario.
pub type AsyncTestFn =
    fn() -> Pin<Box<dyn futures::Future<Output = eyre::Result<()>> + Send + 'static>>;

/// Static registration of a scenario, collected with `inventory`.
pub struct TestRegistration {
    pub module: &'static str,
    pub name: &'static str,
    pub test_fn: AsyncTestFn,
}

inventory::collect!(TestRegistration);

/// Register an `async fn() -> eyre::Result<()>` as a scenario of the current module.
#[macro_export]
macro_rules! scenario {
    ($name:ident) => {
        $crate::inventory::submit! {
            $crate::runner::TestRegistration {
                module: module_path!(),
                name: stringify!($name),
                test_fn: || Box::pin($name()),
            }
        }
    };
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("panic: {0}")]
    Panicked(String),
    #[error("error: {0}")]
    ErrorReturned(String),
}

#[derive(Debug, Clone)]
pub enum Message {
    Start(ModuleName, TestName),
    HttpLog(ModuleName, TestName, Box<http::Log>),
    End(ModuleName, TestName, Test),
}

#[derive(Debug, Clone)]
pub struct Test {
    pub info: TestInfo,
    pub result: Result<(), Error>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    pub module: String,
    pub name: String,
}

impl TestInfo {
    /// Full test name including module
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }
}

pub type TestCaseFactory = Arc<
    dyn Fn() -> Pin<Box<dyn futures::Future<Output = eyre::Result<()>> + Send + 'static>>
        + Sync
        + Send
        + 'static,
>;

/// Wrap an async closure into a [`TestCaseFactory`].
pub fn factory<F, Fut>(f: F) -> TestCaseFactory
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: futures::Future<Output = eyre::Result<()>> + Send + 'static,
{
    Arc::new(
        move || -> Pin<Box<dyn futures::Future<Output = eyre::Result<()>> + Send + 'static>> {
            Box::pin(f())
        },
    )
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub capture_http: bool,
    pub capture_rust: bool,
    pub terminate_channel: bool,
}

/// Test case filter trait.
pub trait Filter {
    fn filter(&self, info: &TestInfo) -> bool;
}

/// Filter test cases by module name.
pub struct ModuleFilter<'a> {
    module_names: &'a [String],
}

impl Filter for ModuleFilter<'_> {
    fn filter(&self, info: &TestInfo) -> bool {
        if self.module_names.is_empty() {
            return true;
        }

        self.module_names.iter().any(|module_name| {
            &info.module == module_name || info.module.ends_with(&format!("::{module_name}"))
        })
    }
}

/// Filter test cases by test name.
pub struct TestNameFilter<'a> {
    test_names: &'a [String],
}

impl Filter for TestNameFilter<'_> {
    fn filter(&self, info: &TestInfo) -> bool {
        if self.test_names.is_empty() {
            return true;
        }

        self.test_names
            .iter()
            .any(|test_name| &info.full_name() == test_name || &info.name == test_name)
    }
}

/// Filter test cases by the `test_ignore` list of the configuration.
#[derive(Debug, Clone, Default)]
pub struct TestIgnoreFilter {
    test_ignore: Vec<String>,
}

impl TestIgnoreFilter {
    pub fn new(test_ignore: Vec<String>) -> TestIgnoreFilter {
        TestIgnoreFilter { test_ignore }
    }

    /// Build the filter from the process-wide configuration; empty when it cannot load.
    pub fn from_config() -> TestIgnoreFilter {
        match get_config() {
            Ok(cfg) => TestIgnoreFilter::new(cfg.test_ignore.clone()),
            Err(e) => {
                debug!("no test_ignore loaded: {e}");
                TestIgnoreFilter::default()
            }
        }
    }
}

impl Filter for TestIgnoreFilter {
    fn filter(&self, info: &TestInfo) -> bool {
        let full_name = info.full_name();
        self.test_ignore
            .iter()
            .all(|test_name| !full_name.ends_with(test_name.as_str()))
    }
}

/// Runs scenarios one after another and streams their events to reporters.
pub struct Runner {
    ignore_filter: TestIgnoreFilter,
    options: Options,
    test_cases: Vec<(TestInfo, TestCaseFactory)>,
    reporters: Vec<Box<dyn Reporter + Send>>,
}

impl Default for Runner {
    fn default() -> Self {
        Runner::new()
    }
}

impl Runner {
    pub fn new() -> Runner {
        Runner::with_ignore_filter(TestIgnoreFilter::from_config())
    }

    pub fn with_ignore_filter(ignore_filter: TestIgnoreFilter) -> Runner {
        Runner {
            ignore_filter,
            options: Options::default(),
            test_cases: Vec::new(),
            reporters: Vec::new(),
        }
    }

    /// Runner preloaded with every scenario registered through [`crate::scenario!`].
    pub fn discover() -> Runner {
        let mut runner = Runner::new();
        for registration in inventory::iter::<TestRegistration> {
            let test_fn = registration.test_fn;
            runner.add_test(
                registration.name,
                registration.module,
                Arc::new(move || test_fn()),
            );
        }
        runner
    }

    pub fn capture_http(&mut self) {
        self.options.capture_http = true;
    }

    pub fn capture_rust(&mut self) {
        self.options.capture_rust = true;
    }

    pub fn terminate_channel(&mut self) {
        self.options.terminate_channel = true;
    }

    pub fn add_reporter(&mut self, reporter: impl Reporter + 'static + Send) {
        self.reporters.push(Box::new(reporter));
    }

    pub fn add_boxed_reporter(&mut self, reporter: Box<dyn Reporter + 'static + Send>) {
        self.reporters.push(reporter);
    }

    /// Add a test case to the runner.
    pub fn add_test(&mut self, name: &str, module: &str, factory: TestCaseFactory) {
        self.test_cases.push((
            TestInfo {
                name: name.into(),
                module: module.into(),
            },
            factory,
        ));
    }

    fn selected(
        &self,
        module_names: &[String],
        test_names: &[String],
    ) -> Vec<(TestInfo, TestCaseFactory)> {
        let module_filter = ModuleFilter { module_names };
        let test_name_filter = TestNameFilter { test_names };
        let mut selected: Vec<_> = self
            .test_cases
            .iter()
            .filter(|(info, _)| test_name_filter.filter(info))
            .filter(|(info, _)| module_filter.filter(info))
            .filter(|(info, _)| self.ignore_filter.filter(info))
            .cloned()
            .collect();
        selected.sort_by_key(|(info, _)| info.full_name());
        selected
    }

    /// Run the selected scenarios sequentially.
    pub async fn run(
        &mut self,
        module_names: &[String],
        test_names: &[String],
    ) -> eyre::Result<()> {
        if self.options.capture_rust {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init();
        }

        let mut reporters = std::mem::take(&mut self.reporters);
        let receivers = reporters
            .iter()
            .map(|_| subscribe())
            .collect::<eyre::Result<Vec<_>>>()?;
        // Keeps the channel open for publishing even without reporters.
        let _guard = subscribe()?;

        let selected = self.selected(module_names, test_names);
        let options = self.options.clone();

        let runner = async move {
            if selected.is_empty() {
                console::Term::stdout().write_line("no test cases found")?;
            }

            let mut failures = 0usize;
            for (info, factory) in selected {
                if run_test(info, factory).await.is_err() {
                    failures += 1;
                }
            }
            debug!("all test finished. sending stop signal to the background tasks.");

            if options.terminate_channel {
                let Ok(mut guard) = CHANNEL.lock() else {
                    eyre::bail!("failed to acquire runner channel lock");
                };
                guard.take(); // closing the runner channel.
            }

            if failures > 0 {
                eyre::bail!("{failures} test(s) failed");
            }

            eyre::Ok(())
        };

        let reporters = futures::future::join_all(
            reporters
                .iter_mut()
                .zip(receivers)
                .map(|(reporter, rx)| reporter.run(rx)),
        );

        let (result, reporter_results) = tokio::join!(runner, reporters);
        for res in reporter_results {
            if let Err(e) = res {
                error!("reporter failed: {e:#}");
            }
        }

        debug!("runner stopped");

        result
    }

    pub fn list(&self) -> Vec<&TestInfo> {
        self.test_cases
            .iter()
            .map(|(meta, _test)| meta)
            .collect::<Vec<_>>()
    }

    pub fn is_ignored(&self, info: &TestInfo) -> bool {
        !self.ignore_filter.filter(info)
    }
}

async fn run_test(info: TestInfo, factory: TestCaseFactory) -> eyre::Result<()> {
    let channel = Arc::new(Mutex::new(Some(broadcast::channel(1000).0)));
    http::CHANNEL
        .scope(channel, async move {
            let test_name = info.name.clone();
            let module = info.module.clone();
            let mut http_rx = http::subscribe()?;

            publish(Message::Start(module.clone(), test_name.clone()))
                .wrap_err("failed to send Message::Start to the channel")?;

            let fut = std::panic::AssertUnwindSafe(factory()).catch_unwind();
            let result = match fut.await {
                Ok(Ok(_)) => {
                    debug!("{test_name} ok");
                    Ok(())
                }
                Ok(Err(e)) => {
                    debug!("{test_name} failed: {e:#}");
                    Err(Error::ErrorReturned(format!("{e:?}")))
                }
                Err(e) => {
                    let panic_message = if let Some(panic_message) = e.downcast_ref::<&str>() {
                        format!("{test_name} failed with message: {panic_message}")
                    } else if let Some(panic_message) = e.downcast_ref::<String>() {
                        format!("{test_name} failed with message: {panic_message}")
                    } else {
                        format!("{test_name} failed with unknown message")
                    };
                    Err(Error::Panicked(panic_message))
                }
            };

            while let Ok(log) = http_rx.try_recv() {
                publish(Message::HttpLog(module.clone(), test_name.clone(), Box::new(log)))
                    .wrap_err("failed to send Message::HttpLog to the channel")?;
            }

            let is_err = result.is_err();
            publish(Message::End(module, test_name, Test { info, result }))
                .wrap_err("failed to send Message::End to the channel")?;

            eyre::ensure!(!is_err, "test failed");
            eyre::Ok(())
        })
        .await
}
