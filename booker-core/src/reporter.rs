use console::{style, Term};
use eyre::WrapErr;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::*;

use crate::{
    http, masking,
    runner::{self, Test},
};

/// Reporter trait. The trait is based on the "template method" pattern.
/// You can implement on_xxx methods to hook into the test runner. This way is enough for most usecases.
/// If you need more control, you can override the "run" method.
#[async_trait::async_trait]
pub trait Reporter {
    async fn run(&mut self, mut rx: broadcast::Receiver<runner::Message>) -> eyre::Result<()> {
        loop {
            match rx.recv().await {
                Ok(runner::Message::Start(module_name, test_name)) => {
                    self.on_start(module_name, test_name).await?;
                }
                Ok(runner::Message::HttpLog(module_name, test_name, log)) => {
                    self.on_http_call(module_name, test_name, log).await?;
                }
                Ok(runner::Message::End(module_name, test_name, test)) => {
                    self.on_end(module_name, test_name, test).await?;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("runner channel has been closed");
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    debug!("runner channel recv error");
                    continue;
                }
            }
        }

        self.on_finish().await
    }

    /// Called when a test case starts.
    async fn on_start(&mut self, _module: String, _test_name: String) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when an HTTP call is made.
    async fn on_http_call(
        &mut self,
        _module: String,
        _test_name: String,
        _log: Box<http::Log>,
    ) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a test case ends.
    async fn on_end(&mut self, _module: String, _test_name: String, _test: Test) -> eyre::Result<()> {
        Ok(())
    }

    /// Called once the runner channel is closed.
    async fn on_finish(&mut self) -> eyre::Result<()> {
        Ok(())
    }
}

pub struct NullReporter;

#[async_trait::async_trait]
impl Reporter for NullReporter {}

#[allow(clippy::vec_box)]
pub struct ListReporter {
    terminal: Term,
    buffer: HashMap<(String, String), Vec<Box<http::Log>>>,
    capture_http: bool,
    passed: usize,
    failed: usize,
}

impl ListReporter {
    pub fn new(capture_http: bool) -> ListReporter {
        ListReporter {
            terminal: Term::stdout(),
            buffer: HashMap::new(),
            capture_http,
            passed: 0,
            failed: 0,
        }
    }

    fn write_log(&self, log: &http::Log) -> eyre::Result<()> {
        let mask = masking::should_mask_sensitive();
        let (url, request_headers, response_headers) = if mask {
            (
                masking::mask_url(&log.request.url),
                masking::mask_headers(&log.request.headers),
                masking::mask_headers(&log.response.headers),
            )
        } else {
            (
                log.request.url.clone(),
                log.request.headers.clone(),
                log.response.headers.clone(),
            )
        };
        let body = |b: &str| {
            if mask {
                masking::mask_json_body(b)
            } else {
                b.to_string()
            }
        };

        write(&self.terminal, format!(" => {} {url}", log.request.method))?;
        write(&self.terminal, "  > request:")?;
        write(&self.terminal, "    > headers:")?;
        for (key, value) in &request_headers {
            write(
                &self.terminal,
                format!("       > {key}: {}", value.to_str().unwrap_or("<binary>")),
            )?;
        }
        if !log.request.body.is_empty() {
            write(
                &self.terminal,
                format!("    > body: {}", body(&log.request.body)),
            )?;
        }
        match log.response.status {
            Some(status) => write(
                &self.terminal,
                format!("  < response {status} ({:?})", log.response.duration),
            )?,
            None => write(&self.terminal, "  < no response")?,
        }
        write(&self.terminal, "    < headers:")?;
        for (key, value) in &response_headers {
            write(
                &self.terminal,
                format!("       < {key}: {}", value.to_str().unwrap_or("<binary>")),
            )?;
        }
        write(
            &self.terminal,
            format!("    < body: {}", body(&log.response.body)),
        )
    }
}

#[async_trait::async_trait]
impl Reporter for ListReporter {
    async fn on_start(&mut self, module_name: String, test_name: String) -> eyre::Result<()> {
        self.buffer.insert((module_name, test_name), Vec::new());
        Ok(())
    }

    async fn on_http_call(
        &mut self,
        module_name: String,
        test_name: String,
        log: Box<http::Log>,
    ) -> eyre::Result<()> {
        if self.capture_http {
            self.buffer
                .get_mut(&(module_name, test_name.clone()))
                .ok_or_else(|| eyre::eyre!("test case \"{test_name}\" not found in the buffer"))?
                .push(log);
        }
        Ok(())
    }

    async fn on_end(&mut self, module_name: String, test_name: String, test: Test) -> eyre::Result<()> {
        let http_logs = self
            .buffer
            .remove(&(module_name, test_name.clone()))
            .ok_or_else(|| eyre::eyre!("test case \"{test_name}\" not found in the buffer"))?;

        for log in http_logs {
            self.write_log(&log)?;
        }

        let Test { result, info } = test;
        match result {
            Ok(_res) => {
                self.passed += 1;
                let status = style("✓").green();
                self.terminal
                    .write_line(&format!("{status} {}", info.full_name()))?;
            }
            Err(e) => {
                self.failed += 1;
                let status = style("✘").red();
                self.terminal
                    .write_line(&format!("{status} {}: {e:#}", info.full_name()))?;
            }
        }

        Ok(())
    }

    async fn on_finish(&mut self) -> eyre::Result<()> {
        let summary = format!("{} passed, {} failed", self.passed, self.failed);
        let summary = if self.failed > 0 {
            style(summary).red()
        } else {
            style(summary).green()
        };
        self.terminal.write_line(&format!("\n{summary}"))?;
        Ok(())
    }
}

fn write(term: &Term, s: impl AsRef<str>) -> eyre::Result<()> {
    let colored = style(s.as_ref()).dim();
    term.write_line(&format!("{colored}"))
        .wrap_err("failed to write character on terminal")
}
