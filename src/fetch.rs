use crate::error::{FetchFailure, ScrapeError};
use crate::events::{EventSink, UiEvent};
use crate::limiter::RateLimiter;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;

/// Source of parsed documents.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Html, ScrapeError>;
}

/// Blocking HTTP fetcher. One request at a time, each preceded by the limiter.
/// No retries: a failure is handed back to the caller.
pub struct HttpFetcher {
    agent: ureq::Agent,
    limiter: Box<dyn RateLimiter>,
    sink: Arc<dyn EventSink>,
}

impl HttpFetcher {
    pub fn new(limiter: Box<dyn RateLimiter>, sink: Arc<dyn EventSink>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(60)))
            .build()
            .new_agent();
        Self { agent, limiter, sink }
    }

    fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let fail = |failure| ScrapeError::Fetch { url: url.to_string(), failure };

        let resp = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(code)) => return Err(fail(FetchFailure::Status(code))),
            Err(e) => return Err(fail(FetchFailure::Transport(e.to_string()))),
        };

        let status = resp.status();
        if !status.is_success() {
            return Err(fail(FetchFailure::Status(status.as_u16())));
        }

        resp.into_body()
            .read_to_string()
            .map_err(|e| fail(FetchFailure::Transport(e.to_string())))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Html, ScrapeError> {
        self.sink.send(UiEvent::Log(format!("Retrieving {} ...", url)));
        self.limiter.acquire();
        let body = self.get_text(url)?;
        Ok(Html::parse_document(&body))
    }
}
