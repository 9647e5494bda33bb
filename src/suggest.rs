//! Sentence suggestions from a remote completion service.
//!
//! Requests are debounced: every text change replaces the pending request and
//! only fires after a quiet period. Results arriving for anything but the latest
//! request are dropped, so suggestions never go back to an older text.
//!
//! Uses the `reqwest` blocking client on a worker thread; no async runtime.

use serde::Serialize;
use std::{
    fmt,
    str::FromStr,
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
    time::Duration,
};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(750);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_TEXT_LEN: usize = 3;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Tone {
    #[default]
    Friendly,
    Formal,
    Corporate,
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "friendly" => Ok(Tone::Friendly),
            "formal" => Ok(Tone::Formal),
            "corporate" => Ok(Tone::Corporate),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tone::Friendly => "Friendly",
            Tone::Formal => "Formal",
            Tone::Corporate => "Corporate",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionRequest {
    pub text: String,
    pub tone: Tone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing_style: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("Suggestion request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Suggestion service returned status {0}")]
    Status(u16),
    #[error("Malformed suggestion response: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait SuggestionService: Send + Sync {
    fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<String>, SuggestionError>;
}

/// Posts the request as JSON and expects a JSON array of sentences back.
pub struct HttpSuggestionService {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpSuggestionService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SuggestionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl SuggestionService for HttpSuggestionService {
    fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<String>, SuggestionError> {
        let response = self.client.post(&self.endpoint).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestionError::Status(status.as_u16()));
        }

        parse_suggestions(&response.text()?)
    }
}

/// Parses a JSON array of strings, dropping blanks and keeping the first few.
pub fn parse_suggestions(body: &str) -> Result<Vec<String>, SuggestionError> {
    let suggestions: Vec<String> = serde_json::from_str(body)?;

    Ok(suggestions
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect())
}

/// Identifies one scheduled request. Only the newest ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Pending {
    ticket: Ticket,
    due: Duration,
    request: SuggestionRequest,
}

/// Debounce and supersede bookkeeping, driven by caller-supplied timestamps.
#[derive(Debug)]
pub struct SuggestionScheduler {
    quiet_period: Duration,
    generation: u64,
    pending: Option<Pending>,
    cleared: bool,
}

impl SuggestionScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            generation: 0,
            pending: None,
            cleared: false,
        }
    }

    /// Records a text change at `now`. Any pending or in-flight request is superseded.
    /// Text too short to complete schedules nothing and marks the suggestions cleared.
    pub fn text_changed(&mut self, request: SuggestionRequest, now: Duration) -> Ticket {
        self.generation += 1;
        let ticket = Ticket(self.generation);

        if request.text.trim().chars().count() < MIN_TEXT_LEN {
            self.pending = None;
            self.cleared = true;
        } else {
            self.pending = Some(Pending {
                ticket,
                due: now + self.quiet_period,
                request,
            });
        }
        ticket
    }

    /// True once after short text cleared the suggestions.
    pub fn take_cleared(&mut self) -> bool {
        std::mem::take(&mut self.cleared)
    }

    /// Hands out the pending request once its quiet period has passed.
    pub fn poll(&mut self, now: Duration) -> Option<(Ticket, SuggestionRequest)> {
        if self.pending.as_ref()?.due > now {
            return None;
        }
        self.pending.take().map(|p| (p.ticket, p.request))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for SuggestionScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionUpdate {
    Ready(Vec<String>),
    /// The text became too short; drop whatever is shown.
    Cleared,
    /// Transient; the composed text is untouched.
    Failed(String),
}

/// Runs due requests on worker threads and returns only current results.
pub struct SuggestionPipeline {
    service: Arc<dyn SuggestionService>,
    scheduler: SuggestionScheduler,
    tone: Tone,
    writing_style: Option<String>,
    sender: Sender<(Ticket, Result<Vec<String>, SuggestionError>)>,
    receiver: Receiver<(Ticket, Result<Vec<String>, SuggestionError>)>,
}

impl SuggestionPipeline {
    pub fn new(service: Arc<dyn SuggestionService>, quiet_period: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            service,
            scheduler: SuggestionScheduler::new(quiet_period),
            tone: Tone::default(),
            writing_style: None,
            sender,
            receiver,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_writing_style(mut self, style: Option<String>) -> Self {
        self.writing_style = style;
        self
    }

    pub fn text_changed(&mut self, text: &str, now: Duration) {
        let request = SuggestionRequest {
            text: text.to_string(),
            tone: self.tone,
            writing_style: self.writing_style.clone(),
        };
        self.scheduler.text_changed(request, now);
    }

    /// Starts a due request, then collects finished ones. Returns the newest
    /// update that still belongs to the current text.
    pub fn tick(&mut self, now: Duration) -> Option<SuggestionUpdate> {
        if let Some((ticket, request)) = self.scheduler.poll(now) {
            let service = Arc::clone(&self.service);
            let sender = self.sender.clone();
            log::debug!("Requesting suggestions for {:?}", request.text);
            thread::spawn(move || {
                let result = service.suggest(&request);
                // The pipeline may be gone; nothing to deliver to then
                let _ = sender.send((ticket, result));
            });
        }

        let mut update = self
            .scheduler
            .take_cleared()
            .then_some(SuggestionUpdate::Cleared);
        while let Ok((ticket, result)) = self.receiver.try_recv() {
            if !self.scheduler.is_current(ticket) {
                log::debug!("Dropping superseded suggestions {:?}", ticket);
                continue;
            }
            update = Some(match result {
                Ok(suggestions) => SuggestionUpdate::Ready(suggestions),
                Err(e) => {
                    log::warn!("{}", e);
                    SuggestionUpdate::Failed(e.to_string())
                }
            });
        }
        update
    }
}
