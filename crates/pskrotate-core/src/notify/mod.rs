// ── Fire-and-forget notification fan-out ──
//
// Producers call `Notifier::post`, which only enqueues. A background task
// delivers each message to every sink in order. A sink failure is logged
// and dropped; it never reaches the producer.

mod stderr;
mod webex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use stderr::StderrSink;
pub use webex::WebexSink;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(#[from] pskrotate_api::Error),

    #[error("{0}")]
    Sink(String),
}

/// One-way message destination (chat room, console, log).
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn post(&self, message: &str) -> Result<(), NotifyError>;
}

enum Message {
    Post(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background delivery task.
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Message>>,
    task: Option<JoinHandle<()>>,
}

impl Notifier {
    /// Start delivering to `sinks`. Must be called inside a tokio runtime.
    ///
    /// With no sinks this is equivalent to [`Notifier::disabled`].
    pub fn spawn(sinks: Vec<Box<dyn MessageSink>>) -> Self {
        if sinks.is_empty() {
            return Self::disabled();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(deliver(sinks, rx));
        Self {
            tx: Some(tx),
            task: Some(task),
        }
    }

    /// A notifier that discards everything.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            task: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Enqueue a message. Never waits on delivery.
    pub fn post(&self, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            if tx.send(Message::Post(message.into())).is_err() {
                debug!("notifier task gone, message dropped");
            }
        }
    }

    /// Wait until everything posted so far has been attempted.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(Message::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Drain outstanding messages and stop the delivery task.
    pub async fn close(mut self) {
        drop(self.tx.take());
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "notifier task ended abnormally");
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::disabled()
    }
}

async fn deliver(sinks: Vec<Box<dyn MessageSink>>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            Message::Post(text) => {
                for sink in &sinks {
                    if let Err(e) = sink.post(&text).await {
                        warn!(sink = sink.name(), error = %e, "notification delivery failed");
                    }
                }
            }
            Message::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("notifier channel closed");
}
