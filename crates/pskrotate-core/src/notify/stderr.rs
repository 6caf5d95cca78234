use std::io::{self, Write};

use async_trait::async_trait;

use super::{MessageSink, NotifyError};

/// Echoes every message to standard error, one line each.
#[derive(Debug, Default)]
pub struct StderrSink;

#[async_trait]
impl MessageSink for StderrSink {
    fn name(&self) -> &str {
        "stderr"
    }

    async fn post(&self, message: &str) -> Result<(), NotifyError> {
        let mut err = io::stderr().lock();
        writeln!(err, "{message}").map_err(|e| NotifyError::Sink(e.to_string()))
    }
}
