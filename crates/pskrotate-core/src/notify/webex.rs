use async_trait::async_trait;

use pskrotate_api::WebexClient;

use super::{MessageSink, NotifyError};

/// Posts markdown messages into one Webex room.
pub struct WebexSink {
    client: WebexClient,
    room_id: String,
}

impl WebexSink {
    pub fn new(client: WebexClient, room_id: impl Into<String>) -> Self {
        Self {
            client,
            room_id: room_id.into(),
        }
    }
}

#[async_trait]
impl MessageSink for WebexSink {
    fn name(&self) -> &str {
        "webex"
    }

    async fn post(&self, message: &str) -> Result<(), NotifyError> {
        self.client.create_message(&self.room_id, message).await?;
        Ok(())
    }
}
