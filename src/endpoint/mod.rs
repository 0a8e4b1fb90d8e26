use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::browser::Browser;
use crate::error::TestbedError;

pub use webdriver::{WebDriverClient, WebDriverEndpoint};

mod scripts;
mod webdriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SDPType {
    Offer,
    Answer,
}

/// The `RTCSessionDescriptionInit` exchanged with the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SDPType,
    pub sdp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ICEConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

/// One browser running the test page with a single peer connection.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn browser(&self) -> Browser;

    async fn load_test_page(&self) -> Result<(), TestbedError>;

    async fn create_peer_connection(&self) -> Result<(), TestbedError>;

    async fn get_user_media(&self, constraints: MediaConstraints) -> Result<(), TestbedError>;

    /// Adds every track of the stream obtained by [`Endpoint::get_user_media`].
    async fn add_stream(&self) -> Result<(), TestbedError>;

    async fn create_offer(&self) -> Result<SessionDescription, TestbedError>;

    async fn create_answer(&self) -> Result<SessionDescription, TestbedError>;

    /// Resolves once ICE gathering completed, with the local description
    /// including the gathered candidates.
    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<SessionDescription, TestbedError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), TestbedError>;

    /// Resolves with the first of `connected`, `completed` or `failed`.
    async fn wait_for_ice_connection_state_change(
        &self,
    ) -> Result<ICEConnectionState, TestbedError>;

    async fn video_count(&self) -> Result<usize, TestbedError>;

    async fn videos_with_enough_data(&self) -> Result<bool, TestbedError>;

    async fn sleep(&self, duration: Duration) -> Result<(), TestbedError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn quit(&self) -> Result<(), TestbedError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::endpoint::{ICEConnectionState, SDPType, SessionDescription};

    #[test]
    fn session_description_uses_type_key() {
        let description = SessionDescription {
            sdp_type: SDPType::Offer,
            sdp: "v=0\r\n".to_string(),
        };

        let value = serde_json::to_value(&description).expect("Should serialize");

        assert_eq!(value, json!({ "type": "offer", "sdp": "v=0\r\n" }));
    }

    #[test]
    fn parses_browser_ice_states() {
        let state: ICEConnectionState =
            serde_json::from_value(json!("completed")).expect("Should parse state");

        assert_eq!(state, ICEConnectionState::Completed);
    }
}
