use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::browser::{Browser, BuildOptions};
use crate::config::Config;
use crate::endpoint::scripts;
use crate::endpoint::{Endpoint, ICEConnectionState, MediaConstraints, SessionDescription};
use crate::error::{TestbedError, WebDriverError};

type HTTPClient = Client<HttpConnector, Full<Bytes>>;

/// Thin W3C WebDriver client talking JSON over HTTP/1.
#[derive(Clone)]
pub struct WebDriverClient {
    http: HTTPClient,
    base_url: String,
}

#[derive(Deserialize)]
struct CommandResponse {
    value: Value,
}

#[derive(Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptOutcome<T> {
    Failed { error: String },
    Completed { result: T },
}

impl WebDriverClient {
    pub fn new(base_url: &str) -> Self {
        let http = Client::builder(TokioExecutor::new()).build_http();
        WebDriverClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let body = match payload {
            Some(payload) => Bytes::from(serde_json::to_vec(&payload)?),
            None => Bytes::new(),
        };
        let request = Request::builder()
            .method(method.clone())
            .uri(format!("{}{}", self.base_url, path))
            .header("content-type", "application/json; charset=utf-8")
            .body(Full::new(body))
            .map_err(|err| WebDriverError::InvalidRequest(err.to_string()))?;

        debug!(target: "WebDriver", "{} {}", method, path);

        let response = self.http.request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        let response: CommandResponse = serde_json::from_slice(&body)?;

        if !status.is_success() {
            let error: ErrorValue = serde_json::from_value(response.value)?;
            return Err(WebDriverError::Protocol {
                status: status.as_u16(),
                error: error.error,
                message: error.message,
            });
        }

        Ok(response.value)
    }
}

/// A browser session created through [`WebDriverClient`], running the test
/// page. Page state lives in `window.pc` and `window.localStream`.
pub struct WebDriverEndpoint {
    client: WebDriverClient,
    browser: Browser,
    session_id: String,
    test_page_url: String,
}

impl WebDriverEndpoint {
    pub async fn start(
        client: WebDriverClient,
        browser: Browser,
        options: BuildOptions,
        config: &Config,
    ) -> Result<Self, TestbedError> {
        let session = client
            .command(Method::POST, "/session", Some(browser.capabilities(options)))
            .await?;
        let session: NewSession = serde_json::from_value(session).map_err(WebDriverError::from)?;

        info!(target: "WebDriver", "Started {} session {}", browser, session.session_id);

        let endpoint = WebDriverEndpoint {
            client,
            browser,
            session_id: session.session_id,
            test_page_url: config.test_page_url.clone(),
        };

        let script_timeout = u64::try_from(config.step_timeout.as_millis()).unwrap_or(u64::MAX);
        if let Err(err) = endpoint
            .client
            .command(
                Method::POST,
                &endpoint.path("timeouts"),
                Some(json!({ "script": script_timeout })),
            )
            .await
        {
            endpoint.quit().await.ok();
            return Err(err.into());
        }

        Ok(endpoint)
    }

    fn path(&self, command: &str) -> String {
        format!("/session/{}/{}", self.session_id, command)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<T, TestbedError> {
        let value = self
            .client
            .command(
                Method::POST,
                &self.path("execute/async"),
                Some(json!({ "script": script, "args": args })),
            )
            .await?;

        match serde_json::from_value(value).map_err(WebDriverError::from)? {
            ScriptOutcome::Completed { result } => Ok(result),
            ScriptOutcome::Failed { error } => {
                warn!(target: "WebDriver", "Script failed in {}: {}", self.browser, error);
                Err(TestbedError::Script(error))
            }
        }
    }

    async fn execute_with_description(
        &self,
        script: &str,
        description: &SessionDescription,
    ) -> Result<Value, TestbedError> {
        let description = serde_json::to_value(description).map_err(WebDriverError::from)?;
        self.execute(script, vec![description]).await
    }
}

#[async_trait]
impl Endpoint for WebDriverEndpoint {
    fn browser(&self) -> Browser {
        self.browser
    }

    async fn load_test_page(&self) -> Result<(), TestbedError> {
        self.client
            .command(
                Method::POST,
                &self.path("url"),
                Some(json!({ "url": self.test_page_url })),
            )
            .await?;
        Ok(())
    }

    async fn create_peer_connection(&self) -> Result<(), TestbedError> {
        self.execute(scripts::CREATE_PEER_CONNECTION, vec![]).await
    }

    async fn get_user_media(&self, constraints: MediaConstraints) -> Result<(), TestbedError> {
        let constraints = serde_json::to_value(constraints).map_err(WebDriverError::from)?;
        self.execute(scripts::GET_USER_MEDIA, vec![constraints]).await
    }

    async fn add_stream(&self) -> Result<(), TestbedError> {
        self.execute(scripts::ADD_STREAM, vec![]).await
    }

    async fn create_offer(&self) -> Result<SessionDescription, TestbedError> {
        self.execute(scripts::CREATE_OFFER, vec![]).await
    }

    async fn create_answer(&self) -> Result<SessionDescription, TestbedError> {
        self.execute(scripts::CREATE_ANSWER, vec![]).await
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<SessionDescription, TestbedError> {
        let local = self
            .execute_with_description(scripts::SET_LOCAL_DESCRIPTION, &description)
            .await?;
        Ok(serde_json::from_value(local).map_err(WebDriverError::from)?)
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), TestbedError> {
        self.execute_with_description(scripts::SET_REMOTE_DESCRIPTION, &description)
            .await?;
        Ok(())
    }

    async fn wait_for_ice_connection_state_change(
        &self,
    ) -> Result<ICEConnectionState, TestbedError> {
        self.execute(scripts::WAIT_FOR_ICE_CONNECTION_STATE_CHANGE, vec![])
            .await
    }

    async fn video_count(&self) -> Result<usize, TestbedError> {
        self.execute(scripts::VIDEO_COUNT, vec![]).await
    }

    async fn videos_with_enough_data(&self) -> Result<bool, TestbedError> {
        self.execute(scripts::VIDEOS_HAVE_ENOUGH_DATA, vec![]).await
    }

    async fn quit(&self) -> Result<(), TestbedError> {
        self.client
            .command(
                Method::DELETE,
                &format!("/session/{}", self.session_id),
                None,
            )
            .await?;
        info!(target: "WebDriver", "Closed {} session {}", self.browser, self.session_id);
        Ok(())
    }
}
