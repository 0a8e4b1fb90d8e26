use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use sdp::{merge_simulcast, split_simulcast, strip_ssrc_signaling, SimulcastError};

use crate::browser::{Browser, BuildOptions};
use crate::config::Config;
use crate::endpoint::{Endpoint, ICEConnectionState, MediaConstraints, SessionDescription};
use crate::error::TestbedError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Video only offer sent as `layers` simulcast layers, answered with one
    /// media section per layer.
    Simulcast { layers: usize },
    /// Audio and video negotiated with every SSRC and msid line removed.
    VideoWithoutSSRCs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LoadTestPages,
    CreatePeerConnections,
    GetUserMedia,
    AddStream,
    CreateOffer,
    SetLocalOffer,
    SignalOffer,
    CreateAnswer,
    SetLocalAnswer,
    SignalAnswer,
    AwaitIceConnected,
    AwaitVideos(usize),
    AwaitVideoData,
    Settle,
}

impl Scenario {
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = vec![
            Step::LoadTestPages,
            Step::CreatePeerConnections,
            Step::GetUserMedia,
            Step::AddStream,
            Step::CreateOffer,
            Step::SetLocalOffer,
            Step::SignalOffer,
            Step::CreateAnswer,
            Step::SetLocalAnswer,
            Step::SignalAnswer,
            Step::AwaitIceConnected,
            Step::AwaitVideos(self.expected_videos()),
            Step::AwaitVideoData,
        ];
        if let Scenario::Simulcast { .. } = self {
            steps.push(Step::Settle);
        }
        steps
    }

    pub fn build_options(&self) -> BuildOptions {
        match self {
            Scenario::Simulcast { .. } => BuildOptions::default(),
            Scenario::VideoWithoutSSRCs => BuildOptions { h264: true },
        }
    }

    fn media_constraints(&self) -> MediaConstraints {
        match self {
            Scenario::Simulcast { .. } => MediaConstraints {
                audio: false,
                video: true,
            },
            Scenario::VideoWithoutSSRCs => MediaConstraints {
                audio: true,
                video: true,
            },
        }
    }

    fn expected_videos(&self) -> usize {
        match self {
            Scenario::Simulcast { layers } => *layers,
            Scenario::VideoWithoutSSRCs => 1,
        }
    }

    /// Offer as applied locally by the offering browser.
    fn prepare_local_offer(&self, offerer: Browser, sdp: &str) -> Result<String, SimulcastError> {
        match self {
            Scenario::Simulcast { layers } => {
                offerer.simulcast_strategy().prepare_offer(sdp, *layers)
            }
            Scenario::VideoWithoutSSRCs => Ok(sdp.to_string()),
        }
    }

    /// Offer as signalled to the answering browser.
    fn signal_offer(&self, sdp: &str) -> Result<String, SimulcastError> {
        match self {
            Scenario::Simulcast { .. } => split_simulcast(sdp),
            Scenario::VideoWithoutSSRCs => Ok(strip_ssrc_signaling(sdp)),
        }
    }

    /// Answer as signalled back to the offering browser.
    fn signal_answer(&self, sdp: &str) -> Result<String, SimulcastError> {
        match self {
            Scenario::Simulcast { .. } => merge_simulcast(sdp),
            Scenario::VideoWithoutSSRCs => Ok(strip_ssrc_signaling(sdp)),
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::AwaitVideos(count) => write!(f, "AwaitVideos({})", count),
            step => write!(f, "{:?}", step),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub scenario: Scenario,
    pub offerer: Browser,
    pub answerer: Browser,
}

impl TestCase {
    fn new(name: String, scenario: Scenario, offerer: Browser, answerer: Browser) -> Self {
        TestCase {
            name,
            scenario,
            offerer,
            answerer,
        }
    }

    pub fn is_available(&self) -> bool {
        self.offerer.is_available() && self.answerer.is_available()
    }

    pub fn matches(&self, filter: Option<&str>) -> bool {
        filter.map_or(true, |filter| self.name.contains(filter))
    }

    /// Name filter plus browser selection from the configuration.
    pub fn is_selected(&self, config: &Config) -> bool {
        self.matches(config.filter.as_deref())
            && config.allows(self.offerer)
            && config.allows(self.answerer)
    }
}

pub fn test_matrix() -> Vec<TestCase> {
    let mut cases = vec![TestCase::new(
        "Chrome-Firefox, VP8".to_string(),
        Scenario::Simulcast { layers: 2 },
        Browser::Chrome,
        Browser::Firefox,
    )];

    let pairs = [
        (Browser::Chrome, Browser::Chrome),
        (Browser::Chrome, Browser::Firefox),
        (Browser::Firefox, Browser::Firefox),
        (Browser::Firefox, Browser::Chrome),
        (Browser::MicrosoftEdge, Browser::Chrome),
        (Browser::Chrome, Browser::MicrosoftEdge),
        (Browser::MicrosoftEdge, Browser::Firefox),
        (Browser::Firefox, Browser::MicrosoftEdge),
    ];
    cases.extend(pairs.into_iter().map(|(offerer, answerer)| {
        TestCase::new(
            format!("{}-{}, no SSRCs", offerer, answerer),
            Scenario::VideoWithoutSSRCs,
            offerer,
            answerer,
        )
    }));

    cases
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub run_id: Uuid,
    pub passed_steps: Vec<Step>,
    pub outcome: Result<(), TestbedError>,
}

impl ScenarioReport {
    /// Report for a run that never got both endpoints up.
    pub fn aborted(name: &str, err: TestbedError) -> Self {
        ScenarioReport {
            name: name.to_string(),
            run_id: Uuid::new_v4(),
            passed_steps: vec![],
            outcome: Err(err),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn last_passed_step(&self) -> Option<Step> {
        self.passed_steps.last().copied()
    }
}

/// Drives one offer/answer exchange between two endpoints.
pub struct ScenarioRunner<'a> {
    name: &'a str,
    scenario: Scenario,
    config: &'a Config,
    offerer: &'a dyn Endpoint,
    answerer: &'a dyn Endpoint,
    offer: Option<SessionDescription>,
    answer: Option<SessionDescription>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(
        case: &'a TestCase,
        config: &'a Config,
        offerer: &'a dyn Endpoint,
        answerer: &'a dyn Endpoint,
    ) -> Self {
        ScenarioRunner {
            name: &case.name,
            scenario: case.scenario,
            config,
            offerer,
            answerer,
            offer: None,
            answer: None,
        }
    }

    /// Runs every step in order and stops at the first failure. Both endpoints
    /// are quit afterwards regardless of the outcome.
    pub async fn run(mut self, cancel: CancellationToken) -> ScenarioReport {
        let run_id = Uuid::new_v4();
        info!(
            target: "Scenario",
            "[{}] Starting {} ({} -> {})",
            run_id,
            self.name,
            self.offerer.browser(),
            self.answerer.browser()
        );

        let mut passed_steps = vec![];
        let mut outcome = Ok(());

        for step in self.scenario.steps() {
            let step_timeout = self.config.step_timeout;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TestbedError::Cancelled),
                result = timeout(step_timeout, self.execute(step)) => {
                    result.unwrap_or_else(|_| Err(TestbedError::StepTimeout { step: step.to_string() }))
                }
            };

            match result {
                Ok(()) => {
                    debug!(target: "Scenario", "[{}] {} passed", run_id, step);
                    passed_steps.push(step);
                }
                Err(err) => {
                    error!(target: "Scenario", "[{}] {} failed: {}", run_id, step, err);
                    outcome = Err(err);
                    break;
                }
            }
        }

        let teardown = self.teardown(run_id).await;
        if outcome.is_ok() {
            outcome = teardown;
        }

        if outcome.is_ok() {
            info!(target: "Scenario", "[{}] {} passed", run_id, self.name);
        }

        ScenarioReport {
            name: self.name.to_string(),
            run_id,
            passed_steps,
            outcome,
        }
    }

    async fn execute(&mut self, step: Step) -> Result<(), TestbedError> {
        match step {
            Step::LoadTestPages => {
                tokio::try_join!(self.offerer.load_test_page(), self.answerer.load_test_page())?;
            }
            Step::CreatePeerConnections => {
                tokio::try_join!(
                    self.offerer.create_peer_connection(),
                    self.answerer.create_peer_connection()
                )?;
            }
            Step::GetUserMedia => {
                self.offerer
                    .get_user_media(self.scenario.media_constraints())
                    .await?;
            }
            Step::AddStream => self.offerer.add_stream().await?,
            Step::CreateOffer => {
                let mut offer = self.offerer.create_offer().await?;
                offer.sdp = self
                    .scenario
                    .prepare_local_offer(self.offerer.browser(), &offer.sdp)?;
                self.offer = Some(offer);
            }
            Step::SetLocalOffer => {
                let offer = self.take_offer(step)?;
                self.offer = Some(self.offerer.set_local_description(offer).await?);
            }
            Step::SignalOffer => {
                let mut offer = self.take_offer(step)?;
                offer.sdp = self.scenario.signal_offer(&offer.sdp)?;
                self.answerer.set_remote_description(offer).await?;
            }
            Step::CreateAnswer => {
                self.answer = Some(self.answerer.create_answer().await?);
            }
            Step::SetLocalAnswer => {
                let answer = self.take_answer(step)?;
                self.answer = Some(self.answerer.set_local_description(answer).await?);
            }
            Step::SignalAnswer => {
                let mut answer = self.take_answer(step)?;
                answer.sdp = self.scenario.signal_answer(&answer.sdp)?;
                self.offerer.set_remote_description(answer).await?;
            }
            Step::AwaitIceConnected => {
                match self.offerer.wait_for_ice_connection_state_change().await? {
                    ICEConnectionState::Failed => return Err(TestbedError::IceFailed),
                    state => debug!(target: "Scenario", "ICE connection state {:?}", state),
                }
            }
            Step::AwaitVideos(count) => {
                let answerer = self.answerer;
                poll_until(move || async move {
                    Ok::<_, TestbedError>(answerer.video_count().await? == count)
                })
                .await?;
            }
            Step::AwaitVideoData => {
                let answerer = self.answerer;
                poll_until(move || answerer.videos_with_enough_data()).await?;
            }
            Step::Settle => self.offerer.sleep(self.config.settle).await?,
        }
        Ok(())
    }

    fn take_offer(&mut self, step: Step) -> Result<SessionDescription, TestbedError> {
        self.offer
            .take()
            .ok_or_else(|| TestbedError::MissingDescription {
                step: step.to_string(),
            })
    }

    fn take_answer(&mut self, step: Step) -> Result<SessionDescription, TestbedError> {
        self.answer
            .take()
            .ok_or_else(|| TestbedError::MissingDescription {
                step: step.to_string(),
            })
    }

    async fn teardown(&self, run_id: Uuid) -> Result<(), TestbedError> {
        let limit = self.config.step_timeout;
        let (offerer, answerer) = tokio::join!(
            quit_within(self.offerer, limit),
            quit_within(self.answerer, limit)
        );
        for result in [&offerer, &answerer] {
            if let Err(err) = result {
                warn!(target: "Scenario", "[{}] Failed to quit browser: {}", run_id, err);
            }
        }

        let grace = self
            .config
            .grace_period(self.offerer.browser(), self.answerer.browser());
        if !grace.is_zero() {
            debug!(target: "Scenario", "[{}] Waiting {:?} after quit", run_id, grace);
            sleep(grace).await;
        }

        offerer.and(answerer)
    }
}

/// Quits `endpoint`, giving up once `limit` has passed.
pub async fn quit_within(endpoint: &dyn Endpoint, limit: Duration) -> Result<(), TestbedError> {
    timeout(limit, endpoint.quit())
        .await
        .unwrap_or_else(|_| {
            Err(TestbedError::QuitTimeout {
                browser: endpoint.browser(),
            })
        })
}

async fn poll_until<F, Fut>(mut check: F) -> Result<(), TestbedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, TestbedError>>,
{
    while !check().await? {
        sleep(POLL_INTERVAL).await;
    }
    Ok(())
}
