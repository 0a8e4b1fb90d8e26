use env_logger::Env;
use log::{error, info, warn};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::endpoint::{Endpoint, WebDriverClient, WebDriverEndpoint};
use crate::error::TestbedError;
use crate::scenario::{quit_within, test_matrix, ScenarioReport, ScenarioRunner, TestCase};

mod browser;
mod config;
mod endpoint;
mod error;
mod scenario;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match Config::initialize() {
        Ok(config) => config,
        Err(err) => {
            error!(target: "Scenario", "Invalid configuration: {}", err);
            std::process::exit(2);
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(target: "Scenario", "Interrupted, cancelling remaining scenarios");
                shutdown.cancel();
            }
        }
    });

    let client = WebDriverClient::new(&config.webdriver_url);
    let mut reports = vec![];

    for case in test_matrix() {
        if !case.is_selected(&config) {
            continue;
        }
        if !case.is_available() {
            info!(target: "Scenario", "Skipping {}: browser not available on this platform", case.name);
            continue;
        }
        if shutdown.is_cancelled() {
            break;
        }
        reports.push(run_test_case(&case, &client, &config, &shutdown).await);
    }

    let failed = reports.iter().filter(|report| !report.passed()).count();
    for report in &reports {
        match &report.outcome {
            Ok(()) => info!(target: "Scenario", "ok   {}", report.name),
            Err(err) => error!(
                target: "Scenario",
                "FAIL {} [{}] after {}: {}",
                report.name,
                report.run_id,
                report
                    .last_passed_step()
                    .map_or_else(|| "no steps".to_string(), |step| step.to_string()),
                err
            ),
        }
    }
    info!(target: "Scenario", "{} passed, {} failed", reports.len() - failed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

async fn run_test_case(
    case: &TestCase,
    client: &WebDriverClient,
    config: &Config,
    shutdown: &CancellationToken,
) -> ScenarioReport {
    let options = case.scenario.build_options();
    let starting = async {
        tokio::join!(
            WebDriverEndpoint::start(client.clone(), case.offerer, options, config),
            WebDriverEndpoint::start(client.clone(), case.answerer, options, config)
        )
    };

    let started = tokio::select! {
        biased;
        _ = shutdown.cancelled() => Err(TestbedError::Cancelled),
        started = timeout(config.step_timeout, starting) => started.map_err(|_| {
            TestbedError::StepTimeout {
                step: "StartSessions".to_string(),
            }
        }),
    };
    let (offerer, answerer) = match started {
        Ok(started) => started,
        Err(err) => {
            warn!(target: "Scenario", "Could not start browsers for {}: {}", case.name, err);
            return ScenarioReport::aborted(&case.name, err);
        }
    };

    let (offerer, answerer) = match (offerer, answerer) {
        (Ok(offerer), Ok(answerer)) => (offerer, answerer),
        (Ok(started), Err(err)) | (Err(err), Ok(started)) => {
            if let Err(quit_err) = quit_within(&started, config.step_timeout).await {
                warn!(
                    target: "Scenario",
                    "Failed to quit {} after startup failure: {}",
                    started.browser(),
                    quit_err
                );
            }
            return ScenarioReport::aborted(&case.name, err);
        }
        (Err(err), Err(other)) => {
            warn!(
                target: "Scenario",
                "Both browsers failed to start for {}, second error: {}",
                case.name,
                other
            );
            return ScenarioReport::aborted(&case.name, err);
        }
    };

    let cancel = shutdown.child_token();
    let watchdog = tokio::spawn({
        let cancel = cancel.clone();
        let run_timeout = config.run_timeout;
        async move {
            tokio::time::sleep(run_timeout).await;
            cancel.cancel();
        }
    });

    let report = ScenarioRunner::new(case, config, &offerer, &answerer)
        .run(cancel)
        .await;
    watchdog.abort();

    report
}
