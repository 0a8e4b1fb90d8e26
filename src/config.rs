use std::collections::HashMap;
use std::time::Duration;

use crate::browser::Browser;
use crate::error::TestbedError;

const WEBDRIVER_URL_ENV: &str = "WEBDRIVER_URL";
const TEST_PAGE_URL_ENV: &str = "TEST_PAGE_URL";
const STEP_TIMEOUT_ENV: &str = "STEP_TIMEOUT_MS";
const RUN_TIMEOUT_ENV: &str = "RUN_TIMEOUT_MS";
const POST_QUIT_GRACE_ENV: &str = "POST_QUIT_GRACE_MS";
const SETTLE_ENV: &str = "SETTLE_MS";
const FILTER_ENV: &str = "TESTBED_FILTER";
const BROWSERS_ENV: &str = "TESTBED_BROWSERS";

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_TEST_PAGE_URL: &str = "https://fippo.github.io/adapter/testpage.html";
const DEFAULT_STEP_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RUN_TIMEOUT_MS: u64 = 300_000;
const DEFAULT_POST_QUIT_GRACE_MS: u64 = 2_000;
const DEFAULT_SETTLE_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub webdriver_url: String,
    pub test_page_url: String,
    /// Upper bound for every single scenario step, including polling waits.
    pub step_timeout: Duration,
    /// Upper bound for a whole scenario run, teardown excluded.
    pub run_timeout: Duration,
    pub settle: Duration,
    pub filter: Option<String>,
    /// Browsers allowed to take part in a run, all of them when unset.
    pub browsers: Option<Vec<Browser>>,
    /// Extra wait after quitting a browser whose driver resolves quit early.
    pub browser_quirks: HashMap<Browser, Duration>,
}

impl Config {
    pub fn initialize() -> Result<Self, TestbedError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, TestbedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webdriver_url =
            lookup(WEBDRIVER_URL_ENV).unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());
        let test_page_url =
            lookup(TEST_PAGE_URL_ENV).unwrap_or_else(|| DEFAULT_TEST_PAGE_URL.to_string());

        let step_timeout = millis(&lookup, STEP_TIMEOUT_ENV, DEFAULT_STEP_TIMEOUT_MS)?;
        let run_timeout = millis(&lookup, RUN_TIMEOUT_ENV, DEFAULT_RUN_TIMEOUT_MS)?;
        let post_quit_grace = millis(&lookup, POST_QUIT_GRACE_ENV, DEFAULT_POST_QUIT_GRACE_MS)?;
        let settle = millis(&lookup, SETTLE_ENV, DEFAULT_SETTLE_MS)?;

        let filter = lookup(FILTER_ENV).filter(|filter| !filter.trim().is_empty());
        let browsers = lookup(BROWSERS_ENV)
            .filter(|browsers| !browsers.trim().is_empty())
            .map(|browsers| {
                browsers
                    .split(',')
                    .map(|name| Browser::try_from(name.trim()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Config {
            webdriver_url,
            test_page_url,
            step_timeout,
            run_timeout,
            settle,
            filter,
            browsers,
            browser_quirks: HashMap::from([(Browser::MicrosoftEdge, post_quit_grace)]),
        })
    }

    pub fn allows(&self, browser: Browser) -> bool {
        self.browsers
            .as_ref()
            .map_or(true, |browsers| browsers.contains(&browser))
    }

    /// Longest quirk wait of the two browsers, zero if neither has one.
    pub fn grace_period(&self, first: Browser, second: Browser) -> Duration {
        [first, second]
            .iter()
            .filter_map(|browser| self.browser_quirks.get(browser))
            .max()
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

fn millis<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, TestbedError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(Duration::from_millis(default)),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| TestbedError::InvalidConfig { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::browser::Browser;
    use crate::config::Config;
    use crate::error::TestbedError;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(|_| None).expect("Should build default config");

        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(
            config.test_page_url,
            "https://fippo.github.io/adapter/testpage.html"
        );
        assert_eq!(config.step_timeout, Duration::from_secs(30));
        assert_eq!(config.settle, Duration::from_secs(5));
        assert_eq!(config.filter, None);
        assert_eq!(config.browsers, None);
        assert!(config.allows(Browser::Safari));
        assert_eq!(
            config.browser_quirks.get(&Browser::MicrosoftEdge),
            Some(&Duration::from_secs(2))
        );
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("WEBDRIVER_URL", "http://selenium:4444/wd/hub"),
            ("STEP_TIMEOUT_MS", "1500"),
            ("POST_QUIT_GRACE_MS", "0"),
            ("TESTBED_FILTER", "Firefox"),
        ]))
        .expect("Should build config");

        assert_eq!(config.webdriver_url, "http://selenium:4444/wd/hub");
        assert_eq!(config.step_timeout, Duration::from_millis(1500));
        assert_eq!(config.filter.as_deref(), Some("Firefox"));
        assert_eq!(
            config.grace_period(Browser::MicrosoftEdge, Browser::Chrome),
            Duration::ZERO
        );
    }

    #[test]
    fn rejects_non_numeric_durations() {
        let result = Config::from_lookup(lookup_from(&[("SETTLE_MS", "soon")]));

        assert!(matches!(
            result,
            Err(TestbedError::InvalidConfig { name: "SETTLE_MS", value }) if value == "soon"
        ));
    }

    #[test]
    fn grace_period_applies_when_either_browser_has_quirk() {
        let config = Config::from_lookup(|_| None).expect("Should build default config");

        assert_eq!(
            config.grace_period(Browser::Chrome, Browser::MicrosoftEdge),
            Duration::from_secs(2)
        );
        assert_eq!(
            config.grace_period(Browser::Chrome, Browser::Firefox),
            Duration::ZERO
        );
    }

    #[test]
    fn reads_browser_selection() {
        let config = Config::from_lookup(lookup_from(&[(
            "TESTBED_BROWSERS",
            "chrome, MicrosoftEdge",
        )]))
        .expect("Should build config");

        assert_eq!(
            config.browsers,
            Some(vec![Browser::Chrome, Browser::MicrosoftEdge])
        );
        assert!(config.allows(Browser::Chrome));
        assert!(!config.allows(Browser::Firefox));
    }

    #[test]
    fn rejects_unknown_browser_names() {
        let result = Config::from_lookup(lookup_from(&[("TESTBED_BROWSERS", "chrome,opera")]));

        assert!(matches!(
            result,
            Err(TestbedError::UnsupportedBrowser(name)) if name == "opera"
        ));
    }
}
