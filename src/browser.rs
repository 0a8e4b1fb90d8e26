use std::fmt::{Display, Formatter};

use serde_json::{json, Value};

use sdp::{munge_simulcast, SimulcastError};

use crate::error::TestbedError;

const CHROME_ARGS: [&str; 2] = [
    "--use-fake-device-for-media-stream",
    "--use-fake-ui-for-media-stream",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    MicrosoftEdge,
}

/// How a browser gets to send simulcast from a plain offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulcastStrategy {
    NativeSupport,
    RequiresMunging,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub h264: bool,
}

impl Browser {
    /// Name used in WebDriver `browserName` capabilities.
    pub fn webdriver_name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::MicrosoftEdge => "MicrosoftEdge",
        }
    }

    pub fn simulcast_strategy(&self) -> SimulcastStrategy {
        match self {
            Browser::Chrome | Browser::Safari => SimulcastStrategy::RequiresMunging,
            Browser::Firefox | Browser::MicrosoftEdge => SimulcastStrategy::NativeSupport,
        }
    }

    /// Edge can only be driven on Windows and Safari only on macOS.
    pub fn is_available(&self) -> bool {
        match self {
            Browser::MicrosoftEdge => cfg!(target_os = "windows"),
            Browser::Safari => cfg!(target_os = "macos"),
            Browser::Chrome | Browser::Firefox => true,
        }
    }

    /// W3C new session payload with fake media devices enabled.
    pub fn capabilities(&self, options: BuildOptions) -> Value {
        let mut always_match = json!({ "browserName": self.webdriver_name() });

        match self {
            Browser::Chrome => {
                always_match["goog:chromeOptions"] = json!({ "args": CHROME_ARGS });
            }
            Browser::MicrosoftEdge => {
                always_match["ms:edgeOptions"] = json!({ "args": CHROME_ARGS });
            }
            Browser::Firefox => {
                let mut prefs = json!({
                    "media.navigator.streams.fake": true,
                    "media.navigator.permission.disabled": true,
                });
                if options.h264 {
                    prefs["media.gmp-gmpopenh264.enabled"] = json!(true);
                    prefs["media.gmp-manager.updateEnabled"] = json!(true);
                }
                always_match["moz:firefoxOptions"] = json!({ "prefs": prefs });
            }
            Browser::Safari => {}
        }

        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

impl SimulcastStrategy {
    /// Local offer as it should be applied by the offering browser.
    pub fn prepare_offer(&self, sdp: &str, layers: usize) -> Result<String, SimulcastError> {
        match self {
            SimulcastStrategy::NativeSupport => Ok(sdp.to_string()),
            SimulcastStrategy::RequiresMunging => munge_simulcast(sdp, layers),
        }
    }
}

impl TryFrom<&str> for Browser {
    type Error = TestbedError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "safari" => Ok(Browser::Safari),
            "MicrosoftEdge" => Ok(Browser::MicrosoftEdge),
            _ => Err(TestbedError::UnsupportedBrowser(value.to_string())),
        }
    }
}

impl Display for Browser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
            Browser::Safari => "Safari",
            Browser::MicrosoftEdge => "Edge",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use crate::browser::{Browser, BuildOptions, SimulcastStrategy};
    use crate::error::TestbedError;

    #[test]
    fn chrome_and_safari_require_munging() {
        assert_eq!(
            Browser::Chrome.simulcast_strategy(),
            SimulcastStrategy::RequiresMunging
        );
        assert_eq!(
            Browser::Safari.simulcast_strategy(),
            SimulcastStrategy::RequiresMunging
        );
        assert_eq!(
            Browser::Firefox.simulcast_strategy(),
            SimulcastStrategy::NativeSupport
        );
        assert_eq!(
            Browser::MicrosoftEdge.simulcast_strategy(),
            SimulcastStrategy::NativeSupport
        );
    }

    #[test]
    fn native_support_leaves_offer_untouched() {
        let offer = "v=0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n";

        let prepared = SimulcastStrategy::NativeSupport
            .prepare_offer(offer, 2)
            .expect("Should pass offer through");

        assert_eq!(prepared, offer);
    }

    #[test]
    fn parses_webdriver_names() {
        for browser in [
            Browser::Chrome,
            Browser::Firefox,
            Browser::Safari,
            Browser::MicrosoftEdge,
        ] {
            let parsed = Browser::try_from(browser.webdriver_name()).expect("Should parse name");
            assert_eq!(parsed, browser);
        }

        assert!(matches!(
            Browser::try_from("opera"),
            Err(TestbedError::UnsupportedBrowser(name)) if name == "opera"
        ));
    }

    #[test]
    fn firefox_capabilities_enable_fake_media_and_h264() {
        let capabilities = Browser::Firefox.capabilities(BuildOptions { h264: true });
        let always_match = &capabilities["capabilities"]["alwaysMatch"];
        let prefs = &always_match["moz:firefoxOptions"]["prefs"];

        assert_eq!(always_match["browserName"], "firefox");
        assert_eq!(prefs["media.navigator.streams.fake"], true);
        assert_eq!(prefs["media.gmp-gmpopenh264.enabled"], true);

        let capabilities = Browser::Firefox.capabilities(BuildOptions::default());
        assert!(capabilities["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["prefs"]
            .get("media.gmp-gmpopenh264.enabled")
            .is_none());
    }

    #[test]
    fn chrome_capabilities_use_fake_devices() {
        let capabilities = Browser::Chrome.capabilities(BuildOptions::default());
        let args = &capabilities["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];

        assert_eq!(args[0], "--use-fake-device-for-media-stream");
        assert_eq!(args[1], "--use-fake-ui-for-media-stream");
    }

    #[test]
    fn cross_platform_browsers_are_always_available() {
        assert!(Browser::Chrome.is_available());
        assert!(Browser::Firefox.is_available());
        assert_eq!(
            Browser::MicrosoftEdge.is_available(),
            cfg!(target_os = "windows")
        );
    }
}
