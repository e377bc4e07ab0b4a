//! Per-device playback tuning: chunk budget, keep-alive cadence and retry
//! delays.

use std::time::Duration;

use crate::config::DeviceSetting;

/// How the keep-alive tick nudges the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveStrategy {
    /// Queue a silent, maximum-rate utterance without touching the current one.
    SilentUtterance,
    /// Pause and immediately resume the engine.
    PauseResume,
}

/// Characteristics of the playback target that affect synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    pub ios: bool,
    pub mobile: bool,
    pub chrome: bool,
}

impl DeviceProfile {
    pub const DESKTOP: Self = Self {
        ios: false,
        mobile: false,
        chrome: false,
    };

    /// Classify a browser-style user agent string.
    pub fn from_user_agent(ua: &str) -> Self {
        let ios = ["iPad", "iPhone", "iPod"].iter().any(|d| ua.contains(d));
        let mobile = ua.contains("Android") || ua.to_lowercase().contains("mobi");
        let chrome = ua.contains("Chrome") && !ua.contains("Edg") && !ua.contains("OPR");
        Self { ios, mobile, chrome }
    }

    /// Profile of the machine this binary runs on.
    pub fn detect() -> Self {
        let ios = cfg!(target_os = "ios");
        Self {
            ios,
            mobile: ios || cfg!(target_os = "android"),
            chrome: false,
        }
    }

    pub fn from_setting(setting: DeviceSetting) -> Self {
        match setting {
            DeviceSetting::Auto => Self::detect(),
            DeviceSetting::Ios => Self {
                ios: true,
                mobile: true,
                chrome: false,
            },
            DeviceSetting::Mobile => Self {
                ios: false,
                mobile: true,
                chrome: false,
            },
            DeviceSetting::Chrome => Self {
                ios: false,
                mobile: false,
                chrome: true,
            },
            DeviceSetting::Desktop => Self::DESKTOP,
        }
    }

    /// Default chunk budget in characters.
    pub fn chunk_length(&self) -> usize {
        if self.ios || self.mobile {
            500
        } else if self.chrome {
            600
        } else {
            700
        }
    }

    pub fn keep_alive_interval(&self) -> Duration {
        let mut ms: u64 = if self.ios {
            400
        } else if self.mobile {
            600
        } else {
            800
        };
        if self.chrome {
            ms = ms.saturating_sub(200).max(300);
        }
        Duration::from_millis(ms)
    }

    /// Second, offset keep-alive tick. Only Chrome-like engines get one.
    pub fn staggered_keep_alive_interval(&self) -> Option<Duration> {
        self.chrome.then(|| self.keep_alive_interval() * 3 / 2)
    }

    pub fn keep_alive_strategy(&self) -> KeepAliveStrategy {
        if self.chrome {
            KeepAliveStrategy::SilentUtterance
        } else {
            KeepAliveStrategy::PauseResume
        }
    }

    pub fn inter_chunk_delay(&self) -> Duration {
        Duration::from_millis(if self.chrome { 50 } else { 10 })
    }
}

/// Delays applied by the player between chunks and after errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    /// Wait after an "interrupted" error before retrying the chunk.
    pub interrupted_retry: Duration,
    /// Wait after resetting a busy engine before retrying the chunk.
    pub busy_retry: Duration,
    /// Wait before skipping a chunk that failed for any other reason.
    pub skip_delay: Duration,
    pub inter_chunk: Duration,
}

impl PlaybackTiming {
    pub fn for_profile(profile: &DeviceProfile) -> Self {
        Self {
            interrupted_retry: Duration::from_millis(500),
            busy_retry: Duration::from_millis(300),
            skip_delay: Duration::from_millis(150),
            inter_chunk: profile.inter_chunk_delay(),
        }
    }

    /// No delays at all; used by tests.
    pub fn immediate() -> Self {
        Self {
            interrupted_retry: Duration::ZERO,
            busy_retry: Duration::ZERO,
            skip_delay: Duration::ZERO,
            inter_chunk: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
