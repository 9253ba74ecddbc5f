//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;
use crate::domain::session::UserSession;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_UPLOAD_RETRIES: u32 = 3;
pub const DEFAULT_VIDEO_DEVICE: &str = "/dev/video0";
pub const DEFAULT_AUDIO_SOURCE: &str = "default";

/// Capture device configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub video_device: Option<String>,
    pub audio_source: Option<String>,
}

/// Identity of the candidate taking the interview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub linkedin: Option<String>,
    pub token: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url: Option<String>,
    pub max_duration: Option<String>,
    pub poll_max_attempts: Option<u32>,
    pub poll_interval: Option<String>,
    pub upload_retries: Option<u32>,
    pub upload_backoff: Option<String>,
    pub allow_skip: Option<bool>,
    pub notify: Option<bool>,
    pub capture: Option<CaptureConfig>,
    pub user: Option<UserConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            backend_url: Some(DEFAULT_BACKEND_URL.to_string()),
            max_duration: Some(Duration::default_max_recording().to_string()),
            poll_max_attempts: Some(DEFAULT_POLL_MAX_ATTEMPTS),
            poll_interval: Some(Duration::default_poll_interval().to_string()),
            upload_retries: Some(DEFAULT_UPLOAD_RETRIES),
            upload_backoff: Some(Duration::default_upload_backoff().to_string()),
            allow_skip: Some(false),
            notify: Some(false),
            capture: Some(CaptureConfig {
                video_device: Some(DEFAULT_VIDEO_DEVICE.to_string()),
                audio_source: Some(DEFAULT_AUDIO_SOURCE.to_string()),
            }),
            user: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            backend_url: other.backend_url.or(self.backend_url),
            max_duration: other.max_duration.or(self.max_duration),
            poll_max_attempts: other.poll_max_attempts.or(self.poll_max_attempts),
            poll_interval: other.poll_interval.or(self.poll_interval),
            upload_retries: other.upload_retries.or(self.upload_retries),
            upload_backoff: other.upload_backoff.or(self.upload_backoff),
            allow_skip: other.allow_skip.or(self.allow_skip),
            notify: other.notify.or(self.notify),
            capture: Self::merge_capture(self.capture, other.capture),
            user: Self::merge_user(self.user, other.user),
        }
    }

    fn merge_capture(
        base: Option<CaptureConfig>,
        other: Option<CaptureConfig>,
    ) -> Option<CaptureConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CaptureConfig {
                video_device: o.video_device.or(b.video_device),
                audio_source: o.audio_source.or(b.audio_source),
            }),
        }
    }

    fn merge_user(base: Option<UserConfig>, other: Option<UserConfig>) -> Option<UserConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(UserConfig {
                id: o.id.or(b.id),
                name: o.name.or(b.name),
                email: o.email.or(b.email),
                role: o.role.or(b.role),
                linkedin: o.linkedin.or(b.linkedin),
                token: o.token.or(b.token),
            }),
        }
    }

    pub fn backend_url_or_default(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_recording)
    }

    pub fn poll_max_attempts_or_default(&self) -> u32 {
        self.poll_max_attempts
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_POLL_MAX_ATTEMPTS)
    }

    pub fn poll_interval_or_default(&self) -> Duration {
        self.poll_interval
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_poll_interval)
    }

    pub fn upload_retries_or_default(&self) -> u32 {
        self.upload_retries
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_UPLOAD_RETRIES)
    }

    pub fn upload_backoff_or_default(&self) -> Duration {
        self.upload_backoff
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_upload_backoff)
    }

    /// Get allow_skip setting, or false if not set
    pub fn allow_skip_or_default(&self) -> bool {
        self.allow_skip.unwrap_or(false)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    pub fn video_device_or_default(&self) -> &str {
        self.capture
            .as_ref()
            .and_then(|c| c.video_device.as_deref())
            .unwrap_or(DEFAULT_VIDEO_DEVICE)
    }

    pub fn audio_source_or_default(&self) -> &str {
        self.capture
            .as_ref()
            .and_then(|c| c.audio_source.as_deref())
            .unwrap_or(DEFAULT_AUDIO_SOURCE)
    }

    /// Build the user session, if a user id is configured
    pub fn user_session(&self) -> Option<UserSession> {
        let user = self.user.as_ref()?;
        let id = user.id.as_deref().filter(|id| !id.trim().is_empty())?;
        Some(UserSession {
            user_id: id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            linkedin: user.linkedin.clone(),
            access_token: user.token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:3001"));
        assert_eq!(config.max_duration.as_deref(), Some("2m"));
        assert_eq!(config.poll_interval.as_deref(), Some("3s"));
        assert_eq!(config.upload_backoff.as_deref(), Some("1s"));
        assert_eq!(config.poll_max_attempts, Some(30));
        assert_eq!(config.upload_retries, Some(3));
        assert_eq!(config.allow_skip, Some(false));
        assert_eq!(config.notify, Some(false));
        assert_eq!(config.video_device_or_default(), "/dev/video0");
        assert!(config.user.is_none());
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.backend_url.is_none());
        assert!(config.max_duration.is_none());
        assert!(config.capture.is_none());
        assert!(config.user.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            backend_url: Some("http://base".to_string()),
            max_duration: Some("90s".to_string()),
            allow_skip: Some(false),
            ..Default::default()
        };
        let other = AppConfig {
            backend_url: Some("http://other".to_string()),
            max_duration: None,
            allow_skip: Some(true),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.backend_url.as_deref(), Some("http://other"));
        assert_eq!(merged.max_duration.as_deref(), Some("90s"));
        assert_eq!(merged.allow_skip, Some(true));
    }

    #[test]
    fn merge_nested_sections_field_by_field() {
        let base = AppConfig {
            user: Some(UserConfig {
                id: Some("1".into()),
                token: Some("file-token".into()),
                ..Default::default()
            }),
            capture: Some(CaptureConfig {
                video_device: Some("/dev/video2".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let other = AppConfig {
            user: Some(UserConfig {
                token: Some("env-token".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        let user = merged.user.as_ref().unwrap();
        assert_eq!(user.id.as_deref(), Some("1"));
        assert_eq!(user.token.as_deref(), Some("env-token"));
        assert_eq!(merged.video_device_or_default(), "/dev/video2");
        assert_eq!(merged.audio_source_or_default(), "default");
    }

    #[test]
    fn duration_accessors_fall_back_on_invalid() {
        let config = AppConfig {
            max_duration: Some("soon".to_string()),
            poll_interval: Some("1500ms".to_string()),
            ..Default::default()
        };
        assert_eq!(config.max_duration_or_default().as_secs(), 120);
        assert_eq!(config.poll_interval_or_default().as_millis(), 1500);
        assert_eq!(config.upload_backoff_or_default().as_millis(), 1000);
    }

    #[test]
    fn zero_counts_fall_back() {
        let config = AppConfig {
            poll_max_attempts: Some(0),
            upload_retries: Some(0),
            ..Default::default()
        };
        assert_eq!(config.poll_max_attempts_or_default(), 30);
        assert_eq!(config.upload_retries_or_default(), 3);
    }

    #[test]
    fn user_session_requires_id() {
        let mut config = AppConfig::empty();
        assert!(config.user_session().is_none());

        config.user = Some(UserConfig {
            name: Some("Ana".into()),
            ..Default::default()
        });
        assert!(config.user_session().is_none());

        config.user.as_mut().unwrap().id = Some("42".into());
        let session = config.user_session().unwrap();
        assert_eq!(session.user_id, "42");
        assert_eq!(session.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn toml_round_trip_keeps_sections() {
        let config = AppConfig::defaults();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[capture]"));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
