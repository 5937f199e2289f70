use crate::duplicacy::notifications::smtp::SmtpNotificationConfig;
use crate::duplicacy::report::{Outcome, RunReport};
use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::result_error::result::{convert_error_vec, Result};
use crate::duplicacy::result_error::WithMsg;
use crate::duplicacy::runner::RunContext;
use derive_more::From;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::result;
use std::time::Duration;
use validator::{Validate, ValidationErrors};

pub mod smtp;

#[derive(Clone, From, Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum NotificationConfig {
    Smtp(SmtpNotificationConfig),
}

impl Validate for NotificationConfig {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        match self {
            Self::Smtp(inner) => inner.validate(),
        }
    }
}

impl Notification for NotificationConfig {
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
        match self {
            Self::Smtp(inner) => inner.send(topic, msg),
        }
    }
}

pub trait Notification {
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()>;
}

/// Receives the milestones of a run.
pub trait RunNotifier {
    fn notify_start(&self) -> Result<()>;

    fn notify_success(&self, ctx: &RunContext, elapsed: Duration) -> Result<()>;

    fn notify_failure(&self, ctx: &RunContext, error: &Error) -> Result<()>;
}

/// Sends run reports to every configured channel.
pub struct Notifications<'a, N> {
    config_name: &'a str,
    channels: &'a [N],
}

impl<'a, N: Notification> Notifications<'a, N> {
    pub fn new(config_name: &'a str, channels: &'a [N]) -> Self {
        Self {
            config_name,
            channels,
        }
    }

    /// Every channel is tried; the failures are returned together.
    fn broadcast(&self, report: RunReport) -> Result<()> {
        let topic = report.topic();
        let errors = self
            .channels
            .iter()
            .filter_map(|channel| {
                channel
                    .send(&topic, &report)
                    .with_msg(format!("Failed to send notification {topic:?}"))
                    .err()
            })
            .collect();
        convert_error_vec(errors)
    }
}

impl<N: Notification> RunNotifier for Notifications<'_, N> {
    fn notify_start(&self) -> Result<()> {
        self.broadcast(RunReport::new(self.config_name, None, Outcome::Started))
    }

    fn notify_success(&self, ctx: &RunContext, elapsed: Duration) -> Result<()> {
        self.broadcast(RunReport::new(
            self.config_name,
            Some(ctx),
            Outcome::Succeeded(elapsed),
        ))
    }

    fn notify_failure(&self, ctx: &RunContext, error: &Error) -> Result<()> {
        self.broadcast(RunReport::new(
            self.config_name,
            Some(ctx),
            Outcome::Failed(error),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder {
        sent: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl Recorder {
        fn new(fail: bool) -> Self {
            Self {
                sent: RefCell::default(),
                fail,
            }
        }
    }

    impl Notification for Recorder {
        fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((topic.to_string(), msg.to_string()));
            if self.fail {
                Err(Error::SmtpSendError("550 mailbox unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_every_channel_receives_report() {
        let channels = [Recorder::new(false), Recorder::new(false)];
        let notifications = Notifications::new("nightly", &channels);

        notifications.notify_start().unwrap();
        notifications
            .notify_success(&RunContext::new(), Duration::from_secs(3))
            .unwrap();

        for channel in &channels {
            let sent = channel.sent.borrow();
            assert_eq!(sent.len(), 2);
            assert_eq!(sent[0].0, "nightly backup started");
            assert_eq!(sent[1].0, "nightly backup succeeded");
        }
    }

    #[test]
    fn test_channel_failures_are_aggregated() {
        let channels = [Recorder::new(true), Recorder::new(false), Recorder::new(true)];
        let notifications = Notifications::new("nightly", &channels);
        let cause = Error::SmtpSendError("boom".into());

        let err = notifications
            .notify_failure(&RunContext::new(), &cause)
            .unwrap_err();

        match err {
            Error::LotsOfError(errors) => assert_eq!(errors.len(), 2),
            other => panic!("Expected LotsOfError, got {other:?}"),
        }
        assert_eq!(channels[1].sent.borrow()[0].0, "nightly backup FAILED");
    }

    #[test]
    fn test_no_channels_is_fine() {
        let channels: [NotificationConfig; 0] = [];
        assert!(Notifications::new("nightly", &channels).notify_start().is_ok());
    }

    #[test]
    fn test_notification_config_from_yaml() {
        let config: NotificationConfig = serde_yml::from_str(
            r#"
type: smtp
host: smtp.example.com
smtp_mode: StartTls
from: backup@example.com
to: [ops@example.com]
username: backup
password: secret
"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        let NotificationConfig::Smtp(smtp) = config;
        assert_eq!(smtp.host(), "smtp.example.com");
    }
}
