//! Run reports delivered as plain text mail.

use crate::duplicacy::function_path;
use crate::duplicacy::notifications::Notification;
use crate::duplicacy::redacted::RedactedString;
use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::result_error::result::Result;
use crate::duplicacy::result_error::{WithDebugObjectAndFnName, WithMsg};
use bon::Builder;
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Response;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info};
use validator::Validate;

/// One mail channel: every report goes to all of `to`.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct SmtpNotificationConfig {
    #[validate(length(min = 1))]
    #[builder(into)]
    host: String,
    #[builder(into)]
    smtp_mode: SmtpMode,
    #[builder(into)]
    from: Mailbox,
    #[validate(length(min = 1))]
    #[builder(into)]
    to: Vec<Mailbox>,
    #[builder(into)]
    username: String,
    #[validate(nested)]
    #[builder(into)]
    password: RedactedString,
}

/// How the connection to `host` is secured. `Unsecured` talks plain SMTP and
/// is meant for local relays.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SmtpMode {
    Unsecured,
    Ssl,
    StartTls,
}

impl SmtpNotificationConfig {
    /// The report topic becomes the subject, the rendered report the body.
    fn message(&self, subject: String, body: String) -> Result<Message> {
        self.to
            .iter()
            .cloned()
            .fold(Message::builder().from(self.from.clone()), |builder, rcpt| {
                builder.to(rcpt)
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(Error::from)
            .with_msg(format!("Failed to compose run report for {:?}", self.to))
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let builder = match self.smtp_mode {
            SmtpMode::Unsecured => Ok(SmtpTransport::builder_dangerous(self.host.as_str())),
            SmtpMode::Ssl => SmtpTransport::relay(self.host.as_str()),
            SmtpMode::StartTls => SmtpTransport::starttls_relay(self.host.as_str()),
        }
        .map_err(Error::from)
        .with_msg(format!(
            "Failed to reach mail relay {:?} ({:?})",
            self.host, self.smtp_mode
        ))?;

        let credentials = Credentials::new(self.username.clone(), self.password.expose().to_owned());
        Ok(builder.credentials(credentials).build())
    }
}

/// Turns a negative relay reply into one error per reply line.
fn accepted(response: Response) -> Result<()> {
    if response.is_positive() {
        return Ok(());
    }
    let mut errors = response
        .message()
        .map(|line| Error::SmtpSendError(format!("{} {}", response.code(), line)))
        .collect_vec();
    Err(match errors.len() {
        0 => Error::SmtpSendError(response.code().to_string()),
        1 => errors.remove(0),
        _ => errors.into(),
    })
}

impl Notification for SmtpNotificationConfig {
    #[named]
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
        let subject = topic.to_string();
        info!("Mailing {:?} to {} recipient(s) via {}", subject, self.to.len(), self.host);

        let message = self
            .message(subject, msg.to_string())
            .with_debug_object_and_fn_name(self.host.clone(), function_path!())?;
        let response = self
            .transport()
            .and_then(|mailer| mailer.send(&message).map_err(Error::from))
            .with_debug_object_and_fn_name(self.host.clone(), function_path!())?;

        debug!("Mail relay {} answered {}", self.host, response.code());
        accepted(response)
    }
}
