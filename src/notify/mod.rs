pub mod templates;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gateway::GatePassGateway;
use crate::models::{Item, Stage, UserProfile};

/// Mail payload handed to the backend's mail endpoint. Delivery itself is the
/// backend's concern; the client only triggers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// ✅ **Best-effort notification mailer**
///
/// Every send is a side channel: a failure surfaces as a warning on the
/// action report and never rolls back the primary action. A recipient with no
/// email address is the degraded path, not an error: the notice is skipped.
pub struct Mailer {
    gateway: Arc<dyn GatePassGateway>,
}

impl Mailer {
    pub fn new(gateway: Arc<dyn GatePassGateway>) -> Self {
        Self { gateway }
    }

    pub async fn send_approval_notice(
        &self,
        recipient: &UserProfile,
        reference_no: &str,
        stage: Stage,
        comment: Option<&str>,
    ) -> Option<String> {
        let email = self.recipient_email(recipient)?;
        let body = match templates::render_approval(reference_no, stage, &recipient.name, comment)
        {
            Ok(body) => body,
            Err(err) => return Some(render_warning(reference_no, err)),
        };
        self.dispatch(MailMessage {
            to: email,
            subject: format!("Gate pass {reference_no} approved by {}", stage.label()),
            html_body: body,
        })
        .await
    }

    pub async fn send_rejection_notice(
        &self,
        recipient: &UserProfile,
        reference_no: &str,
        stage: Stage,
        comment: &str,
    ) -> Option<String> {
        let email = self.recipient_email(recipient)?;
        let body =
            match templates::render_rejection(reference_no, stage, &recipient.name, comment) {
                Ok(body) => body,
                Err(err) => return Some(render_warning(reference_no, err)),
            };
        self.dispatch(MailMessage {
            to: email,
            subject: format!("Gate pass {reference_no} rejected by {}", stage.label()),
            html_body: body,
        })
        .await
    }

    pub async fn send_return_notice(
        &self,
        recipient: &UserProfile,
        reference_no: &str,
        items: &[&Item],
    ) -> Option<String> {
        let email = self.recipient_email(recipient)?;
        let body = match templates::render_returns(reference_no, &recipient.name, items) {
            Ok(body) => body,
            Err(err) => return Some(render_warning(reference_no, err)),
        };
        self.dispatch(MailMessage {
            to: email,
            subject: format!("Gate pass {reference_no}: items returned"),
            html_body: body,
        })
        .await
    }

    fn recipient_email(&self, recipient: &UserProfile) -> Option<String> {
        match recipient.email.as_deref() {
            Some(email) if !email.is_empty() => Some(email.to_string()),
            _ => {
                tracing::debug!(
                    service_no = %recipient.service_no,
                    "Recipient has no email address, skipping notice"
                );
                None
            }
        }
    }

    async fn dispatch(&self, mail: MailMessage) -> Option<String> {
        match self.gateway.send_mail(&mail).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(to = %mail.to, error = %err, "Notification mail failed");
                Some(format!("Notification email to {} could not be sent", mail.to))
            }
        }
    }
}

fn render_warning(reference_no: &str, err: crate::errors::GatePassError) -> String {
    tracing::warn!(reference_no, error = %err, "Notification template failed to render");
    format!("Notification for {reference_no} could not be rendered")
}
