use lettre::message::{Mailbox, header::ContentType};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::Contact;

pub const SUBJECT: &str = "AutoChronoGG: cookie rejected";
pub const BODY: &str = "The chrono.gg server rejected the stored cookie, so today's coin was not claimed.\n\
\n\
Log in to https://chrono.gg/, copy document.cookie from the browser console and run AutoChronoGG once with it as the argument. \
It will be remembered for the following runs.\n";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub trait Notifier {
    async fn send_notification(
        &self,
        recipients: &[Contact],
        subject: &str,
        body: &str,
        sender: &Contact,
        relay_host: &str,
    ) -> Result<(), NotifyError>;
}

/// Plain SMTP relay on port 25, no TLS and no authentication.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpNotifier;

impl Notifier for SmtpNotifier {
    async fn send_notification(
        &self,
        recipients: &[Contact],
        subject: &str,
        body: &str,
        sender: &Contact,
        relay_host: &str,
    ) -> Result<(), NotifyError> {
        let message = build_message(recipients, subject, body, sender)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(relay_host).build();
        mailer.send(message).await?;
        tracing::info!(relay = relay_host, recipients = recipients.len(), "notification sent");
        Ok(())
    }
}

fn build_message(
    recipients: &[Contact],
    subject: &str,
    body: &str,
    sender: &Contact,
) -> Result<Message, NotifyError> {
    let mut builder = Message::builder()
        .from(mailbox(sender)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN);
    for recipient in recipients {
        builder = builder.to(mailbox(recipient)?);
    }
    Ok(builder.body(body.to_string())?)
}

fn mailbox(contact: &Contact) -> Result<Mailbox, NotifyError> {
    let address: Address = contact.address.trim().parse()?;
    let name = Some(contact.name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok(Mailbox::new(name, address))
}
