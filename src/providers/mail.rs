use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::warn;

#[async_trait]
pub(crate) trait MailSender {
    async fn send(&self, to: &str, subject: &str, html: String) -> ::anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, username: String, password: String, from: &str) -> ::anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            from: from.parse()?,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: String) -> ::anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Logs instead of sending. Backs the in-memory wiring used for local runs.
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: String) -> ::anyhow::Result<()> {
        tracing::info!(to, subject, "mail suppressed (log transport)");
        Ok(())
    }
}

/// Transactional sends. Fire-and-forget: a transport failure is logged and
/// never fails the calling request.
#[derive(Clone)]
pub struct Mails {
    sender: Arc<dyn MailSender + Sync + Send>,
    public_url: String,
}

impl Mails {
    pub fn new(sender: Arc<dyn MailSender + Sync + Send>, public_url: String) -> Self {
        Self { sender, public_url }
    }

    pub async fn send_verification(&self, username: &str, email: &str, token: &str) {
        let subject = format!("{}, confirm your account", username);
        let html = format!(
            "<div>\
             <p>Welcome {username}!</p>\
             <p>You can confirm your account email through the link below:</p>\
             <p><a href=\"{url}/api/v2/auth/confirmation_token?token={token}\">Confirm my account</a></p>\
             </div>",
            username = username,
            url = self.public_url,
            token = token,
        );

        if let Err(e) = self.sender.send(email, &subject, html).await {
            warn!("verification mail to {} failed: {}", email, e);
        }
    }

    pub async fn send_destroy_account(&self, username: &str, email: &str, token: &str) {
        let html = format!(
            "<div>\
             <p>Hi {username},</p>\
             <p>Your account deletion was requested. Please, visit \
             <a href=\"{url}/api/v2/users/confirm_destroy?token={token}\">this page</a> \
             to destroy your account. The link will expire in 12 hours.</p>\
             <p>If you didn't request this, you can safely ignore this email.</p>\
             </div>",
            username = username,
            url = self.public_url,
            token = token,
        );

        if let Err(e) = self
            .sender
            .send(email, "Account Deletion Requested", html)
            .await
        {
            warn!("destroy-account mail to {} failed: {}", email, e);
        }
    }

    pub async fn send_forgot_password(&self, email: &str, token: &str) {
        let html = format!(
            "<div>\
             <p>Hello <a href=\"mailto:{email}\">{email}</a>!</p>\
             <p>Someone has requested a link to change your password. \
             You can do this through the link below.</p>\
             <p><a href=\"{url}/api/v2/auth/reset-password?token={token}\">Change my password</a></p>\
             <p>If you didn't request this, please ignore this email. \
             Your password won't change until you access the link above and create a new one.</p>\
             </div>",
            email = email,
            url = self.public_url,
            token = token,
        );

        if let Err(e) = self
            .sender
            .send(email, "Reset password instructions", html)
            .await
        {
            warn!("forgot-password mail to {} failed: {}", email, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct SentMail {
        pub to: String,
        pub subject: String,
    }

    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<SentMail>>,
    }

    #[async_trait]
    impl MailSender for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, _html: String) -> ::anyhow::Result<()> {
            self.sent.lock().await.push(SentMail {
                to: to.to_owned(),
                subject: subject.to_owned(),
            });
            Ok(())
        }
    }
}
