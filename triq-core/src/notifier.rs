use async_trait::async_trait;

/// Outbound email. The SMTP implementation lives in the store crate; tests
/// and local runs use the no-op below.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Mail suppressed (noop): to=<{}> subject={:?}", to, subject);
        Ok(())
    }
}
