use chrono::{DateTime, Utc};

/// Uniform face the reaper sees over every expiring store.
#[async_trait::async_trait]
pub trait Sweep: Send + Sync {
    /// Label used in reaper log lines.
    fn name(&self) -> &'static str;

    /// Remove entries dead as of `now`; return how many went.
    async fn sweep(&self, now: DateTime<Utc>) -> anyhow::Result<usize>;
}
