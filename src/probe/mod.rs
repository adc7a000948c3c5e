mod tls;

use crate::model::{Endpoint, ProbeOutcome, TlsVersion};
use async_trait::async_trait;
use std::time::Duration;

pub use tls::OpensslProber;

/// One handshake attempt against `endpoint`, restricted to exactly `version`.
///
/// Implementations never fail: every error is folded into the returned
/// [`ProbeOutcome`], and no attempt is retried.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint, version: TlsVersion, timeout: Duration)
        -> ProbeOutcome;
}
