use crate::model::{Endpoint, HostResult, ProbeOutcome, TlsVersion};
use crate::probe::Prober;
use std::time::Duration;
use tracing::{debug, warn};

/// Probes every TLS version for one host, oldest first, one connection at a time.
///
/// A specification that does not parse still yields a full record: each
/// version is marked as a connection failure carrying the parse error.
pub async fn probe_host<P>(prober: &P, spec: &str, timeout: Duration) -> HostResult
where
    P: Prober + ?Sized,
{
    let mut result = HostResult::new(spec.trim());

    let endpoint = match Endpoint::parse(spec) {
        Ok(endpoint) => endpoint,
        Err(err) => {
            warn!(host = %spec, error = %err, "unusable host specification");
            for version in TlsVersion::ALL {
                result.record(version, ProbeOutcome::ConnectionFailed(err.to_string()));
            }
            return result;
        }
    };

    for version in TlsVersion::ALL {
        let outcome = prober.probe(&endpoint, version, timeout).await;
        result.record(version, outcome);
    }

    debug!(
        host = %result.host,
        tls10 = result.tls10.symbol(),
        tls11 = result.tls11.symbol(),
        tls12 = result.tls12.symbol(),
        tls13 = result.tls13.symbol(),
        "host probed"
    );
    result
}
