pub mod host;

use crate::model::{HostResult, ScanResults};
use crate::probe::{OpensslProber, Prober};
use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Probes every host in its own task and gathers one [`HostResult`] per host.
pub struct Scanner<P = OpensslProber> {
    prober: Arc<P>,
    limit: Option<Arc<Semaphore>>,
}

impl Default for Scanner<OpensslProber> {
    fn default() -> Self {
        Self::new(OpensslProber)
    }
}

impl<P: Prober + 'static> Scanner<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            limit: None,
        }
    }

    /// Caps how many hosts are probed at once. Every host still gets its own task.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.limit = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    /// Results come back sorted by host, whatever order the tasks finish in.
    #[instrument(skip_all, fields(hosts = hosts.len(), timeout = ?timeout))]
    pub async fn run(&self, hosts: &[String], timeout: Duration) -> ScanResults {
        let started_at = Utc::now();
        if hosts.is_empty() {
            return ScanResults {
                started_at,
                finished_at: Utc::now(),
                hosts: Vec::new(),
            };
        }

        let mut tasks = FuturesUnordered::new();
        for spec in hosts {
            let prober = self.prober.clone();
            let limit = self.limit.clone();
            let task_spec = spec.clone();
            let handle = tokio::spawn(async move {
                let _permit = match limit {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                host::probe_host(prober.as_ref(), &task_spec, timeout).await
            });

            let spec = spec.clone();
            tasks.push(async move {
                handle.await.unwrap_or_else(|err| {
                    warn!(host = %spec, error = %err, "probe task did not complete");
                    HostResult::failed(spec.trim(), format!("probe task failed: {err}"))
                })
            });
        }

        let mut results = Vec::with_capacity(hosts.len());
        while let Some(result) = tasks.next().await {
            debug!(host = %result.host, done = results.len() + 1, "host finished");
            results.push(result);
        }

        results.sort_by(|a, b| a.host.cmp(&b.host));
        ScanResults {
            started_at,
            finished_at: Utc::now(),
            hosts: results,
        }
    }
}

/// Scans `hosts` with the OpenSSL prober and no concurrency cap.
pub async fn scan(hosts: &[String], timeout: Duration) -> ScanResults {
    Scanner::new(OpensslProber).run(hosts, timeout).await
}
