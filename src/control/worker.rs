//! Control loop consumer and the health-check-and-sync cycle.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::UpsertPolicy;
use crate::control::{ControlSignal, CycleOutcome, SyncError};
use crate::health::{HealthProbe, HealthStatus};
use crate::observability::metrics;
use crate::registry::{Registration, Registry, RegistryError};

/// Drives the registry entry from probe results.
///
/// Cheap to clone; every spawn of the loop gets its own handle to the same
/// read-only registration, probe and registry.
#[derive(Clone)]
pub struct ControlLoop {
    registration: Arc<Registration>,
    healthcheck_url: Arc<str>,
    probe: Arc<dyn HealthProbe>,
    registry: Arc<dyn Registry>,
    policy: UpsertPolicy,
}

impl ControlLoop {
    pub fn new(
        registration: Registration,
        probe: Arc<dyn HealthProbe>,
        registry: Arc<dyn Registry>,
        policy: UpsertPolicy,
    ) -> Self {
        let healthcheck_url = registration.healthcheck_url().into();
        Self {
            registration: Arc::new(registration),
            healthcheck_url,
            probe,
            registry,
            policy,
        }
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Run one cycle per `Cycle` until `Stop` arrives or the channel closes.
    ///
    /// On a clean stop the receiver is handed back so a later loop can keep
    /// consuming the same ticker. A registry error ends the loop early.
    pub async fn run(
        self,
        mut control: mpsc::Receiver<ControlSignal>,
    ) -> Result<mpsc::Receiver<ControlSignal>, SyncError> {
        let key = &self.registration.key;
        tracing::info!(key = %key, policy = ?self.policy, "Control loop started");

        let mut last = None;
        while let Some(signal) = control.recv().await {
            if signal == ControlSignal::Stop {
                tracing::info!(key = %key, "Control loop stopping");
                break;
            }

            let outcome = self.cycle().await?;
            match (last, outcome) {
                (Some(CycleOutcome::Removed), CycleOutcome::Removed) => {}
                (None | Some(CycleOutcome::Removed), CycleOutcome::Upserted) => {
                    tracing::info!(key = %key, target = %self.registration.target, "Healthy, registered");
                }
                (_, CycleOutcome::Removed) => {
                    tracing::info!(key = %key, "Unhealthy, deregistered");
                }
                _ => {}
            }
            last = Some(outcome);
        }

        Ok(control)
    }

    /// Probe once and sync the registry with the result.
    pub async fn cycle(&self) -> Result<CycleOutcome, SyncError> {
        let status = self.probe.probe(&self.healthcheck_url).await;
        metrics::record_health(status);

        let outcome = match status {
            HealthStatus::Healthy => self.on_healthy().await?,
            HealthStatus::Unhealthy => {
                self.remove().await?;
                CycleOutcome::Removed
            }
        };

        metrics::record_cycle(outcome);
        tracing::debug!(
            key = %self.registration.key,
            status = ?status,
            outcome = outcome.as_str(),
            "Cycle complete"
        );
        Ok(outcome)
    }

    /// Remove the entry without consulting health.
    pub async fn deregister(&self) -> Result<(), SyncError> {
        self.remove().await
    }

    async fn on_healthy(&self) -> Result<CycleOutcome, SyncError> {
        if self.policy == UpsertPolicy::CompareUrl {
            let lookup = self.registry.get_server(&self.registration.key).await;
            metrics::record_registry_op("get_server", lookup.is_ok());
            match lookup {
                Ok(Some(entry)) if entry.url == self.registration.target => {
                    return Ok(CycleOutcome::Unchanged);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(key = %self.registration.key, error = %e, "Lookup failed, rewriting entry");
                }
            }
        }

        self.upsert().await?;
        Ok(CycleOutcome::Upserted)
    }

    async fn upsert(&self) -> Result<(), SyncError> {
        let registration = &self.registration;
        let result = self
            .registry
            .upsert_server(&registration.key, &registration.target, registration.ttl)
            .await;
        record("upsert_server", result)
    }

    async fn remove(&self) -> Result<(), SyncError> {
        let result = self.registry.remove_server(&self.registration.key).await;
        record("remove_server", result)
    }
}

fn record<T>(operation: &'static str, result: Result<T, RegistryError>) -> Result<T, SyncError> {
    metrics::record_registry_op(operation, result.is_ok());
    result.map_err(|source| SyncError { operation, source })
}
