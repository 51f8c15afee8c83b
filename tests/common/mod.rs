//! Shared fakes and mock servers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

use register_vulcan::config::UpsertPolicy;
use register_vulcan::control::ControlLoop;
use register_vulcan::health::{HealthProbe, HealthStatus};
use register_vulcan::registry::{
    Registration, RegistrationKey, Registry, RegistryError, ServerEntry,
};

pub const TARGET: &str = "http://10.0.0.5:8080";

pub fn registration() -> Registration {
    Registration {
        key: RegistrationKey {
            backend_id: "b1".into(),
            server_id: "s1".into(),
        },
        target: TARGET.into(),
        ttl: Duration::from_secs(11),
    }
}

pub fn control_loop(
    probe: Arc<ScriptedProbe>,
    registry: Arc<RecordingRegistry>,
    policy: UpsertPolicy,
) -> ControlLoop {
    ControlLoop::new(registration(), probe, registry, policy)
}

/// Start a programmable HTTP backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                // Drain the request head before answering.
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;

                let (status, body) = f().await;
                let reason = match status {
                    200 => "OK",
                    204 => "No Content",
                    301 => "Moved Permanently",
                    404 => "Not Found",
                    500 => "Internal Server Error",
                    503 => "Service Unavailable",
                    _ => "Unknown",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Probe that replays a script of statuses, then repeats `fallback`.
pub struct ScriptedProbe {
    script: Mutex<VecDeque<HealthStatus>>,
    fallback: Mutex<HealthStatus>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn always(status: HealthStatus) -> Arc<Self> {
        Self::scripted(Vec::new(), status)
    }

    pub fn scripted(script: Vec<HealthStatus>, fallback: HealthStatus) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: Mutex::new(fallback),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, status: HealthStatus) {
        *self.fallback.lock().unwrap() = status;
    }

    pub fn probe_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self, url: &str) -> HealthStatus {
        self.urls.lock().unwrap().push(url.to_string());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| *self.fallback.lock().unwrap())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get,
    Upsert {
        server_id: String,
        backend_id: String,
        url: String,
        ttl: Duration,
    },
    Remove {
        server_id: String,
        backend_id: String,
    },
}

impl Call {
    pub fn upsert(server_id: &str, backend_id: &str, url: &str, ttl: Duration) -> Self {
        Call::Upsert {
            server_id: server_id.into(),
            backend_id: backend_id.into(),
            url: url.into(),
            ttl,
        }
    }

    pub fn remove(server_id: &str, backend_id: &str) -> Self {
        Call::Remove {
            server_id: server_id.into(),
            backend_id: backend_id.into(),
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Call::Get)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: Call,
    pub started: Instant,
    pub finished: Instant,
}

/// In-memory registry that records every call with timestamps.
///
/// Each call sleeps for `delay` while counted as in flight, so overlapping
/// calls show up in `max_in_flight`.
#[derive(Default)]
pub struct RecordingRegistry {
    calls: Mutex<Vec<RecordedCall>>,
    entry: Mutex<Option<ServerEntry>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_upsert: AtomicBool,
    fail_remove: AtomicBool,
}

impl RecordingRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Default::default()
        })
    }

    pub fn fail_upserts(&self) {
        self.fail_upsert.store(true, Ordering::SeqCst);
    }

    pub fn fail_removes(&self) {
        self.fail_remove.store(true, Ordering::SeqCst);
    }

    /// Pretend another writer changed the stored entry.
    pub fn set_entry(&self, url: &str) {
        *self.entry.lock().unwrap() = Some(ServerEntry {
            id: "s1".into(),
            url: url.into(),
        });
    }

    pub fn entry(&self) -> Option<ServerEntry> {
        self.entry.lock().unwrap().clone()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.recorded().into_iter().map(|r| r.call).collect()
    }

    /// Upserts and removes, without lookups.
    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn upserts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Upsert { .. }))
            .count()
    }

    pub fn removes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Remove { .. }))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: Call) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let finished = Instant::now();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            call,
            started,
            finished,
        });
    }
}

fn injected_failure() -> RegistryError {
    RegistryError::Rejected {
        status: 500,
        message: "injected failure".into(),
    }
}

#[async_trait]
impl Registry for RecordingRegistry {
    async fn get_server(&self, _key: &RegistrationKey) -> Result<Option<ServerEntry>, RegistryError> {
        self.record(Call::Get).await;
        Ok(self.entry())
    }

    async fn upsert_server(
        &self,
        key: &RegistrationKey,
        url: &str,
        ttl: Duration,
    ) -> Result<(), RegistryError> {
        self.record(Call::upsert(&key.server_id, &key.backend_id, url, ttl))
            .await;
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        *self.entry.lock().unwrap() = Some(ServerEntry {
            id: key.server_id.clone(),
            url: url.into(),
        });
        Ok(())
    }

    async fn remove_server(&self, key: &RegistrationKey) -> Result<(), RegistryError> {
        self.record(Call::remove(&key.server_id, &key.backend_id))
            .await;
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        *self.entry.lock().unwrap() = None;
        Ok(())
    }
}
