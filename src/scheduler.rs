use log::{debug, trace};
use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Sleep};

use crate::config::MIN_UPDATE_INTERVAL_MS;
use crate::models::{ApiTarget, SensorReading, SensorSnapshot};

/// Per-process token attached to every fetch request. Responses carrying any
/// other value belong to an earlier instance and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestIdentity(i64);

impl RequestIdentity {
    pub fn generate() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub target: ApiTarget,
    pub identity: RequestIdentity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub identity: RequestIdentity,
    pub readings: SensorSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingFirstFetch,
    Polling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Snapshot replaced and the timer re-armed with `delay`.
    Accepted { delay: Duration },
    /// Identity mismatch, nothing changed.
    Stale,
}

pub fn effective_delay(update_interval_ms: u64) -> Duration {
    Duration::from_millis(update_interval_ms.max(MIN_UPDATE_INTERVAL_MS))
}

pub struct Scheduler {
    identity: RequestIdentity,
    target: ApiTarget,
    update_interval_ms: u64,
    phase: Phase,
    snapshot: Option<SensorSnapshot>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl Scheduler {
    pub fn new(identity: RequestIdentity, target: ApiTarget, update_interval_ms: u64) -> Self {
        Self {
            identity,
            target,
            update_interval_ms,
            phase: Phase::AwaitingFirstFetch,
            snapshot: None,
            timer: None,
        }
    }

    pub fn identity(&self) -> RequestIdentity {
        self.identity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&[SensorReading]> {
        self.snapshot.as_deref()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    fn request(&self) -> FetchRequest {
        FetchRequest {
            target: self.target.clone(),
            identity: self.identity,
        }
    }

    /// Host readiness. Returns the first request if nothing has been loaded yet.
    pub fn activate(&mut self) -> Option<FetchRequest> {
        if self.snapshot.is_some() {
            debug!("Activated with data already loaded, waiting for timer");
            return None;
        }
        debug!("Activated, requesting first snapshot");
        Some(self.request())
    }

    /// Applies a response. The caller re-renders after an `Accepted` outcome.
    pub fn on_response(&mut self, response: FetchResponse) -> ResponseOutcome {
        if response.identity != self.identity {
            debug!(
                "Discarding response for identity {} (current {})",
                response.identity.raw(),
                self.identity.raw()
            );
            return ResponseOutcome::Stale;
        }

        self.timer = None;
        trace!("Snapshot replaced with {} readings", response.readings.len());
        self.snapshot = Some(response.readings);
        self.phase = Phase::Polling;

        let delay = effective_delay(self.update_interval_ms);
        self.timer = Some(Box::pin(sleep(delay)));
        debug!("Next fetch in {} s", delay.as_secs());
        ResponseOutcome::Accepted { delay }
    }

    /// Resolves when the armed timer elapses and disarms it. Never resolves while disarmed.
    pub async fn next_due(&mut self) -> FetchRequest {
        match self.timer.as_mut() {
            Some(timer) => timer.await,
            None => pending::<()>().await,
        }
        self.timer = None;
        self.request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn target() -> ApiTarget {
        ApiTarget {
            api_url: "https://network.ruuvi.com".to_string(),
            token: "token".to_string(),
            time_format: "%H:%M".to_string(),
        }
    }

    fn response(identity: RequestIdentity) -> FetchResponse {
        FetchResponse {
            identity,
            readings: vec![SensorReading::new("Sauna", 65.2, 2900.0, "12:00")],
        }
    }

    #[test]
    fn test_effective_delay_floor() {
        assert_eq!(effective_delay(30_000), Duration::from_millis(60_000));
        assert_eq!(effective_delay(60_000), Duration::from_millis(60_000));
        assert_eq!(effective_delay(600_000), Duration::from_millis(600_000));
    }

    #[test]
    fn test_activate_without_snapshot_issues_request() {
        let identity = RequestIdentity::from_raw(42);
        let mut scheduler = Scheduler::new(identity, target(), 300_000);

        let request = scheduler.activate().unwrap();

        assert_eq!(request.identity, identity);
        assert_eq!(request.target, target());
        assert_eq!(scheduler.phase(), Phase::AwaitingFirstFetch);
        assert!(!scheduler.is_armed());
    }

    #[tokio::test]
    async fn test_activate_with_snapshot_does_nothing() {
        let identity = RequestIdentity::from_raw(42);
        let mut scheduler = Scheduler::new(identity, target(), 300_000);
        scheduler.on_response(response(identity));

        assert!(scheduler.activate().is_none());
    }

    #[tokio::test]
    async fn test_stale_response_is_ignored() {
        let mut scheduler = Scheduler::new(RequestIdentity::from_raw(2), target(), 300_000);

        let outcome = scheduler.on_response(response(RequestIdentity::from_raw(1)));

        assert_eq!(outcome, ResponseOutcome::Stale);
        assert!(scheduler.snapshot().is_none());
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.phase(), Phase::AwaitingFirstFetch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_while_polling_keeps_timer() {
        let identity = RequestIdentity::from_raw(5);
        let mut scheduler = Scheduler::new(identity, target(), 60_000);
        let start = Instant::now();
        scheduler.on_response(response(identity));

        tokio::time::advance(Duration::from_secs(30)).await;
        let stale = FetchResponse {
            identity: RequestIdentity::from_raw(4),
            readings: vec![SensorReading::new("Cellar", 4.0, 3000.0, "12:30")],
        };
        let outcome = scheduler.on_response(stale);

        assert_eq!(outcome, ResponseOutcome::Stale);
        assert_eq!(scheduler.snapshot().unwrap()[0].name, "Sauna");
        assert!(scheduler.is_armed());
        assert_eq!(scheduler.phase(), Phase::Polling);

        let request = scheduler.next_due().await;
        assert_eq!(request.identity, identity);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61));
    }

    #[tokio::test]
    async fn test_accepted_response_replaces_snapshot_and_arms() {
        let identity = RequestIdentity::from_raw(7);
        let mut scheduler = Scheduler::new(identity, target(), 30_000);

        let outcome = scheduler.on_response(response(identity));
        assert_eq!(outcome, ResponseOutcome::Accepted { delay: Duration::from_secs(60) });
        assert_eq!(scheduler.phase(), Phase::Polling);
        assert!(scheduler.is_armed());

        let replacement = FetchResponse {
            identity,
            readings: vec![],
        };
        scheduler.on_response(replacement);
        assert_eq!(scheduler.snapshot(), Some(&[][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_due_waits_for_interval() {
        let identity = RequestIdentity::from_raw(7);
        let mut scheduler = Scheduler::new(identity, target(), 600_000);
        scheduler.on_response(response(identity));

        let start = Instant::now();
        let request = scheduler.next_due().await;

        assert_eq!(request.identity, identity);
        assert!(start.elapsed() >= Duration::from_secs(600));
        assert!(!scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_due_pends_while_disarmed() {
        let mut scheduler = Scheduler::new(RequestIdentity::from_raw(1), target(), 60_000);

        let result = tokio::time::timeout(Duration::from_secs(3600), scheduler.next_due()).await;

        assert!(result.is_err());
    }
}
