//! Liveness and readiness probes.
//!
//! The process moves through three phases: `starting` until the listener is
//! bound, `serving` afterwards, and `draining` once a shutdown signal arrives.
//! Readiness holds only while serving; liveness fails only while draining.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
enum Phase {
    Starting = 0,
    Serving = 1,
    Draining = 2,
}

impl Phase {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            _ => Self::Draining,
        }
    }
}

#[derive(Serialize)]
struct ProbeBody {
    status: Phase,
}

/// Process lifecycle shared between the server and the probe handlers.
#[derive(Debug)]
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Starting as u8),
        }
    }
}

impl HealthState {
    /// Fresh state in the `starting` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn phase(&self) -> Phase {
        Phase::from_raw(self.phase.load(Ordering::Acquire))
    }

    /// Enter `serving`. Has no effect once draining.
    pub fn mark_ready(&self) {
        let _ = self.phase.compare_exchange(
            Phase::Starting as u8,
            Phase::Serving as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Enter `draining`; both probes report 503 from now on.
    pub fn mark_unhealthy(&self) {
        self.phase.store(Phase::Draining as u8, Ordering::Release);
    }

    /// True while serving traffic.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Serving
    }

    /// False once draining.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.phase() != Phase::Draining
    }

    fn respond(&self, healthy: bool) -> HttpResponse {
        let mut builder = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        builder
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(ProbeBody {
                status: self.phase(),
            })
    }
}

/// 200 while serving, 503 while starting or draining.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Serving traffic"),
        (status = 503, description = "Starting or draining")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(state.is_ready())
}

/// 200 until the process starts draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is up"),
        (status = 503, description = "Draining for shutdown")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(state.is_alive())
}
