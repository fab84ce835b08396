//! Logging setup and the gateway health report.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local runs.
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`; anything but `json` selects [`LogFormat::Pretty`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_name(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }

    fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") { Self::Json } else { Self::Pretty }
    }
}

/// Installs the global tracing subscriber.
///
/// The level filter comes from `RUST_LOG` and falls back to `info`. Logs go to stderr so
/// the JSON report on stdout stays machine-readable.
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Overall probe verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Every configured gateway answered.
    Healthy,
    /// At least one gateway answered and at least one did not.
    Degraded,
    /// Nothing is reachable, or nothing is configured.
    Unhealthy,
}

impl HealthStatus {
    /// Lowercase name used in the JSON report.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }

    /// Process exit code for this verdict.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Degraded => 1,
            Self::Unhealthy => 2,
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Check name, e.g. `gateway-A`.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable detail.
    pub message: String,
}

impl HealthCheck {
    /// A passing check.
    #[must_use]
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), passed: true, message: message.into() }
    }

    /// A failing check.
    #[must_use]
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), passed: false, message: message.into() }
    }
}

/// Probe output.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Overall verdict, derived from `checks`.
    pub status: HealthStatus,
    /// Probe version.
    pub version: &'static str,
    /// `production` or `test`.
    pub environment: &'static str,
    /// Individual checks.
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Builds a report and derives its status.
    #[must_use]
    pub fn new(environment: &'static str, checks: Vec<HealthCheck>) -> Self {
        Self {
            status: Self::compute_status(&checks),
            version: env!("CARGO_PKG_VERSION"),
            environment,
            checks,
        }
    }

    /// Healthy when all checks pass, degraded when some do, unhealthy otherwise.
    #[must_use]
    pub fn compute_status(checks: &[HealthCheck]) -> HealthStatus {
        let passed = checks.iter().filter(|check| check.passed).count();
        if checks.is_empty() || passed == 0 {
            HealthStatus::Unhealthy
        } else if passed == checks.len() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::json!({
            "status": self.status.as_str(),
            "version": self.version,
            "environment": self.environment,
            "checks": self.checks.iter().map(|check| serde_json::json!({
                "name": check.name,
                "status": if check.passed { "pass" } else { "fail" },
                "message": check.message,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&json)
    }
}
