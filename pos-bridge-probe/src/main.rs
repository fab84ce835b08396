//! POS Bridge probe: pings every configured gateway and prints a JSON health report.
//!
//! Configuration is read from the environment (`APP_ENV`, `GATEWAY_A_*`, `GATEWAY_B_*`,
//! `HTTP_*`). The exit code is 0 when healthy, 1 when degraded and 2 when unhealthy.

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

mod observability;

use std::process::ExitCode;

use observability::{HealthCheck, HealthReport, LogFormat, init_observability};
use pos_bridge::{
    GatewayProvider, PaymentAdapter,
    config::{BridgeConfig, Environment},
    models::PingResult,
};
use tracing::{error, info};

const CONFIGURATION_CHECK: &str = "configuration";

fn environment_name(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "production",
        Environment::Test => "test",
    }
}

fn check_from(provider: &str, result: PingResult) -> HealthCheck {
    if result.reachable {
        HealthCheck::pass(provider, result.detail)
    } else {
        HealthCheck::fail(provider, result.detail)
    }
}

async fn ping_check<P: GatewayProvider>(adapter: PaymentAdapter<P>) -> HealthCheck {
    let name = adapter.provider().provider().as_str();
    check_from(name, adapter.ping().await)
}

async fn probe(config: &BridgeConfig) -> Vec<HealthCheck> {
    let mut checks = Vec::new();

    if config.gateway_a.is_some() {
        match PaymentAdapter::gateway_a(config) {
            Ok(adapter) => checks.push(ping_check(adapter).await),
            Err(e) => checks.push(HealthCheck::fail("gateway-A", e.to_string())),
        }
    }
    if config.gateway_b.is_some() {
        match PaymentAdapter::gateway_b(config) {
            Ok(adapter) => checks.push(ping_check(adapter).await),
            Err(e) => checks.push(HealthCheck::fail("gateway-B", e.to_string())),
        }
    }
    if checks.is_empty() {
        checks.push(HealthCheck::fail(CONFIGURATION_CHECK, "no gateway is configured"));
    }

    checks
}

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    let report = match BridgeConfig::from_env() {
        Ok(config) => {
            info!(environment = environment_name(config.environment), "Probing gateways");
            HealthReport::new(environment_name(config.environment), probe(&config).await)
        }
        Err(e) => {
            error!(error = %e, "Configuration rejected");
            HealthReport::new("unknown", vec![HealthCheck::fail(CONFIGURATION_CHECK, e.to_string())])
        }
    };

    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Failed to render health report"),
    }

    info!(status = report.status.as_str(), "Probe finished");
    ExitCode::from(report.status.exit_code())
}
