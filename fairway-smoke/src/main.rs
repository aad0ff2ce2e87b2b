use std::process::ExitCode;
use std::time::Duration;

/// Deployment smoke test. Probes every service's /health endpoint and
/// checks the environment a deployment needs. Exits non-zero on any
/// failure so it can gate a rollout.
const SERVICES: [(&str, &str, u16); 6] = [
    ("fairway-profile", "FAIRWAY_SMOKE_PROFILE_URL", 3001),
    ("fairway-matching", "FAIRWAY_SMOKE_MATCHING_URL", 3002),
    ("fairway-messaging", "FAIRWAY_SMOKE_MESSAGING_URL", 3003),
    ("fairway-safety", "FAIRWAY_SMOKE_SAFETY_URL", 3004),
    ("fairway-notification", "FAIRWAY_SMOKE_NOTIFICATION_URL", 3005),
    ("fairway-subscription", "FAIRWAY_SMOKE_SUBSCRIPTION_URL", 3006),
];

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    fairway_shared::middleware::init_tracing("fairway-smoke");

    let mut failures = 0u32;

    // Environment checks: a production deploy must not run on the
    // development JWT secret.
    let is_production = std::env::var("FAIRWAY_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret == "development-secret-change-in-production" && is_production => {
            tracing::error!("JWT_SECRET is still the development default");
            failures += 1;
        }
        Ok(_) => tracing::info!("JWT_SECRET is set"),
        Err(_) if is_production => {
            tracing::error!("JWT_SECRET is not set");
            failures += 1;
        }
        Err(_) => tracing::warn!("JWT_SECRET is not set, services will use the development default"),
    }

    let client = reqwest::Client::new();

    for (name, url_var, default_port) in SERVICES {
        let base_url = std::env::var(url_var)
            .unwrap_or_else(|_| format!("http://localhost:{default_port}"));
        let health_url = format!("{base_url}/health");

        match client.get(&health_url).timeout(PROBE_TIMEOUT).send().await {
            Ok(resp) if resp.status().is_success() => {
                // The safety service runs a deep check; hold it to the
                // strictest reading of its own report.
                if name == "fairway-safety" {
                    match resp.json::<serde_json::Value>().await {
                        Ok(body) if body["status"] == "healthy" => {
                            tracing::info!(service = name, "healthy");
                        }
                        Ok(body) => {
                            tracing::error!(
                                service = name,
                                status = %body["status"],
                                "service is up but not healthy"
                            );
                            failures += 1;
                        }
                        Err(e) => {
                            tracing::error!(service = name, error = %e, "unreadable health body");
                            failures += 1;
                        }
                    }
                } else {
                    tracing::info!(service = name, "healthy");
                }
            }
            Ok(resp) => {
                tracing::error!(service = name, status = %resp.status(), "health check failed");
                failures += 1;
            }
            Err(e) => {
                tracing::error!(service = name, error = %e, "health check unreachable");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        tracing::error!(failures, "smoke test failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("smoke test passed");
    ExitCode::SUCCESS
}
