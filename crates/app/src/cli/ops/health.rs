use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.remote.as_str().trim_end_matches('/');
        let mut lines = vec![format!("Admin panel ({}):", base)];

        let livez_url = format!("{}/_status/livez", base);
        match ctx.client.get(&livez_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                lines.push("  livez:   OK".to_string());
            }
            Ok(resp) => {
                return Err(HealthError::Failed(format!("livez returned {}", resp.status())));
            }
            Err(e) => {
                return Err(HealthError::Failed(format!("{} is not reachable: {}", base, e)));
            }
        }

        let version_url = format!("{}/_status/version", base);
        match ctx.client.get(&version_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let body = resp.text().await.unwrap_or_default();
                let version = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("version").and_then(|v| v.as_str()).map(String::from))
                    .unwrap_or_else(|| "unknown".to_string());
                lines.push(format!("  version: {}", version));
            }
            Ok(resp) => lines.push(format!("  version: UNAVAILABLE ({})", resp.status())),
            Err(_) => lines.push("  version: NOT REACHABLE".to_string()),
        }

        Ok(lines.join("\n"))
    }
}
