//! Platform CLI push executor

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::process::Command;
use tracing::{debug, info};

use crate::deploy::pusher::{FoundationPusher, PushError, PushTarget};
use crate::filesys::dir::Dir;

/// Name of the optional platform manifest placed next to the artifact
pub const MANIFEST_FILE: &str = "manifest.yml";

/// Pushes with the `cf` CLI: api, auth, target, push.
///
/// Each push gets its own CLI home so concurrent pushes to different
/// foundations never share login state.
pub struct CfPusher {
    cli_binary: String,
    username: String,
    password: SecretString,
    timeout: Duration,
    homes: Dir,
}

impl CfPusher {
    pub fn new(
        cli_binary: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
        timeout: Duration,
        homes: Dir,
    ) -> Self {
        Self {
            cli_binary: cli_binary.into(),
            username: username.into(),
            password,
            timeout,
            homes,
        }
    }

    async fn push_steps(
        &self,
        target: &PushTarget<'_>,
        home: &Dir,
        log: &mut String,
    ) -> Result<(), PushError> {
        let api = api_endpoint(target.foundation);
        let mut api_args = vec!["api", api.as_str()];
        if target.skip_ssl {
            api_args.push("--skip-ssl-validation");
        }
        self.run_cli(target, home, &api_args, log).await?;

        // Credentials travel through the environment, never argv
        self.run_cli(target, home, &["auth"], log).await?;

        self.run_cli(target, home, &["target", "-o", target.org, "-s", target.space], log)
            .await?;

        let artifact = target.artifact_path.to_string_lossy();
        let mut push_args = vec!["push", target.app_name, "-p", &*artifact];
        let manifest_path = target.artifact_path.join(MANIFEST_FILE);
        let manifest = manifest_path.to_string_lossy();
        if manifest_path.is_file() {
            push_args.extend(["-f", &*manifest]);
        }
        self.run_cli(target, home, &push_args, log).await
    }

    async fn run_cli(
        &self,
        target: &PushTarget<'_>,
        home: &Dir,
        args: &[&str],
        log: &mut String,
    ) -> Result<(), PushError> {
        let step = args.first().copied().unwrap_or_default();
        debug!("[{}] {} {}", target.foundation, self.cli_binary, step);

        let output = Command::new(&self.cli_binary)
            .args(args)
            .env("CF_HOME", home.path())
            .env("CF_USERNAME", &self.username)
            .env("CF_PASSWORD", self.password.expose_secret())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                PushError::new(format!(
                    "failed to run {} {} for {}: {}",
                    self.cli_binary, step, target.foundation, e
                ))
            })?;

        log.push_str(&String::from_utf8_lossy(&output.stdout));
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(PushError::new(format!(
                "{} {} failed on {} ({})",
                self.cli_binary, step, target.foundation, output.status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FoundationPusher for CfPusher {
    async fn push(&self, target: &PushTarget<'_>) -> Result<String, PushError> {
        info!(
            "Pushing {} to {} ({}/{})",
            target.app_name, target.foundation, target.org, target.space
        );

        let home = self
            .homes
            .create_unique_subdir(&target.deployment_id.to_string())
            .await
            .map_err(|e| PushError::new(format!("cannot prepare CLI home: {}", e)))?;

        let mut log = String::new();
        let result = tokio::time::timeout(self.timeout, self.push_steps(target, &home, &mut log)).await;

        if let Err(e) = home.delete().await {
            debug!("Failed to remove CLI home {:?}: {}", home.path(), e);
        }

        match result {
            Ok(Ok(())) => {
                info!("Pushed {} to {}", target.app_name, target.foundation);
                Ok(log)
            }
            Ok(Err(e)) => Err(e.with_log(log)),
            Err(_) => Err(PushError::new(format!(
                "push to {} timed out after {}s",
                target.foundation,
                self.timeout.as_secs()
            ))
            .with_log(log)),
        }
    }
}

/// Foundations are configured as bare hosts or full URLs
fn api_endpoint(foundation: &str) -> String {
    if foundation.starts_with("http://") || foundation.starts_with("https://") {
        foundation.to_string()
    } else {
        format!("https://{}", foundation)
    }
}
