//! Engine server handles: a launched child process or an existing endpoint.

use crate::{EngineConfig, InferenceServer, READINESS_POLL_INTERVAL};
use async_trait::async_trait;
use podgen_error::{EngineError, EngineErrorKind};
use reqwest::Client;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

async fn probe_health(client: &Client, base_url: &str) -> Result<(), EngineError> {
    let response = client
        .get(format!("{}/health", base_url))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| EngineError::new(EngineErrorKind::NotReady(e.to_string())))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(EngineError::new(EngineErrorKind::NotReady(format!(
            "health endpoint returned {}",
            response.status()
        ))))
    }
}

/// An engine started by this worker.
///
/// The child is killed when the handle is dropped, so the engine lives
/// exactly as long as the worker process holds it.
#[derive(Debug)]
pub struct EngineProcess {
    child: Mutex<Child>,
    base_url: String,
    client: Client,
}

impl EngineProcess {
    /// Spawn the engine with arguments derived from the configuration.
    #[instrument(skip(config), fields(command = %config.engine_command(), model = %config.model_name()))]
    pub fn launch(config: &EngineConfig) -> Result<Self, EngineError> {
        let args = config.launch_args();
        info!(args = ?args, "Launching inference engine");

        let child = Command::new(config.engine_command())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::new(EngineErrorKind::Launch(format!(
                    "{}: {}",
                    config.engine_command(),
                    e
                )))
            })?;

        Ok(Self {
            child: Mutex::new(child),
            base_url: config.local_base_url(),
            client: Client::new(),
        })
    }

    async fn exit_status(&self) -> Result<Option<std::process::ExitStatus>, EngineError> {
        self.child
            .lock()
            .await
            .try_wait()
            .map_err(|e| EngineError::new(EngineErrorKind::Launch(e.to_string())))
    }
}

#[async_trait]
impl InferenceServer for EngineProcess {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    async fn health_check(&self) -> Result<(), EngineError> {
        probe_health(&self.client, &self.base_url).await
    }

    /// Polls health like the default, but fails immediately if the child exits.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<(), EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.exit_status().await? {
                return Err(EngineError::new(EngineErrorKind::Launch(format!(
                    "engine exited during startup with {}",
                    status
                ))));
            }
            match self.health_check().await {
                Ok(()) => {
                    info!(url = %self.base_url, "Inference engine is ready");
                    return Ok(());
                }
                Err(e) if Instant::now() >= deadline => {
                    return Err(EngineError::new(EngineErrorKind::NotReady(format!(
                        "{} not healthy after {:?}: {}",
                        self.base_url, timeout, e.kind
                    ))));
                }
                Err(e) => debug!(error = %e.kind, "Engine still starting"),
            }
            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
        }
    }
}

/// An engine that was started elsewhere and is reached at a fixed URL.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    base_url: String,
    client: Client,
}

impl RemoteEngine {
    /// Attach to an engine at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl InferenceServer for RemoteEngine {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    async fn health_check(&self) -> Result<(), EngineError> {
        probe_health(&self.client, &self.base_url).await
    }
}
