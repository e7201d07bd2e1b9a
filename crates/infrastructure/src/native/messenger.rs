use super::codec::{read_message, write_message};
use super::host::NativeHost;
use async_trait::async_trait;
use ipmon_domain::{HostRequest, HostResponse, NativeLookupError};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Extra time granted to a spawned host beyond its own lookup timeout.
const PROCESS_GRACE: Duration = Duration::from_secs(1);

/// Delivers one request to the native host and returns its reply.
#[async_trait]
pub trait NativeMessenger: Send + Sync {
    async fn send(&self, request: &HostRequest) -> Result<HostResponse, NativeLookupError>;
}

/// Runs the host logic inside this process.
pub struct InProcessMessenger {
    host: NativeHost,
}

impl InProcessMessenger {
    pub fn new(host: NativeHost) -> Self {
        Self { host }
    }
}

#[async_trait]
impl NativeMessenger for InProcessMessenger {
    async fn send(&self, request: &HostRequest) -> Result<HostResponse, NativeLookupError> {
        Ok(self.host.handle(request.clone()).await)
    }
}

/// Spawns `<command> native-host` per request and exchanges one frame pair
/// over its stdio.
pub struct ProcessMessenger {
    command: String,
    timeout: Duration,
}

impl ProcessMessenger {
    pub fn new(command: String, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait]
impl NativeMessenger for ProcessMessenger {
    async fn send(&self, request: &HostRequest) -> Result<HostResponse, NativeLookupError> {
        let mut child = Command::new(&self.command)
            .arg("native-host")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                NativeLookupError::SystemError(format!("failed to spawn {}: {}", self.command, e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| NativeLookupError::SystemError("native host stdin unavailable".into()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| {
                NativeLookupError::SystemError("native host stdout unavailable".into())
            })?;

        let exchange = async move {
            write_message(&mut stdin, request).await?;
            drop(stdin);
            read_message::<HostResponse, _>(&mut stdout).await
        };

        let response = tokio::time::timeout(self.timeout + PROCESS_GRACE, exchange)
            .await
            .map_err(|_| NativeLookupError::Timeout)?
            .map_err(|e| NativeLookupError::SystemError(e.to_string()))?;

        debug!(command = %self.command, "Native host replied");
        response.ok_or_else(|| {
            NativeLookupError::SystemError("native host closed stdout without replying".into())
        })
    }
}
