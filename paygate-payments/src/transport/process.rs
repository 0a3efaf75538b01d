//! Transport backed by an external gateway client program.
//!
//! The program is invoked as `program <host> <port> <parmlist> <timeout>` and
//! prints the reply parmlist on stdout, the calling convention of the
//! classic gateway SDK command-line clients.
//!
//! The parmlist, credentials included, travels in argv and is therefore
//! visible to anyone on the host who can list processes. Only use this
//! transport on a machine where that is acceptable; prefer
//! [`HttpTransport`](super::HttpTransport) otherwise.

use super::{OutboundMessage, Transport};
use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use paygate_log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct ProcessTransport {
    program: PathBuf,
    timeout: Duration,
}

impl ProcessTransport {
    /// Resolve `program` the way a shell would: paths are checked directly,
    /// bare names such as `pfpro` are looked up on `PATH`.
    ///
    /// Fails with `TransportUnavailable` if no executable is found.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> PaymentResult<Self> {
        let requested = program.into();
        let program = which::which(&requested).map_err(|e| {
            PaymentError::TransportUnavailable(format!("gateway client `{}`: {}", requested.display(), e))
        })?;
        Ok(Self { program, timeout })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

fn split_host_port(endpoint: &str) -> PaymentResult<(&str, &str)> {
    endpoint
        .rsplit_once(':')
        .filter(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
        .ok_or_else(|| PaymentError::Config(format!("endpoint `{}` is not host:port", endpoint)))
}

fn trim_line_end(mut bytes: Vec<u8>) -> Vec<u8> {
    while matches!(bytes.last(), Some(b'\n' | b'\r')) {
        bytes.pop();
    }
    bytes
}

#[async_trait]
impl Transport for ProcessTransport {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn send(&self, message: &OutboundMessage<'_>) -> PaymentResult<Vec<u8>> {
        let (host, port) = split_host_port(message.endpoint)?;
        let parmlist = String::from_utf8_lossy(message.body);

        debug!(
            target: "paygate::transport",
            fields: [("gateway", message.gateway), ("request_id", message.request_id)],
            "Running {} for {}:{}",
            self.program.display(),
            host,
            port
        );

        let output = Command::new(&self.program)
            .arg(host)
            .arg(port)
            .arg(&*parmlist)
            .arg(self.timeout.as_secs().to_string())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    PaymentError::TransportUnavailable(format!("{}: {}", self.program.display(), e))
                }
                _ => PaymentError::Transport(e.to_string()),
            })?;

        if !output.status.success() {
            return Err(PaymentError::Transport(format!(
                "gateway client exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(trim_line_end(output.stdout))
    }
}
