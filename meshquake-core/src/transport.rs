//! Text transports for delivering alerts onto the mesh.
//!
//! A transport makes exactly one delivery attempt per call. It has no retry
//! or queue of its own.

use async_trait::async_trait;
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The sender process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The sender process ran but reported failure.
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },
}

/// Capability to push one text message onto a channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt to deliver `text` on `channel`, optionally to an explicit
    /// radio address.
    async fn send_text(
        &self,
        text: &str,
        channel: u32,
        target: Option<&str>,
    ) -> Result<(), TransportError>;
}

/// Transport that shells out to the `meshtastic` Python CLI:
/// `meshtastic [-t <addr>] --ch-index <n> --sendtext <text>`.
#[derive(Debug, Clone)]
pub struct MeshtasticCli {
    program: String,
}

impl MeshtasticCli {
    pub const DEFAULT_PROGRAM: &'static str = "meshtastic";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for one send.
    pub fn args(text: &str, channel: u32, target: Option<&str>) -> Vec<String> {
        let mut args = Vec::with_capacity(6);
        if let Some(target) = target {
            args.push("-t".to_string());
            args.push(target.to_string());
        }
        args.push("--ch-index".to_string());
        args.push(channel.to_string());
        args.push("--sendtext".to_string());
        args.push(text.to_string());
        args
    }
}

impl Default for MeshtasticCli {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

#[async_trait]
impl Transport for MeshtasticCli {
    async fn send_text(
        &self,
        text: &str,
        channel: u32,
        target: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!(program = %self.program, channel, ?target, "Invoking transport");
        let status = Command::new(&self.program)
            .args(Self::args(text, channel, target))
            .status()
            .await
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(TransportError::ExitStatus {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_target() {
        assert_eq!(
            MeshtasticCli::args("M4.2 50mi from SJ", 2, None),
            ["--ch-index", "2", "--sendtext", "M4.2 50mi from SJ"]
        );
    }

    #[test]
    fn test_args_with_target() {
        assert_eq!(
            MeshtasticCli::args("hello", 0, Some("192.168.1.40")),
            ["-t", "192.168.1.40", "--ch-index", "0", "--sendtext", "hello"]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let transport = MeshtasticCli::new("meshquake-no-such-sender");
        let err = transport.send_text("hi", 0, None).await.unwrap_err();
        assert!(matches!(err, TransportError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_reported() {
        // `false` ignores its arguments and exits 1.
        let err = MeshtasticCli::new("false")
            .send_text("hi", 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ExitStatus { .. }));

        assert!(MeshtasticCli::new("true").send_text("hi", 0, None).await.is_ok());
    }
}
