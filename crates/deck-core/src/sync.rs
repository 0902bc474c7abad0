use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use crate::config::Config;

pub trait RemoteSync {
    // At most once, no retry; implementations must never surface failure.
    fn publish(&self, key: &str, payload: &str);
}

#[derive(Debug, Clone)]
pub struct CommandSync {
    command: String,
}

impl CommandSync {
    pub fn from_config(cfg: &Config) -> Option<Self> {
        let command = cfg.get("sync.command")?;
        let command = command.trim().to_string();
        if command.is_empty() {
            return None;
        }
        debug!(command = %command, "remote sync enabled");
        Some(Self { command })
    }
}

impl RemoteSync for CommandSync {
    #[instrument(skip(self, payload))]
    fn publish(&self, key: &str, payload: &str) {
        let mut child = match Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("DECK_SYNC_KEY", key)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                debug!(error = %err, "sync command failed to spawn; dropped");
                return;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(payload.as_bytes()) {
                debug!(error = %err, "sync payload not delivered; dropped");
            }
        }

        // Reap in the background; the outcome is never awaited or surfaced.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
    }
}
