//! Termination signal handling

use eyre::Result;

/// Installed termination handlers.
///
/// Handlers are registered at construction, so a signal delivered before
/// `recv` is first polled is still observed rather than killing the process.
pub struct Shutdown {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Shutdown {
    /// Must be called from within a tokio runtime with the signal driver enabled.
    pub fn install() -> Result<Self> {
        use eyre::Context;
        use tokio::signal::unix::{SignalKind, signal};

        let sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
        let sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        Ok(Self { sigint, sigterm })
    }

    /// Resolves when SIGINT or SIGTERM arrives.
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigint.recv() => log::info!("Received SIGINT"),
            _ = self.sigterm.recv() => log::info!("Received SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
impl Shutdown {
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Resolves on Ctrl+C.
    pub async fn recv(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C");
    }
}
