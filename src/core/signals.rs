//! # OS termination signals for [`Orchestrator::serve`](crate::Orchestrator::serve).
//!
//! [`wait_for_shutdown_signal`] completes when the host process is asked to
//! terminate: SIGINT, SIGTERM or SIGQUIT on unix, Ctrl-C everywhere else.
//! `serve` treats any of them as "stop every started module and return".

/// Waits for SIGINT, SIGTERM, SIGQUIT or Ctrl-C.
///
/// Listeners are registered per call; `Err` means registration failed.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let which = tokio::select! {
        _ = tokio::signal::ctrl_c() => "ctrl_c",
        _ = sigint.recv()  => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    tracing::info!(signal = which, "termination signal received");
    Ok(())
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
