//! Continuous health watch command.

use std::time::Duration;

use tsui_core::{HealthEvent, PollInterval};

use crate::cli::GlobalArgs;
use crate::commands::status::{connection_label, format_status_line};
use crate::error::CliError;
use crate::util::{Session, create_runtime};

/// Watch command handler
///
/// Runs the health poller and prints every status change until Ctrl-C.
pub fn cmd_watch(globals: &GlobalArgs, admin: bool) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let panel = session.open_panel(&runtime)?;

    let interval: Duration = if admin {
        PollInterval::AdminMetrics.duration()
    } else {
        session.settings.health.interval()
    };

    println!(
        "Watching active connection every {}s (Ctrl-C to stop)",
        interval.as_secs()
    );

    runtime.block_on(async {
        let (handle, mut events) = panel.start_health_poller(interval);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(HealthEvent::StatusChanged(status)) => {
                        let label = connection_label(&panel, &status)
                            .unwrap_or_else(|| "No active connection".to_string());
                        println!("{}", format_status_line(&label, &status));
                    }
                    Some(HealthEvent::Stopped) | None => break,
                },
                _ = &mut ctrl_c => {
                    tracing::debug!("Interrupted, stopping health poller");
                    handle.stop().await;
                    break;
                }
            }
        }
    });

    Ok(())
}
