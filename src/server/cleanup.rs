use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::Instant};
use tracing::{error, info};

use crate::{
    common::types::{AnyResult, SessionId},
    configs::CleanupConfig,
    protocol::OutgoingMessage,
    server::SessionContext,
};

/// Periodic job that reclaims sessions left idle past a threshold.
///
/// A session is idle when it has no playing track, no live voice transport,
/// and its last activity predates the cutoff. All three are read live at
/// sweep time: a session that came back to life is re-evaluated fresh on
/// every pass.
pub struct CleanupTask {
    context: Arc<SessionContext>,
    threshold: Duration,
}

impl CleanupTask {
    pub fn new(context: Arc<SessionContext>, threshold_secs: u64) -> Self {
        Self {
            context,
            threshold: Duration::from_secs(threshold_secs),
        }
    }

    /// Spawns the sweep loop with the configured interval.
    pub fn spawn(config: &CleanupConfig, context: Arc<SessionContext>) -> JoinHandle<()> {
        let task = Self::new(context, config.threshold_secs);
        let interval = Duration::from_secs(config.interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task.run();
            }
        })
    }

    /// One sweep. Any failure is logged; the next sweep always runs.
    pub fn run(&self) {
        if let Err(e) = self.run_checked() {
            error!("Exception while running cleanup: {}", e);
        }
    }

    fn run_checked(&self) -> AnyResult<()> {
        let Some(cutoff) = Instant::now().checked_sub(self.threshold) else {
            // Process younger than the threshold: nothing can be idle long enough.
            return Ok(());
        };

        let cleaned: Vec<SessionId> = self
            .context
            .all_players()
            .into_iter()
            .filter(|player| {
                player.last_active() < cutoff
                    && !player.has_playing_track()
                    && !player.is_voice_connected()
            })
            .map(|player| {
                let session_id = player.session_id();
                if let Err(e) = self.context.destroy(session_id) {
                    error!("Failed destroying player {}: {}", session_id, e);
                }
                session_id
            })
            .collect();

        info!("Cleaned up {} players with session IDs {:?}", cleaned.len(), cleaned);

        for session_id in cleaned {
            self.context.send(&OutgoingMessage::Cleaned { session_id });
        }
        Ok(())
    }
}
