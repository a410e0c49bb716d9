use std::sync::Arc;
use std::time::Duration;

use crate::gateway::MeetingGateway;

/// Periodically re-fetch the meeting list on the actix runtime.
///
/// Each tick is a plain `refresh`, so it races manual refreshes the same way
/// two admin clicks would: the response that lands last wins.
pub fn spawn_sync(gateway: Arc<MeetingGateway>, every: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            log::debug!("Running background meeting sync");
            let outcome = gateway.refresh().await;
            match outcome.error {
                None => log::info!("Background sync loaded {} meetings", outcome.snapshot.meetings.len()),
                Some(e) => log::warn!("Background sync failed, keeping cached list: {}", e),
            }
        }
    });
}
