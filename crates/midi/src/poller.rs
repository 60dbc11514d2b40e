//! Background input polling.
//!
//! One task polls the device while another drives the LEDs; both go
//! through the same lock around the session.

use std::sync::Arc;
use std::time::Duration;

use launchpad_core::{ButtonEvent, Launchpad, MidiTransport};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A session shared between the polling task and the caller.
pub type SharedLaunchpad<T> = Arc<Mutex<Launchpad<T>>>;

/// Poll `launchpad` every `interval` and forward button events to `events`.
///
/// The task ends when the receiving side of `events` is dropped or the
/// transport reports an error.
pub fn spawn_input_poller<T>(
    launchpad: SharedLaunchpad<T>,
    interval: Duration,
    events: mpsc::Sender<ButtonEvent>,
) -> JoinHandle<()>
where
    T: MidiTransport + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            // Lock only for the poll itself, never across an await
            let polled = launchpad
                .lock()
                .button_events()
                .map(|events| events.collect::<Vec<_>>());

            let batch = match polled {
                Ok(batch) => batch,
                Err(e) => {
                    log::error!("Launchpad input polling stopped: {}", e);
                    return;
                }
            };

            for event in batch {
                log::debug!("Button {:?} pressed={}", event.position, event.pressed);
                if events.send(event).await.is_err() {
                    log::debug!("Button event receiver dropped, stopping poller");
                    return;
                }
            }
        }
    })
}
