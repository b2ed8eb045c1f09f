//! One-second tick source for the session timer.
//!
//! The driver sleeps until the app arms it, then ticks every second until the
//! app disarms it. Arming and disarming happen under the app lock together with
//! the timer change, and `App::on_tick` is inert on a stopped timer, so a tick
//! that races a pause or reset never moves the countdown.

use crate::app::SharedApp;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

pub fn spawn(app: SharedApp, mut armed: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            while !*armed.borrow_and_update() {
                if armed.changed().await.is_err() {
                    return;
                }
            }
            debug!("tick source armed");

            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticks.tick() => app.lock().await.on_tick(),
                    changed = armed.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if !*armed.borrow_and_update() {
                            debug!("tick source disarmed");
                            break;
                        }
                    }
                }
            }
        }
    })
}
