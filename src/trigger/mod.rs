//! Event triggers
//!
//! Every trigger source (vehicle bus, cabin button, operator console) holds a
//! cloned [`TriggerSender`]; the recording engine owns the sole receiver.
//! The channel is unbounded: a missed safety event is a correctness failure,
//! a few extra buffered triggers are cheap to ignore.

pub mod console;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Where a trigger came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    /// Vehicle bus (CAN) event identifier match
    Bus,
    /// Physical cabin button
    Button,
    /// Operator console
    Console,
    /// Source did not identify itself
    Unknown,
}

impl TriggerSource {
    /// Label used in event filenames and logs
    pub fn label(&self) -> &'static str {
        match self {
            TriggerSource::Bus => "can",
            TriggerSource::Button => "manual",
            TriggerSource::Console => "terminal",
            TriggerSource::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A labeled, timestamped "event occurred" signal. Consumed exactly once.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub source: TriggerSource,
    pub fired_at: DateTime<Utc>,
}

impl Trigger {
    pub fn new(source: TriggerSource) -> Self {
        Self {
            source,
            fired_at: Utc::now(),
        }
    }
}

/// Sending half of the event channel, one clone per trigger source.
#[derive(Debug, Clone)]
pub struct TriggerSender {
    tx: mpsc::UnboundedSender<Trigger>,
}

impl TriggerSender {
    /// Fire a trigger stamped with the current time.
    ///
    /// Never blocks. Returns false if the engine has shut down.
    pub fn fire(&self, source: TriggerSource) -> bool {
        self.send(Trigger::new(source))
    }

    pub fn send(&self, trigger: Trigger) -> bool {
        if self.tx.send(trigger).is_err() {
            tracing::warn!("Trigger dropped: engine receiver is gone");
            return false;
        }
        true
    }

    /// Wrap this sender so rapid repeat fires within `min_interval` are
    /// swallowed. For button-style sources that bounce.
    pub fn debounced(self, min_interval: Duration) -> DebouncedTriggerSender {
        DebouncedTriggerSender {
            inner: self,
            min_interval,
            last_fired: None,
        }
    }
}

/// Receiving half of the event channel, owned by the recording engine.
pub type TriggerReceiver = mpsc::UnboundedReceiver<Trigger>;

/// Create the event channel merging all trigger sources.
pub fn trigger_channel() -> (TriggerSender, TriggerReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TriggerSender { tx }, rx)
}

/// A [`TriggerSender`] that drops fires arriving within `min_interval` of the
/// previous accepted fire.
#[derive(Debug)]
pub struct DebouncedTriggerSender {
    inner: TriggerSender,
    min_interval: Duration,
    last_fired: Option<Instant>,
}

impl DebouncedTriggerSender {
    /// Fire unless still inside the debounce window. Returns whether the
    /// trigger was forwarded.
    pub fn fire(&mut self, source: TriggerSource) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_fired {
            if now.duration_since(last) < self.min_interval {
                tracing::debug!(%source, "Debounced trigger");
                return false;
            }
        }
        self.last_fired = Some(now);
        self.inner.fire(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_event_sources() {
        assert_eq!(TriggerSource::Bus.label(), "can");
        assert_eq!(TriggerSource::Button.label(), "manual");
        assert_eq!(TriggerSource::Console.label(), "terminal");
        assert_eq!(TriggerSource::Unknown.label(), "unknown");
    }

    #[tokio::test]
    async fn channel_preserves_per_sender_order() {
        let (tx, mut rx) = trigger_channel();
        assert!(tx.fire(TriggerSource::Bus));
        assert!(tx.fire(TriggerSource::Console));

        assert_eq!(rx.recv().await.unwrap().source, TriggerSource::Bus);
        assert_eq!(rx.recv().await.unwrap().source, TriggerSource::Console);
    }

    #[tokio::test]
    async fn send_fails_after_receiver_dropped() {
        let (tx, rx) = trigger_channel();
        drop(rx);
        assert!(!tx.fire(TriggerSource::Button));
    }

    #[tokio::test]
    async fn debounce_swallows_rapid_fires() {
        let (tx, mut rx) = trigger_channel();
        let mut debounced = tx.debounced(Duration::from_secs(60));

        assert!(debounced.fire(TriggerSource::Button));
        assert!(!debounced.fire(TriggerSource::Button));
        assert!(!debounced.fire(TriggerSource::Button));

        assert_eq!(rx.recv().await.unwrap().source, TriggerSource::Button);
        assert!(rx.try_recv().is_err());
    }
}
