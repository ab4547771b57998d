//! Operator console trigger
//!
//! Reads stdin line by line; `t` followed by Enter fires a console trigger.

use super::{TriggerSender, TriggerSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Spawn the stdin listener. The task ends when stdin closes.
pub fn spawn(sender: TriggerSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Console trigger enabled. Press 't' then Enter to mark an event");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().eq_ignore_ascii_case("t") {
                        tracing::info!("Console trigger activated");
                        if !sender.fire(TriggerSource::Console) {
                            break;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Console input error: {e}");
                    break;
                }
            }
        }
        tracing::info!("Console trigger listener stopped");
    })
}
