//! In-memory transport fakes.

use std::sync::mpsc::{self, Receiver, Sender};

use parking_lot::Mutex;

use timingkit_core::{CommandSender, HwCommand, TimeSyncReceiver, TimeSyncSample, TransportError};

/// Command sink that records everything pushed into it.
#[derive(Debug, Default)]
pub struct RecordingCommandSender {
    sent: Mutex<Vec<HwCommand>>,
}

impl RecordingCommandSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands sent so far.
    pub fn sent(&self) -> Vec<HwCommand> {
        self.sent.lock().clone()
    }

    /// Command ids in send order.
    pub fn sent_ids(&self) -> Vec<String> {
        self.sent.lock().iter().map(|c| c.id.clone()).collect()
    }

    /// Number of sends with the given command id.
    pub fn count_of(&self, id: &str) -> usize {
        self.sent.lock().iter().filter(|c| c.id == id).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl CommandSender for RecordingCommandSender {
    fn send_command(&self, command: HwCommand) -> Result<(), TransportError> {
        self.sent.lock().push(command);
        Ok(())
    }
}

/// Producer half of an in-memory time-sync stream.
#[derive(Clone)]
pub struct TimeSyncFeeder {
    tx: Sender<TimeSyncSample>,
}

impl TimeSyncFeeder {
    /// Push one sample; drops it silently if the receiver is gone, like a
    /// real fire-and-forget transport would.
    pub fn feed(&self, sample: TimeSyncSample) {
        let _ = self.tx.send(sample);
    }
}

/// Consumer half of an in-memory time-sync stream.
pub struct ChannelTimeSyncReceiver {
    rx: Mutex<Receiver<TimeSyncSample>>,
}

impl TimeSyncReceiver for ChannelTimeSyncReceiver {
    fn try_recv(&self) -> Option<TimeSyncSample> {
        self.rx.lock().try_recv().ok()
    }
}

/// Create a connected feeder/receiver pair.
pub fn time_sync_channel() -> (TimeSyncFeeder, ChannelTimeSyncReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        TimeSyncFeeder { tx },
        ChannelTimeSyncReceiver { rx: Mutex::new(rx) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recorder_keeps_commands_in_order() {
        let sender = RecordingCommandSender::new();
        sender
            .send_command(HwCommand::new("io_reset", "ept0"))
            .expect("send");
        sender
            .send_command(HwCommand::with_payload(
                "endpoint_enable",
                "ept0",
                json!({"endpoint_id": 0}),
            ))
            .expect("send");

        assert_eq!(sender.sent_ids(), vec!["io_reset", "endpoint_enable"]);
        assert_eq!(sender.count_of("io_reset"), 1);
    }

    #[test]
    fn channel_delivers_and_drains() {
        let (feeder, receiver) = time_sync_channel();
        assert!(receiver.try_recv().is_none());

        feeder.feed(TimeSyncSample::new(1, 2, 3));
        feeder.feed(TimeSyncSample::new(4, 5, 6));

        assert_eq!(receiver.try_recv().map(|s| s.daq_time), Some(1));
        assert_eq!(receiver.try_recv().map(|s| s.daq_time), Some(4));
        assert!(receiver.try_recv().is_none());
    }
}
