use super::error::EngineError;
use crate::core::io::records::OutcomeRecord;
use crate::core::io::traits::{DiscardSink, RecordSink};
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::outcome::{JobOutcome, OutcomeChannel};
use std::sync::Mutex;

struct Channel {
    sink: Box<dyn RecordSink>,
    count: usize,
}

impl Channel {
    fn new(sink: Box<dyn RecordSink>) -> Self {
        Self { sink, count: 0 }
    }
}

/// Number of records delivered to each channel so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelCounts {
    pub successes: usize,
    pub similarity_failures: usize,
    pub generation_failures: usize,
}

impl ChannelCounts {
    pub fn total(&self) -> usize {
        self.successes + self.similarity_failures + self.generation_failures
    }
}

/// The per-run output state: three append-only sinks and their running counters.
///
/// Each channel sits behind its own lock, so deliveries to different channels never wait
/// on each other and records within one channel are never interleaved.
pub struct OutputChannels {
    success: Mutex<Channel>,
    similarity_failure: Mutex<Channel>,
    generation_failure: Mutex<Channel>,
}

impl OutputChannels {
    pub fn new(
        success: Box<dyn RecordSink>,
        similarity_failure: Box<dyn RecordSink>,
        generation_failure: Box<dyn RecordSink>,
    ) -> Self {
        Self {
            success: Mutex::new(Channel::new(success)),
            similarity_failure: Mutex::new(Channel::new(similarity_failure)),
            generation_failure: Mutex::new(Channel::new(generation_failure)),
        }
    }

    /// Channels that only count deliveries.
    pub fn discarding() -> Self {
        Self::new(
            Box::new(DiscardSink),
            Box::new(DiscardSink),
            Box::new(DiscardSink),
        )
    }

    fn channel(&self, channel: OutcomeChannel) -> &Mutex<Channel> {
        match channel {
            OutcomeChannel::Success => &self.success,
            OutcomeChannel::SimilarityFailure => &self.similarity_failure,
            OutcomeChannel::GenerationFailure => &self.generation_failure,
        }
    }

    /// Writes `outcome` to its channel and returns the channel's new running count.
    pub fn deliver(&self, outcome: &JobOutcome, target: &MoleculeGraph) -> Result<usize, EngineError> {
        let channel = outcome.channel();
        let mut guard = self
            .channel(channel)
            .lock()
            .map_err(|_| EngineError::Internal(format!("{} channel lock poisoned", channel)))?;
        let count = guard.count + 1;
        let record = OutcomeRecord::from_outcome(outcome, count, target);
        guard
            .sink
            .write(&record)
            .map_err(|source| EngineError::Sink { channel, source })?;
        guard.count = count;
        Ok(count)
    }

    pub fn counts(&self) -> ChannelCounts {
        let count = |channel: &Mutex<Channel>| channel.lock().map(|c| c.count).unwrap_or(0);
        ChannelCounts {
            successes: count(&self.success),
            similarity_failures: count(&self.similarity_failure),
            generation_failures: count(&self.generation_failure),
        }
    }

    pub fn flush(&self) -> Result<(), EngineError> {
        for channel in [
            OutcomeChannel::Success,
            OutcomeChannel::SimilarityFailure,
            OutcomeChannel::GenerationFailure,
        ] {
            let mut guard = self
                .channel(channel)
                .lock()
                .map_err(|_| EngineError::Internal(format!("{} channel lock poisoned", channel)))?;
            guard
                .sink
                .flush()
                .map_err(|source| EngineError::Sink { channel, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::memory::MemorySink;
    use crate::core::io::traits::RecordError;
    use crate::core::models::conformer::ConformerEnsemble;
    use crate::core::models::outcome::{OutcomeKind, ScaffoldChoice};

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn write(&mut self, _record: &OutcomeRecord) -> Result<(), RecordError> {
            Err(RecordError::Io(std::io::Error::other("disk full")))
        }
    }

    fn success(index: usize) -> JobOutcome {
        JobOutcome {
            input_index: index,
            kind: OutcomeKind::Success {
                scaffold: ScaffoldChoice {
                    index: 0,
                    score: None,
                },
                ensemble: ConformerEnsemble::new(),
            },
        }
    }

    fn similarity_failure(index: usize) -> JobOutcome {
        JobOutcome {
            input_index: index,
            kind: OutcomeKind::SimilarityFailure {
                best_score: Some(0.4),
            },
        }
    }

    #[test]
    fn deliveries_are_counted_per_channel() {
        let successes = MemorySink::new();
        let failures = MemorySink::new();
        let channels = OutputChannels::new(
            Box::new(successes.clone()),
            Box::new(failures.clone()),
            Box::new(DiscardSink),
        );
        let target = MoleculeGraph::new("t");

        assert_eq!(channels.deliver(&success(0), &target).unwrap(), 1);
        assert_eq!(channels.deliver(&similarity_failure(1), &target).unwrap(), 1);
        assert_eq!(channels.deliver(&success(2), &target).unwrap(), 2);

        let counts = channels.counts();
        assert_eq!(counts.successes, 2);
        assert_eq!(counts.similarity_failures, 1);
        assert_eq!(counts.generation_failures, 0);
        assert_eq!(counts.total(), 3);

        let records = successes.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].input_index, 2);
        assert_eq!(records[1].channel_count, 2);
        assert_eq!(failures.records()[0].similarity, Some(0.4));
        assert!(channels.flush().is_ok());
    }

    #[test]
    fn sink_failures_surface_as_engine_errors() {
        let channels = OutputChannels::new(
            Box::new(FailingSink),
            Box::new(DiscardSink),
            Box::new(DiscardSink),
        );
        let err = channels
            .deliver(&success(0), &MoleculeGraph::new("t"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Sink {
                channel: OutcomeChannel::Success,
                ..
            }
        ));
        assert_eq!(channels.counts().successes, 0);
    }
}
