use anchorconf::core::models::outcome::OutcomeChannel;
use anchorconf::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    successes: u64,
    similarity_failures: u64,
    generation_failures: u64,
}

impl Tally {
    fn record(&mut self, channel: OutcomeChannel) {
        match channel {
            OutcomeChannel::Success => self.successes += 1,
            OutcomeChannel::SimilarityFailure => self.similarity_failures += 1,
            OutcomeChannel::GenerationFailure => self.generation_failures += 1,
        }
    }

    fn message(&self) -> String {
        format!(
            "ok {} | no scaffold {} | failed {}",
            self.successes, self.similarity_failures, self.generation_failures
        )
    }
}

struct BarState {
    pb: ProgressBar,
    tally: Tally,
}

/// Renders engine progress events as an `indicatif` bar on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BarState {
                pb,
                tally: Tally::default(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut guard) = state.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            let BarState { pb, tally } = &mut *guard;

            match progress {
                Progress::PhaseStart { name } => {
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total_steps } => {
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(total_steps);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                    *tally = Tally::default();
                    pb.set_message(tally.message());
                }
                Progress::TaskIncrement => {
                    pb.inc(1);
                }
                Progress::MoleculeFinished { channel, .. } => {
                    tally.record(channel);
                    pb.set_message(tally.message());
                }
                Progress::TaskFinish => {
                    let length = pb.length().unwrap_or(0);
                    if pb.position() < length {
                        pb.set_position(length);
                    }
                    pb.finish();
                }
                Progress::Message(msg) => {
                    if !pb.is_finished() {
                        pb.println(format!("  {}", msg));
                    } else {
                        pb.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let state = handler.state.lock().unwrap();
        assert_eq!(state.pb.length(), Some(0));
        assert!(state.pb.is_finished());
        assert_eq!(state.tally, Tally::default());
    }

    #[test]
    fn callback_tracks_molecules_per_channel() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Conformer Generation",
        });
        {
            let state = handler.state.lock().unwrap();
            assert_eq!(state.pb.message(), "Conformer Generation");
            assert!(!state.pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 3 });
        for (input_index, channel) in [
            OutcomeChannel::Success,
            OutcomeChannel::GenerationFailure,
            OutcomeChannel::Success,
        ]
        .into_iter()
        .enumerate()
        {
            callback(Progress::MoleculeFinished {
                input_index,
                channel,
            });
            callback(Progress::TaskIncrement);
        }
        {
            let state = handler.state.lock().unwrap();
            assert_eq!(state.pb.position(), 3);
            assert_eq!(state.pb.message(), "ok 2 | no scaffold 0 | failed 1");
        }

        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        let state = handler.state.lock().unwrap();
        assert!(state.pb.is_finished());
        assert_eq!(state.pb.message(), "✓ Done");
    }

    #[test]
    fn task_finish_fills_the_bar() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();
        callback(Progress::TaskStart { total_steps: 10 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskFinish);
        let state = handler.state.lock().unwrap();
        assert_eq!(state.pb.position(), 10);
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Thread Test",
            });
            callback(Progress::TaskIncrement);
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let state = handler.state.lock().unwrap();
        assert!(state.pb.is_finished());
        assert_eq!(state.pb.message(), "✓ Done");
    }
}
