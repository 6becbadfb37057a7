//! Serialized speech output.
//!
//! At most one utterance is audible at any time: issuing a new `speak`
//! cancels whatever is in flight before the new utterance starts, and the
//! newest request always wins. There is no queue. When the synthesis
//! capability is absent the channel is a silent no-op.

use crate::config::SpeechTuning;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Speech synthesis port.
///
/// Implementations must honor the cancellation token: once it fires, stop
/// rendering as soon as practical and return. Returning `Ok` after
/// cancellation is fine; the channel only logs errors.
#[async_trait]
pub trait SpeechSynth: Send + Sync {
    /// Render one utterance to completion or until cancelled.
    async fn utter(&self, text: &str, tuning: SpeechTuning, cancel: CancellationToken)
    -> Result<()>;
}

struct ActiveUtterance {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Last-write-wins speech output channel.
pub struct SpeechFeedbackChannel {
    synth: Option<Arc<dyn SpeechSynth>>,
    tuning: SpeechTuning,
    active: Mutex<Option<ActiveUtterance>>,
    /// Generation of the utterance currently being rendered, 0 when idle.
    speaking: Arc<AtomicU64>,
    next_generation: AtomicU64,
}

impl std::fmt::Debug for SpeechFeedbackChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechFeedbackChannel")
            .field("enabled", &self.enabled())
            .field("speaking", &self.is_speaking())
            .finish()
    }
}

impl SpeechFeedbackChannel {
    /// Create a channel over the given synthesis port. Pass `None` when the
    /// capability is absent; every `speak` then becomes a no-op.
    pub fn new(synth: Option<Arc<dyn SpeechSynth>>, tuning: SpeechTuning) -> Self {
        Self {
            synth,
            tuning,
            active: Mutex::new(None),
            speaking: Arc::new(AtomicU64::new(0)),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Whether a synthesis backend is attached at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.synth.is_some()
    }

    /// Queue an utterance, cancelling any in-flight one first.
    ///
    /// Cancellation is synchronous: by the time this returns, the previous
    /// utterance's token has fired. Must be called from within a Tokio
    /// runtime.
    pub fn speak(&self, text: &str) {
        let Some(synth) = self.synth.clone() else {
            debug!("speech synthesis unavailable, dropping utterance");
            return;
        };

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();
        let child = token.clone();
        let speaking = Arc::clone(&self.speaking);
        let tuning = self.tuning;
        let text = text.to_owned();

        let mut active = self.active_guard();
        if let Some(previous) = active.take() {
            debug!("cancelling in-flight utterance");
            previous.cancel.cancel();
        }

        let handle = tokio::spawn(async move {
            speaking.store(generation, Ordering::SeqCst);
            if let Err(e) = synth.utter(&text, tuning, child).await {
                warn!("speech synthesis failed: {e}");
            }
            // Only clear the flag if a newer utterance hasn't claimed it.
            let _ = speaking.compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst);
        });

        *active = Some(ActiveUtterance {
            cancel: token,
            handle,
        });
    }

    /// Advisory check used to gate notification announcements. Does not
    /// affect the utterance itself.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst) != 0
    }

    fn active_guard(&self) -> MutexGuard<'_, Option<ActiveUtterance>> {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Drop for SpeechFeedbackChannel {
    fn drop(&mut self) {
        if let Some(active) = self.active_guard().take() {
            active.cancel.cancel();
            active.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::test_utils::ScriptedSynth;
    use std::time::Duration;

    #[tokio::test]
    async fn absent_capability_is_a_silent_noop() {
        let channel = SpeechFeedbackChannel::new(None, SpeechTuning::default());
        channel.speak("nobody hears this");
        assert!(!channel.enabled());
        assert!(!channel.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn newest_utterance_wins() {
        let synth = Arc::new(ScriptedSynth::with_delay(Duration::from_secs(5)));
        let channel = SpeechFeedbackChannel::new(
            Some(Arc::clone(&synth) as Arc<dyn SpeechSynth>),
            SpeechTuning::default(),
        );

        channel.speak("first");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(channel.is_speaking());

        channel.speak("second");
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(synth.started(), vec!["first", "second"]);
        // The first utterance was cancelled mid-render and never finished.
        assert_eq!(synth.finished(), vec!["second"]);
        assert!(!channel.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_fire_leaves_only_the_last_audible() {
        let synth = Arc::new(ScriptedSynth::with_delay(Duration::from_millis(100)));
        let channel = SpeechFeedbackChannel::new(
            Some(Arc::clone(&synth) as Arc<dyn SpeechSynth>),
            SpeechTuning::default(),
        );

        channel.speak("one");
        channel.speak("two");
        channel.speak("three");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(synth.finished(), vec!["three"]);
    }

    #[tokio::test(start_paused = true)]
    async fn speaking_flag_clears_after_completion() {
        let synth = Arc::new(ScriptedSynth::with_delay(Duration::from_secs(2)));
        let channel = SpeechFeedbackChannel::new(
            Some(Arc::clone(&synth) as Arc<dyn SpeechSynth>),
            SpeechTuning::default(),
        );

        channel.speak("short line");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(channel.is_speaking());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!channel.is_speaking());
        assert_eq!(synth.finished(), vec!["short line"]);
    }
}
