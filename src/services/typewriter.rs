//! Character-by-character reveal of advice text.
//!
//! A [`Reveal`] emits growing prefixes of its text, one per `delay`, on a
//! background task. Cancelling (or dropping) the reveal stops the timer and
//! suppresses anything still queued, so a replaced text can never leak
//! characters into the display.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Growing prefixes of `text`, split on char boundaries.
///
/// `"Hola"` yields `"H"`, `"Ho"`, `"Hol"`, `"Hola"`.
pub fn prefixes(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.char_indices()
        .map(move |(i, c)| &text[..i + c.len_utf8()])
}

/// When prefix `step` (0-based) is due, or `None` if that overflows.
fn due_at(start: Instant, delay: Duration, step: usize) -> Option<Instant> {
    let n = u32::try_from(step).ok()?.checked_add(1)?;
    start.checked_add(delay.checked_mul(n)?)
}

/// A running reveal. Must be created inside a Tokio runtime.
pub struct Reveal {
    rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
}

impl Reveal {
    /// Start revealing `text`; prefix `i` (1-based) is due at `start + i * delay`.
    pub fn start(text: impl Into<String>, delay: Duration) -> Self {
        let text = text.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            for (step, prefix) in prefixes(&text).enumerate() {
                let Some(deadline) = due_at(start, delay, step) else {
                    tracing::warn!(?delay, step, "Reveal schedule out of range, stopping");
                    return;
                };
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::trace!(revealed = step, "Reveal cancelled");
                        return;
                    }
                    _ = tokio::time::sleep_until(deadline) => {}
                }
                if tx.send(prefix.to_string()).is_err() {
                    return;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Wait for the next prefix. `None` once the text is complete or cancelled.
    pub async fn next(&mut self) -> Option<String> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            prefix = self.rx.recv() => prefix,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for Reveal {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owner of at most one active [`Reveal`].
///
/// Starting a new reveal cancels the previous one first.
pub struct Typewriter {
    delay: Duration,
    active: Option<CancellationToken>,
}

impl Typewriter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            active: None,
        }
    }

    /// Restart from an empty prefix with new text.
    pub fn reveal(&mut self, text: impl Into<String>) -> Reveal {
        self.cancel();
        let reveal = Reveal::start(text, self.delay);
        self.active = Some(reveal.cancel.clone());
        reveal
    }

    /// Stop the active reveal, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(20);

    #[test]
    fn test_prefixes_ascii() {
        let all: Vec<&str> = prefixes("Hola").collect();
        assert_eq!(all, vec!["H", "Ho", "Hol", "Hola"]);
    }

    #[test]
    fn test_prefixes_multibyte() {
        let all: Vec<&str> = prefixes("más").collect();
        assert_eq!(all, vec!["m", "má", "más"]);
    }

    #[test]
    fn test_prefixes_empty() {
        assert_eq!(prefixes("").count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_timing() {
        let start = Instant::now();
        let mut reveal = Reveal::start("Hola", DELAY);

        for (i, expected) in ["H", "Ho", "Hol", "Hola"].iter().enumerate() {
            let prefix = reveal.next().await;
            assert_eq!(prefix.as_deref(), Some(*expected));

            let due = DELAY * (i as u32 + 1);
            let elapsed = start.elapsed();
            assert!(
                elapsed >= due && elapsed < due + DELAY / 2,
                "{expected:?} at {elapsed:?}, due {due:?}"
            );
        }

        assert_eq!(reveal.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_empty_text_finishes_immediately() {
        let start = Instant::now();
        let mut reveal = Reveal::start("", DELAY);

        assert_eq!(reveal.next().await, None);
        assert!(start.elapsed() < DELAY);
    }

    #[test]
    fn test_due_at_overflow() {
        let start = Instant::now();

        assert_eq!(due_at(start, DELAY, 2), Some(start + DELAY * 3));
        assert_eq!(due_at(start, Duration::MAX, 1), None);
        assert_eq!(due_at(start, DELAY, usize::MAX), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_delay_ends_reveal_cleanly() {
        let mut reveal = Reveal::start("Hola", Duration::MAX);

        assert_eq!(reveal.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_emission() {
        let mut reveal = Reveal::start("Usa más agua", DELAY);
        assert_eq!(reveal.next().await.as_deref(), Some("U"));

        reveal.cancel();

        assert!(reveal.is_cancelled());
        assert_eq!(reveal.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_queued_prefixes() {
        let mut reveal = Reveal::start("abc", DELAY);

        // Let every prefix land in the channel without reading it
        tokio::time::sleep(DELAY * 5).await;
        reveal.cancel();

        assert_eq!(reveal.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typewriter_restart_cancels_previous() {
        let mut typewriter = Typewriter::new(DELAY);

        let mut first = typewriter.reveal("abc");
        assert_eq!(first.next().await.as_deref(), Some("a"));

        let mut second = typewriter.reveal("xyz");

        assert_eq!(first.next().await, None);
        let mut seen = Vec::new();
        while let Some(prefix) = second.next().await {
            seen.push(prefix);
        }
        assert_eq!(seen, vec!["x", "xy", "xyz"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typewriter_cancel_on_teardown() {
        let mut typewriter = Typewriter::new(DELAY);
        let mut reveal = typewriter.reveal("abc");

        drop(typewriter);

        assert_eq!(reveal.next().await, None);
    }
}
