//! Countdown Presenter
//!
//! Live remaining-time view towards a target instant.
//!
//! States are `Counting` and `Complete`. While counting, a repeating timer
//! recomputes the remaining time every tick and publishes it on a watch
//! channel. On reaching the target the view becomes
//! [`CountdownView::Complete`], the completion callback runs once, and the
//! timer stops.
//!
//! Activating again (new target) or deactivating always stops the previous
//! timer first, so at most one timer runs per presenter. Once `deactivate`
//! returns, the stopped timer never runs its callback, even when its final
//! tick was already executing on another worker.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::clock::Clock;
use crate::domain::entities::CountdownView;
use crate::domain::services::countdown_view;
use crate::error::GuestError;

/// Runs once when a countdown reaches its target
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

type CallbackSlot = Arc<Mutex<Option<CompletionCallback>>>;

/// Handles to one running timer
struct Activation {
    cancel: CancellationToken,
    on_complete: CallbackSlot,
    task: JoinHandle<()>,
}

/// Countdown presenter
///
/// Must be activated from within a Tokio runtime.
pub struct CountdownPresenter<C>
where
    C: Clock,
{
    clock: Arc<C>,
    tick: Duration,
    view_tx: watch::Sender<CountdownView>,
    active: Option<Activation>,
}

impl<C> CountdownPresenter<C>
where
    C: Clock,
{
    pub fn new(clock: Arc<C>, tick: Duration) -> Self {
        let (view_tx, _) = watch::channel(CountdownView::Complete);
        Self {
            clock,
            tick,
            view_tx,
            active: None,
        }
    }

    /// Start counting towards `target`, replacing any previous countdown
    ///
    /// The initial view is published before this returns.
    pub fn activate(&mut self, target: DateTime<Utc>, on_complete: Option<CompletionCallback>) {
        self.deactivate();

        let remaining_ms = (target - self.clock.now()).num_milliseconds();
        self.view_tx.send_replace(countdown_view(remaining_ms));

        let deadline = Instant::now() + Duration::from_millis(remaining_ms.max(0) as u64);
        let cancel = CancellationToken::new();
        let on_complete: CallbackSlot = Arc::new(Mutex::new(on_complete));

        tracing::debug!(until = %target, remaining_ms, "Countdown activated");
        let task = tokio::spawn(run_countdown(
            deadline,
            self.tick,
            self.view_tx.clone(),
            cancel.clone(),
            on_complete.clone(),
        ));
        self.active = Some(Activation {
            cancel,
            on_complete,
            task,
        });
    }

    /// Start counting towards an RFC 3339 timestamp
    ///
    /// An unparseable target counts as already reached.
    pub fn activate_str(&mut self, target: &str, on_complete: Option<CompletionCallback>) {
        let target = match DateTime::parse_from_rfc3339(target) {
            Ok(t) => t.with_timezone(&Utc),
            Err(e) => {
                GuestError::InvalidCountdownTarget(format!("{target}: {e}")).log();
                DateTime::<Utc>::MIN_UTC
            }
        };
        self.activate(target, on_complete);
    }

    /// Stop the running timer, if any
    ///
    /// Safe to call repeatedly. No completion callback fires afterwards.
    pub fn deactivate(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.cancel.cancel();
        // Waits out a callback that is already running
        if let Ok(mut slot) = active.on_complete.lock() {
            slot.take();
        }
        active.task.abort();
    }

    /// Whether a timer is still running
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Latest published view
    pub fn current(&self) -> CountdownView {
        *self.view_tx.borrow()
    }

    /// Observe every published view
    pub fn subscribe(&self) -> watch::Receiver<CountdownView> {
        self.view_tx.subscribe()
    }
}

impl<C> Drop for CountdownPresenter<C>
where
    C: Clock,
{
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn run_countdown(
    deadline: Instant,
    tick: Duration,
    tx: watch::Sender<CountdownView>,
    cancel: CancellationToken,
    on_complete: CallbackSlot,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        let view = countdown_view(remaining.as_millis() as i64);
        if cancel.is_cancelled() {
            break;
        }
        tx.send_replace(view);

        if view.is_complete() {
            tracing::info!("Countdown complete");
            fire_once(&cancel, &on_complete);
            break;
        }
    }
}

/// Run the callback unless the timer was cancelled
///
/// The slot lock is held while the callback runs, so a concurrent
/// `deactivate` either clears the slot first or waits for the callback.
fn fire_once(cancel: &CancellationToken, on_complete: &CallbackSlot) {
    let Ok(mut slot) = on_complete.lock() else {
        return;
    };
    if cancel.is_cancelled() {
        return;
    }
    if let Some(callback) = slot.take() {
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn presenter() -> (CountdownPresenter<FixedClock>, DateTime<Utc>) {
        let now = Utc::now();
        (
            CountdownPresenter::new(Arc::new(FixedClock(now)), Duration::from_secs(1)),
            now,
        )
    }

    fn counter() -> (Arc<AtomicUsize>, CompletionCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = count.clone();
        (
            count,
            Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_view_and_completion() {
        let (mut presenter, now) = presenter();
        let (fired, callback) = counter();

        presenter.activate(now + chrono::Duration::seconds(90), Some(callback));
        assert_eq!(presenter.current().to_string(), "01:30");
        assert!(presenter.is_active());

        tokio::time::sleep(Duration::from_millis(30_500)).await;
        assert_eq!(presenter.current().to_string(), "01:00");
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(presenter.current().is_complete());
        assert_eq!(presenter.current().to_string(), "Available now");
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!presenter.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_published_in_order() {
        let (mut presenter, now) = presenter();
        let mut rx = presenter.subscribe();

        presenter.activate(now + chrono::Duration::seconds(3), None);

        let mut seen = vec![rx.borrow_and_update().to_string()];
        while rx.changed().await.is_ok() {
            let view = *rx.borrow_and_update();
            seen.push(view.to_string());
            if view.is_complete() {
                break;
            }
        }

        assert_eq!(seen.first().map(String::as_str), Some("00:03"));
        assert_eq!(seen.last().map(String::as_str), Some("Available now"));
        assert!(seen.contains(&"00:01".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_stops_timer() {
        let (mut presenter, now) = presenter();
        let (fired, callback) = counter();

        presenter.activate(now + chrono::Duration::seconds(5), Some(callback));
        presenter.deactivate();
        presenter.deactivate();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!presenter.is_active());
        assert_eq!(presenter.current().to_string(), "00:05");
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_target_replaces_old_timer() {
        let (mut presenter, now) = presenter();
        let (old_fired, old_callback) = counter();
        let (new_fired, new_callback) = counter();

        presenter.activate(now + chrono::Duration::seconds(5), Some(old_callback));
        presenter.activate(now + chrono::Duration::seconds(10), Some(new_callback));

        tokio::time::sleep(Duration::from_millis(7_500)).await;
        assert_eq!(old_fired.load(Ordering::SeqCst), 0);
        assert_eq!(presenter.current().to_string(), "00:03");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(old_fired.load(Ordering::SeqCst), 0);
        assert_eq!(new_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_target_completes_immediately() {
        let (mut presenter, now) = presenter();
        let (fired, callback) = counter();

        presenter.activate(now - chrono::Duration::seconds(1), Some(callback));
        assert!(presenter.current().is_complete());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_target_completes() {
        let (mut presenter, _) = presenter();
        let (fired, callback) = counter();

        presenter.activate_str("not-a-date", Some(callback));
        assert!(presenter.current().is_complete());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_neither_publishes_nor_fires() {
        let (fired, callback) = counter();
        let (tx, rx) = watch::channel(countdown_view(5_000));
        let cancel = CancellationToken::new();
        cancel.cancel();

        run_countdown(
            Instant::now(),
            Duration::from_secs(1),
            tx,
            cancel,
            Arc::new(Mutex::new(Some(callback))),
        )
        .await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(rx.borrow().to_string(), "00:05");
    }

    #[test]
    fn test_fire_once_checks_token_under_lock() {
        let (fired, callback) = counter();
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(callback)));
        let cancel = CancellationToken::new();

        cancel.cancel();
        fire_once(&cancel, &slot);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let live = CancellationToken::new();
        fire_once(&live, &slot);
        fire_once(&live, &slot);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_callback_after_deactivate_returns_on_worker_pool() {
        for _ in 0..50 {
            let mut presenter = CountdownPresenter::new(
                Arc::new(crate::domain::clock::SystemClock),
                Duration::from_millis(1),
            );
            let (fired, callback) = counter();

            // Already due, so the first tick completes on another worker
            presenter.activate(Utc::now(), Some(callback));
            tokio::task::yield_now().await;
            presenter.deactivate();

            let seen = fired.load(Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert_eq!(fired.load(Ordering::SeqCst), seen);
            assert!(seen <= 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (mut presenter, now) = presenter();
        let (fired, callback) = counter();

        presenter.activate(now + chrono::Duration::seconds(2), Some(callback));
        drop(presenter);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
