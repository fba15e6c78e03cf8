//! Deferred-flush scheduling.
//!
//! Client-side commits do not run inline: every structural change requests
//! a flush tagged with the context's current generation, and only the
//! latest generation is honored when the flush actually runs. The flush is
//! handed to a process-wide scheduler hook when one is installed (a host
//! would pass its microtask/next-tick primitive); otherwise it queues in a
//! thread-local and is drained by an explicit [`flush`], which is also the
//! mode tests run in.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::OnceLock;

/// A deferred flush, ready to run on the scheduling thread.
pub type ScheduledTask = Box<dyn FnOnce() + Send>;

/// The host-provided scheduling primitive.
pub type SchedulerFn = Box<dyn Fn(ScheduledTask) + Send + Sync>;

static SCHEDULER: OnceLock<SchedulerFn> = OnceLock::new();

/// Installs the process-wide scheduler used to defer flushes.
///
/// Should be called once at application startup; later installations are
/// ignored. A host event loop would pass its next-tick primitive here.
/// When no scheduler is installed, pending flushes accumulate in a
/// thread-local queue and run on the next explicit [`flush`] call.
pub fn set_scheduler<F>(scheduler: F)
where
	F: Fn(ScheduledTask) + Send + Sync + 'static,
{
	let _ = SCHEDULER.set(Box::new(scheduler));
}

thread_local! {
	static PENDING: RefCell<VecDeque<(u64, u64)>> = const { RefCell::new(VecDeque::new()) };
}

/// Requests a deferred flush of `context_id` at `generation`.
pub(crate) fn schedule(context_id: u64, generation: u64) {
	if let Some(scheduler) = SCHEDULER.get() {
		scheduler(Box::new(move || {
			crate::registry::run_flush(context_id, generation);
		}));
	} else {
		PENDING.with(|queue| queue.borrow_mut().push_back((context_id, generation)));
	}
}

/// Drains this thread's pending flush queue.
///
/// Superseded requests no-op on their stale generation, so a burst of
/// synchronous changes still commits exactly once. Flushes enqueued while
/// draining (for example by a state-change callback mounting another
/// declaration) are drained in the same call.
pub fn flush() {
	loop {
		let next = PENDING.with(|queue| queue.borrow_mut().pop_front());
		match next {
			Some((context_id, generation)) => crate::registry::run_flush(context_id, generation),
			None => break,
		}
	}
}
