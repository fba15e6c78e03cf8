//! The side-effect registry.
//!
//! A [`HeadContext`] owns the ordered list of mounted declarations. The
//! host framework registers a [`HeadProps`] snapshot when a declaring
//! component mounts, replaces it on update and removes it on unmount;
//! the registry never reaches into host component internals, it only holds
//! snapshots behind opaque [`InstanceId`] handles.
//!
//! In client mode each structural change bumps the context generation and
//! requests a deferred flush; the flush that still matches the generation
//! reduces, commits and notifies, the rest no-op. In server mode there is
//! nothing to schedule: the state is reduced synchronously and kept for
//! [`HeadContext::rewind`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use masthead_core::props::HeadProps;
use masthead_core::reduce::reduce_props;
use masthead_core::server::ServerHeadState;
use masthead_core::state::HeadState;
use masthead_dom::{CommitResult, Document, DomCommitter};

use crate::scheduler;

/// Callback invoked after each client commit with the new canonical state
/// and the elements the commit added and removed.
pub type ClientStateCallback = Rc<dyn Fn(&HeadState, &CommitResult)>;

/// Opaque handle to a mounted declaring instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

struct Instance {
	id: InstanceId,
	props: HeadProps,
	on_change: Option<ClientStateCallback>,
}

enum Mode {
	Client {
		document: Rc<RefCell<Document>>,
		committer: DomCommitter,
	},
	Server,
}

struct ContextInner {
	context_id: u64,
	mode: Mode,
	instances: Vec<Instance>,
	next_instance: u64,
	generation: u64,
	scheduled: bool,
	state: Option<HeadState>,
}

thread_local! {
	static CONTEXTS: RefCell<BTreeMap<u64, Weak<RefCell<ContextInner>>>> =
		RefCell::new(BTreeMap::new());
	static NEXT_CONTEXT_ID: Cell<u64> = const { Cell::new(0) };
}

/// The registry coordinating every declaring instance in one scope.
///
/// Cloning is cheap and shares the same underlying registry, the way a
/// provider hands the context down a component tree.
#[derive(Clone)]
pub struct HeadContext {
	inner: Rc<RefCell<ContextInner>>,
}

impl HeadContext {
	/// Creates a client-mode context committing to `document`.
	pub fn client(document: Rc<RefCell<Document>>) -> Self {
		Self::with_mode(Mode::Client {
			document,
			committer: DomCommitter::new(),
		})
	}

	/// Creates a server-mode context: registrations reduce synchronously
	/// and no document commit ever runs.
	pub fn server() -> Self {
		Self::with_mode(Mode::Server)
	}

	fn with_mode(mode: Mode) -> Self {
		let context_id = NEXT_CONTEXT_ID.with(|next| {
			let id = next.get();
			next.set(id + 1);
			id
		});
		let inner = Rc::new(RefCell::new(ContextInner {
			context_id,
			mode,
			instances: Vec::new(),
			next_instance: 0,
			generation: 0,
			scheduled: false,
			state: None,
		}));
		CONTEXTS.with(|contexts| {
			contexts
				.borrow_mut()
				.insert(context_id, Rc::downgrade(&inner));
		});
		Self { inner }
	}

	/// Whether this context commits to a document.
	pub fn is_client(&self) -> bool {
		matches!(self.inner.borrow().mode, Mode::Client { .. })
	}

	/// Whether this context is server-mode.
	pub fn is_server(&self) -> bool {
		!self.is_client()
	}

	/// Whether a flush is currently scheduled and not yet run.
	pub fn is_scheduled(&self) -> bool {
		self.inner.borrow().scheduled
	}

	/// The document this context commits to, in client mode.
	pub fn document(&self) -> Option<Rc<RefCell<Document>>> {
		match &self.inner.borrow().mode {
			Mode::Client { document, .. } => Some(document.clone()),
			Mode::Server => None,
		}
	}

	/// Registers a newly mounted declaring instance.
	pub fn mount(&self, props: HeadProps) -> InstanceId {
		self.mount_inner(props, None)
	}

	/// Registers a mounted instance together with its client-state-change
	/// callback. Across instances the innermost declared callback wins.
	pub fn mount_with_callback(&self, props: HeadProps, callback: ClientStateCallback) -> InstanceId {
		self.mount_inner(props, Some(callback))
	}

	fn mount_inner(&self, props: HeadProps, on_change: Option<ClientStateCallback>) -> InstanceId {
		let id = {
			let mut inner = self.inner.borrow_mut();
			let id = InstanceId(inner.next_instance);
			inner.next_instance += 1;
			inner.instances.push(Instance {
				id,
				props,
				on_change,
			});
			id
		};
		self.emit_change();
		id
	}

	/// Replaces a mounted instance's declaration after a re-render.
	///
	/// # Panics
	///
	/// Panics if the instance was never mounted or already unmounted.
	pub fn update(&self, id: InstanceId, props: HeadProps) {
		{
			let mut inner = self.inner.borrow_mut();
			let instance = inner
				.instances
				.iter_mut()
				.find(|instance| instance.id == id)
				.unwrap_or_else(|| panic!("update of unknown head instance {id:?}"));
			instance.props = props;
		}
		self.emit_change();
	}

	/// Removes an unmounting instance's declaration. Unknown handles are
	/// ignored, so unmount is idempotent.
	pub fn unmount(&self, id: InstanceId) {
		{
			let mut inner = self.inner.borrow_mut();
			inner.instances.retain(|instance| instance.id != id);
		}
		self.emit_change();
	}

	/// The latest computed canonical state, if any. No side effects; valid
	/// in both modes.
	pub fn peek(&self) -> Option<HeadState> {
		self.inner.borrow().state.clone()
	}

	/// Consumes the server-rendered state, clearing the registry.
	///
	/// Returns the serialization of the empty state when nothing was ever
	/// computed, never an absent value.
	///
	/// # Panics
	///
	/// Panics when called on a client context - rewinding is a server-only
	/// operation; use [`HeadContext::peek`] on the client.
	pub fn rewind(&self) -> ServerHeadState {
		let mut inner = self.inner.borrow_mut();
		if matches!(inner.mode, Mode::Client { .. }) {
			panic!("rewind() may only be called on the server; call peek() to read the current state");
		}
		let state = inner.state.take();
		inner.instances.clear();
		match state {
			Some(state) => ServerHeadState::from_state(&state),
			None => ServerHeadState::from_state(&HeadState::empty()),
		}
	}

	fn emit_change(&self) {
		let scheduled = {
			let mut inner = self.inner.borrow_mut();
			match inner.mode {
				Mode::Server => {
					let props: Vec<HeadProps> =
						inner.instances.iter().map(|i| i.props.clone()).collect();
					inner.state = Some(reduce_props(&props));
					None
				}
				Mode::Client { .. } => {
					inner.generation += 1;
					inner.scheduled = true;
					Some((inner.context_id, inner.generation))
				}
			}
		};
		// the scheduler may run the task inline; no borrow may be live
		if let Some((context_id, generation)) = scheduled {
			scheduler::schedule(context_id, generation);
		}
	}
}

impl std::fmt::Debug for HeadContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("HeadContext")
			.field("context_id", &inner.context_id)
			.field("client", &matches!(inner.mode, Mode::Client { .. }))
			.field("instances", &inner.instances.len())
			.field("generation", &inner.generation)
			.finish()
	}
}

/// Runs a scheduled flush if its context is alive and the generation is
/// still current.
pub(crate) fn run_flush(context_id: u64, generation: u64) {
	let weak = CONTEXTS.with(|contexts| contexts.borrow().get(&context_id).cloned());
	let Some(weak) = weak else { return };
	let Some(inner) = weak.upgrade() else {
		CONTEXTS.with(|contexts| {
			contexts.borrow_mut().remove(&context_id);
		});
		return;
	};
	flush_context(&inner, generation);
}

fn flush_context(rc: &Rc<RefCell<ContextInner>>, generation: u64) {
	let (state, document, callback) = {
		let mut inner = rc.borrow_mut();
		if generation != inner.generation {
			debug!(generation, current = inner.generation, "skipping superseded flush");
			return;
		}
		inner.scheduled = false;
		let props: Vec<HeadProps> = inner.instances.iter().map(|i| i.props.clone()).collect();
		let state = reduce_props(&props);
		inner.state = Some(state.clone());
		let callback = inner
			.instances
			.iter()
			.rev()
			.find_map(|instance| instance.on_change.clone());
		let document = match &inner.mode {
			Mode::Client { document, .. } => document.clone(),
			Mode::Server => return,
		};
		(state, document, callback)
	};

	let result = {
		let mut inner = rc.borrow_mut();
		let Mode::Client { committer, .. } = &mut inner.mode else {
			return;
		};
		committer.commit(&mut document.borrow_mut(), &state)
	};
	let result = match result {
		Ok(result) => result,
		// the environment is malformed; this is not recoverable
		Err(error) => panic!("masthead: fatal commit failure: {error}"),
	};

	// invoked outside any borrow so the callback may call back into the
	// context (peek, mount, ...)
	if let Some(callback) = callback {
		callback(&state, &result);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use masthead_core::attrs;
	use masthead_core::tags::TagCategory;

	use crate::scheduler::flush;

	fn client_context() -> (HeadContext, Rc<RefCell<Document>>) {
		let document = Rc::new(RefCell::new(Document::new()));
		(HeadContext::client(document.clone()), document)
	}

	#[test]
	fn test_server_mount_reduces_synchronously() {
		let context = HeadContext::server();
		context.mount(HeadProps::new().title("One"));
		assert_eq!(context.peek().unwrap().title.as_deref(), Some("One"));

		context.mount(HeadProps::new().title("Two"));
		assert_eq!(context.peek().unwrap().title.as_deref(), Some("Two"));
	}

	#[test]
	fn test_server_update_and_unmount() {
		let context = HeadContext::server();
		let outer = context.mount(HeadProps::new().title("Outer"));
		let inner = context.mount(HeadProps::new().title("Inner"));

		context.update(inner, HeadProps::new().title("Inner v2"));
		assert_eq!(context.peek().unwrap().title.as_deref(), Some("Inner v2"));

		context.unmount(inner);
		assert_eq!(context.peek().unwrap().title.as_deref(), Some("Outer"));

		context.unmount(outer);
		assert!(context.peek().unwrap().title.is_none());
	}

	#[test]
	fn test_rewind_consumes_state() {
		let context = HeadContext::server();
		context.mount(
			HeadProps::new()
				.title("Served")
				.meta(attrs! { "charset" => "utf-8" }),
		);

		let server_state = context.rewind();
		assert!(server_state.title.contains("Served"));
		assert!(server_state.meta.contains("charset"));

		// one-shot: the registry is cleared
		assert!(context.peek().is_none());
		let again = context.rewind();
		assert_eq!(again.title, "<title data-masthead=\"true\"></title>");
	}

	#[test]
	fn test_rewind_without_state_returns_empty_serialization() {
		let context = HeadContext::server();
		let server_state = context.rewind();
		assert_eq!(server_state.meta, "");
		assert_eq!(server_state.title, "<title data-masthead=\"true\"></title>");
	}

	#[test]
	#[should_panic(expected = "rewind() may only be called on the server")]
	fn test_rewind_on_client_panics() {
		let (context, _document) = client_context();
		context.rewind();
	}

	#[test]
	fn test_client_defers_commit_until_flush() {
		let (context, document) = client_context();
		context.mount(HeadProps::new().title("Deferred"));

		assert!(context.is_scheduled());
		assert_eq!(document.borrow().title(), "");
		assert!(context.peek().is_none());

		flush();

		assert!(!context.is_scheduled());
		assert_eq!(document.borrow().title(), "Deferred");
		assert_eq!(context.peek().unwrap().title.as_deref(), Some("Deferred"));
	}

	#[test]
	fn test_client_coalesces_synchronous_mounts() {
		let (context, document) = client_context();
		let calls: Rc<RefCell<Vec<HeadState>>> = Rc::new(RefCell::new(Vec::new()));
		let seen = calls.clone();

		context.mount(HeadProps::new().title("A"));
		context.mount_with_callback(
			HeadProps::new().meta(attrs! { "name" => "d", "content" => "x" }),
			Rc::new(move |state, _result| seen.borrow_mut().push(state.clone())),
		);
		context.mount(HeadProps::new().title("C"));

		flush();

		// exactly one commit, reflecting all three declarations
		assert_eq!(calls.borrow().len(), 1);
		let state = &calls.borrow()[0];
		assert_eq!(state.title.as_deref(), Some("C"));
		assert_eq!(state.meta_tags.len(), 1);
		assert_eq!(document.borrow().title(), "C");
	}

	#[test]
	fn test_callback_receives_added_and_removed() {
		let (context, _document) = client_context();
		let deltas: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
		let seen = deltas.clone();

		let id = context.mount_with_callback(
			HeadProps::new().meta(attrs! { "name" => "d", "content" => "1" }),
			Rc::new(move |_state, result| {
				let added = result.added.values().map(Vec::len).sum();
				let removed = result.removed.values().map(Vec::len).sum();
				seen.borrow_mut().push((added, removed));
			}),
		);
		flush();

		context.update(id, HeadProps::new().meta(attrs! { "name" => "d", "content" => "2" }));
		flush();

		context.unmount(id);
		flush();

		let recorded = deltas.borrow();
		assert_eq!(recorded[0], (1, 0));
		assert_eq!(recorded[1], (1, 1));
		// the final commit removed the last tag, but the callback was
		// unmounted with its instance
		assert_eq!(recorded.len(), 2);
	}

	#[test]
	fn test_innermost_callback_wins() {
		let (context, _document) = client_context();
		let hits: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

		let outer_hits = hits.clone();
		context.mount_with_callback(
			HeadProps::new().title("outer"),
			Rc::new(move |_, _| outer_hits.borrow_mut().push("outer")),
		);
		let inner_hits = hits.clone();
		context.mount_with_callback(
			HeadProps::new().title("inner"),
			Rc::new(move |_, _| inner_hits.borrow_mut().push("inner")),
		);

		flush();
		assert_eq!(hits.borrow().as_slice(), ["inner"]);
	}

	#[test]
	fn test_superseded_flush_is_dropped() {
		let (context, document) = client_context();
		context.mount(HeadProps::new().title("First"));
		// the second change supersedes the first scheduled flush
		context.mount(HeadProps::new().title("Second"));

		flush();
		assert_eq!(document.borrow().title(), "Second");
	}

	#[test]
	fn test_unmount_removes_committed_tags() {
		let (context, document) = client_context();
		let id = context.mount(HeadProps::new().meta(attrs! { "charset" => "utf-8" }));
		flush();

		let meta_count = |document: &Rc<RefCell<Document>>| {
			let document = document.borrow();
			let head = document.head();
			document
				.children(head)
				.iter()
				.filter(|&&c| document.tag_name(c) == "meta")
				.count()
		};
		assert_eq!(meta_count(&document), 1);

		context.unmount(id);
		flush();
		assert_eq!(meta_count(&document), 0);
	}

	#[test]
	fn test_unmount_unknown_is_idempotent() {
		let context = HeadContext::server();
		let id = context.mount(HeadProps::new());
		context.unmount(id);
		context.unmount(id);
	}

	#[test]
	#[should_panic(expected = "update of unknown head instance")]
	fn test_update_unknown_panics() {
		let context = HeadContext::server();
		let id = context.mount(HeadProps::new());
		context.unmount(id);
		context.update(id, HeadProps::new().title("x"));
	}

	#[test]
	fn test_peek_works_on_client_after_flush() {
		let (context, _document) = client_context();
		context.mount(HeadProps::new().title("Peeked"));
		flush();
		assert_eq!(context.peek().unwrap().title.as_deref(), Some("Peeked"));
	}

	#[test]
	fn test_two_contexts_flush_independently() {
		let (a, doc_a) = client_context();
		let (b, doc_b) = client_context();
		a.mount(HeadProps::new().title("A"));
		b.mount(HeadProps::new().title("B"));
		flush();
		assert_eq!(doc_a.borrow().title(), "A");
		assert_eq!(doc_b.borrow().title(), "B");
	}

	#[test]
	fn test_commit_delta_categories() {
		let (context, _document) = client_context();
		let added: Rc<RefCell<Vec<TagCategory>>> = Rc::new(RefCell::new(Vec::new()));
		let seen = added.clone();
		context.mount_with_callback(
			HeadProps::new()
				.link(attrs! { "rel" => "stylesheet", "href" => "/a.css" })
				.style(attrs! { "cssText" => "p {}" }),
			Rc::new(move |_, result| seen.borrow_mut().extend(result.added.keys().copied())),
		);
		flush();
		assert_eq!(
			added.borrow().as_slice(),
			[TagCategory::Link, TagCategory::Style]
		);
	}
}
