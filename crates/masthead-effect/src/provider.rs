//! Provider scope.
//!
//! A provider makes one [`HeadContext`] ambient for the subtree it wraps,
//! so declaring components can reach the registry without threading the
//! handle through every level. One provider is active per scope at a time;
//! nesting providers is a configuration error.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::registry::HeadContext;

thread_local! {
	static ACTIVE: RefCell<Option<HeadContext>> = const { RefCell::new(None) };
}

/// Guard holding a [`HeadContext`] installed as the ambient provider.
///
/// Dropping the guard uninstalls the provider, re-opening the scope.
pub struct HeadProvider {
	// single-threaded by construction; keeps the guard off other threads
	_not_send: PhantomData<*const ()>,
}

impl HeadProvider {
	/// Installs `context` as this scope's provider.
	///
	/// # Panics
	///
	/// Panics if a provider is already installed - providers must not
	/// nest; give each independent tree its own scope instead.
	pub fn install(context: HeadContext) -> Self {
		ACTIVE.with(|active| {
			let mut active = active.borrow_mut();
			if active.is_some() {
				panic!("a head provider is already installed; providers must not be nested");
			}
			*active = Some(context);
		});
		Self {
			_not_send: PhantomData,
		}
	}

	/// The currently installed context, if a provider is active.
	pub fn current() -> Option<HeadContext> {
		ACTIVE.with(|active| active.borrow().clone())
	}

	/// The context this guard installed.
	pub fn context(&self) -> HeadContext {
		Self::current().expect("provider guard alive but no context installed")
	}
}

impl Drop for HeadProvider {
	fn drop(&mut self) {
		ACTIVE.with(|active| {
			active.borrow_mut().take();
		});
	}
}
