//! Masthead DOM - the document model and the diffing committer.
//!
//! The committer treats the live document as an external resource it holds
//! an ownership ledger over: every node it creates is stamped with the
//! marker attribute, root-element attributes it manages are recorded on the
//! marker, and reconciliation touches nothing it does not own. The
//! [`Document`] type is a self-contained in-memory document (element arena
//! with `html`/`head`/`body`/`title` roots), so the whole client path runs
//! and tests natively; a host embedding masthead hands the same document
//! handle to its own renderer.
//!
//! ## Example
//!
//! ```
//! use masthead_core::{attrs, reduce_props, HeadProps};
//! use masthead_dom::{Document, DomCommitter};
//!
//! let mut document = Document::new();
//! let mut committer = DomCommitter::new();
//!
//! let state = reduce_props(&[HeadProps::new()
//! 	.title("Home")
//! 	.meta(attrs! { "charset" => "utf-8" })]);
//! let result = committer.commit(&mut document, &state).unwrap();
//!
//! assert_eq!(document.title(), "Home");
//! assert_eq!(result.added.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod committer;
pub mod document;

pub use committer::{CommitError, CommitResult, DomCommitter};
pub use document::{Document, ElementId};
