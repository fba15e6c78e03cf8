//! Masthead - declarative document-head management.
//!
//! Components anywhere in a UI tree declare the `<head>`, `<html>` and
//! `<body>` state they want - title, meta, link, script, style and base
//! tags, root attributes - and masthead folds every mounted declaration
//! into one canonical state, deepest component winning ties. On the client
//! the result is committed to the document with minimal mutation; on the
//! server it is rendered to escaped markup fragments for any templating
//! layer.
//!
//! ## Architecture
//!
//! - [`core`](masthead_core): declaration records, the deepest-wins
//!   reducer, and the server serializer
//! - [`dom`](masthead_dom): the in-memory document and the diffing
//!   committer with marker-attribute ownership
//! - [`effect`](masthead_effect): the side-effect registry, coalescing
//!   scheduler and provider scope
//!
//! ## Client example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use masthead::{attrs, flush, Document, HeadContext, HeadProps};
//!
//! let document = Rc::new(RefCell::new(Document::new()));
//! let context = HeadContext::client(document.clone());
//!
//! // an app shell and a deeper page component both declare head state
//! context.mount(
//! 	HeadProps::new()
//! 		.default_title("Acme")
//! 		.title_template("%s | Acme")
//! 		.html_attrs(attrs! { "lang" => "en" }),
//! );
//! context.mount(HeadProps::new().title("Dashboard"));
//!
//! flush();
//! assert_eq!(document.borrow().title(), "Dashboard | Acme");
//! ```
//!
//! ## Server example
//!
//! ```
//! use masthead::{attrs, HeadContext, HeadProps};
//!
//! let context = HeadContext::server();
//! context.mount(
//! 	HeadProps::new()
//! 		.title("Hello")
//! 		.meta(attrs! { "name" => "description", "content" => "SSR" }),
//! );
//!
//! let server_state = context.rewind();
//! assert!(server_state.title.contains("Hello"));
//! assert!(server_state.meta.contains("description"));
//! ```

#![warn(missing_docs)]

pub use masthead_core as core;
pub use masthead_dom as dom;
pub use masthead_effect as effect;

pub use masthead_core::attrs::{AttrMap, AttrValue};
pub use masthead_core::declare::{
	props_from_declarations, Declaration, DeclaredTag, NormalizeError,
};
pub use masthead_core::props::HeadProps;
pub use masthead_core::reduce::reduce_props;
pub use masthead_core::server::{escape_html, ServerHeadState};
pub use masthead_core::state::HeadState;
pub use masthead_core::tags::{TagCategory, MARKER_ATTRIBUTE, VALID_TAG_NAMES};
pub use masthead_core::attrs;
pub use masthead_dom::{CommitError, CommitResult, Document, DomCommitter, ElementId};
pub use masthead_effect::{
	flush, set_scheduler, ClientStateCallback, HeadContext, HeadProvider, InstanceId,
};
