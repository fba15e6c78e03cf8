//! Masthead core - head-state data model and reconciliation engine.
//!
//! This crate holds the pure half of masthead: the types a declaring
//! component uses to describe its desired document head, the reducer that
//! folds every mounted declaration into one canonical [`HeadState`], and the
//! server-side serializer that turns that state into escaped markup
//! fragments. Nothing in this crate touches a document or schedules work;
//! the client-side half lives in `masthead-dom` and `masthead-effect`.
//!
//! ## Architecture
//!
//! - [`attrs`]: ordered attribute maps with valueless-flag support
//! - [`tags`]: tag categories, primary-attribute tables, the marker attribute
//! - [`props`]: [`HeadProps`], one component's declared head-state
//! - [`declare`]: normalization of declared tag nodes into [`HeadProps`]
//! - [`reduce`]: the deepest-wins reducer, `&[HeadProps] -> HeadState`
//! - [`state`]: the canonical reduced [`HeadState`]
//! - [`server`]: escaped markup fragments for server rendering
//!
//! ## Example
//!
//! ```
//! use masthead_core::{attrs, reduce_props, HeadProps};
//!
//! let outer = HeadProps::new()
//! 	.title("Fallback")
//! 	.meta(attrs! { "name" => "description", "content" => "outer" });
//! let inner = HeadProps::new()
//! 	.title("Article")
//! 	.meta(attrs! { "name" => "description", "content" => "inner" });
//!
//! let state = reduce_props(&[outer, inner]);
//! assert_eq!(state.title.as_deref(), Some("Article"));
//! assert_eq!(state.meta_tags.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod attrs;
pub mod declare;
pub mod props;
pub mod reduce;
pub mod server;
pub mod state;
pub mod tags;

pub use attrs::{AttrMap, AttrValue};
pub use declare::{props_from_declarations, Declaration, DeclaredTag, NormalizeError};
pub use props::HeadProps;
pub use reduce::reduce_props;
pub use server::{escape_html, ServerHeadState};
pub use state::HeadState;
pub use tags::{TagCategory, MARKER_ATTRIBUTE, VALID_TAG_NAMES};
