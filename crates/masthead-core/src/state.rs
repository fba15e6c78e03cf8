//! The canonical reduced head-state.

use serde::{Deserialize, Serialize};

use crate::attrs::AttrMap;
use crate::tags::TagCategory;

/// The single merged head-state used as the source of truth for rendering.
///
/// A `HeadState` is recomputed wholesale from the full list of mounted
/// declarations on every structural change; it is replaced, never merged.
/// The previous state only survives implicitly, as the document content the
/// committer diffs against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadState {
	/// Resolved document title, if any component declared one.
	pub title: Option<String>,
	/// Merged `<title>` element attributes.
	pub title_attrs: AttrMap,
	/// Merged root `<html>` element attributes.
	pub html_attrs: AttrMap,
	/// Merged `<body>` element attributes.
	pub body_attrs: AttrMap,
	/// The surviving `<base>` tag - zero or one entry.
	pub base_tags: Vec<AttrMap>,
	/// Deduplicated `<link>` tags in emission order.
	pub link_tags: Vec<AttrMap>,
	/// Deduplicated `<meta>` tags in emission order.
	pub meta_tags: Vec<AttrMap>,
	/// Deduplicated `<noscript>` tags in emission order.
	pub noscript_tags: Vec<AttrMap>,
	/// Deduplicated `<script>` tags in emission order.
	pub script_tags: Vec<AttrMap>,
	/// Deduplicated `<style>` tags in emission order.
	pub style_tags: Vec<AttrMap>,
}

impl HeadState {
	/// The all-empty state - what an empty declaration list reduces to.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Returns true when no field carries any resolved content.
	pub fn is_empty(&self) -> bool {
		self == &HeadState::default()
	}

	/// The resolved tag list for a category.
	pub fn tags(&self, category: TagCategory) -> &[AttrMap] {
		match category {
			TagCategory::Base => &self.base_tags,
			TagCategory::Link => &self.link_tags,
			TagCategory::Meta => &self.meta_tags,
			TagCategory::Noscript => &self.noscript_tags,
			TagCategory::Script => &self.script_tags,
			TagCategory::Style => &self.style_tags,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attrs;

	#[test]
	fn test_empty_state() {
		let state = HeadState::empty();
		assert!(state.is_empty());
		assert!(state.title.is_none());
		for category in TagCategory::ALL {
			assert!(state.tags(category).is_empty());
		}
	}

	#[test]
	fn test_serializes_to_json() {
		let state = HeadState {
			title: Some("Home".into()),
			meta_tags: vec![attrs! { "charset" => "utf-8" }],
			..HeadState::empty()
		};
		let json = serde_json::to_string(&state).unwrap();
		assert!(json.contains("\"title\":\"Home\""));
	}
}
