//! Tag categories and identity tables.

use serde::{Deserialize, Serialize};

/// The reserved attribute stamped on every document node masthead manages.
///
/// On managed head tags it carries the value `"true"`; on the `html`,
/// `body` and `title` elements it lists, comma-sorted, the attribute names
/// masthead currently owns there.
pub const MARKER_ATTRIBUTE: &str = "data-masthead";

/// Tag names a declaring component may use.
pub const VALID_TAG_NAMES: [&str; 9] = [
	"base", "body", "html", "link", "meta", "noscript", "script", "style", "title",
];

/// Attribute keys that address element content rather than an attribute.
pub(crate) fn is_content_key(name: &str) -> bool {
	name == "innerHTML" || name == "cssText"
}

/// Attribute keys matched with exact case against primary-attribute sets.
///
/// These are camelCase by convention and must not be lowercased.
pub(crate) fn is_exact_case_key(name: &str) -> bool {
	matches!(name, "innerHTML" | "cssText" | "itemProp")
}

/// A head tag category that reduces to an ordered tag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TagCategory {
	/// `<base>` - at most one survives reduction.
	Base,
	/// `<link>` tags.
	Link,
	/// `<meta>` tags.
	Meta,
	/// `<noscript>` tags (content-bearing).
	Noscript,
	/// `<script>` tags (content-bearing).
	Script,
	/// `<style>` tags (content-bearing).
	Style,
}

impl TagCategory {
	/// All categories, in commit/serialization order.
	pub const ALL: [TagCategory; 6] = [
		TagCategory::Base,
		TagCategory::Link,
		TagCategory::Meta,
		TagCategory::Noscript,
		TagCategory::Script,
		TagCategory::Style,
	];

	/// The HTML tag name for this category.
	pub fn tag_name(self) -> &'static str {
		match self {
			TagCategory::Base => "base",
			TagCategory::Link => "link",
			TagCategory::Meta => "meta",
			TagCategory::Noscript => "noscript",
			TagCategory::Script => "script",
			TagCategory::Style => "style",
		}
	}

	/// The ordered set of attribute names that can establish tag identity.
	pub fn primary_attributes(self) -> &'static [&'static str] {
		match self {
			TagCategory::Base => &["href"],
			TagCategory::Link => &["rel", "href"],
			TagCategory::Meta => &["name", "charset", "http-equiv", "property", "itemprop"],
			TagCategory::Noscript => &["innerHTML"],
			TagCategory::Script => &["src", "innerHTML"],
			TagCategory::Style => &["cssText"],
		}
	}

	/// Whether tags of this category render text content between open and
	/// close tags; the rest are emitted self-closing.
	pub fn carries_content(self) -> bool {
		matches!(
			self,
			TagCategory::Noscript | TagCategory::Script | TagCategory::Style
		)
	}
}

impl std::fmt::Display for TagCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.tag_name())
	}
}
