//! One component's declared head-state.

use serde::{Deserialize, Serialize};

use crate::attrs::AttrMap;
use crate::tags::TagCategory;

/// The head-state a single declaring component contributes.
///
/// A `HeadProps` is immutable once produced: a component's next render
/// supersedes its previous record wholesale, and unmounting removes it.
/// Field-level `Option`s distinguish "never declared" from "declared
/// empty" - `Some(String::new())` is a meaningful, explicitly-empty title.
///
/// # Example
///
/// ```
/// use masthead_core::{attrs, HeadProps};
///
/// let props = HeadProps::new()
/// 	.title("Dashboard")
/// 	.title_template("%s | Acme")
/// 	.meta(attrs! { "name" => "description", "content" => "Control panel" })
/// 	.link(attrs! { "rel" => "stylesheet", "href" => "/app.css" });
/// assert_eq!(props.metas.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadProps {
	/// Declared document title.
	pub title: Option<String>,
	/// Template applied to the resolved title; every literal `%s` is
	/// replaced with the title text.
	pub title_template: Option<String>,
	/// Title used when no component declares one.
	pub default_title: Option<String>,
	/// Attributes for the `<title>` element.
	pub title_attrs: Option<AttrMap>,
	/// Attributes for a `<base>` tag.
	pub base: Option<AttrMap>,
	/// Attributes for the root `<html>` element.
	pub html_attrs: Option<AttrMap>,
	/// Attributes for the `<body>` element.
	pub body_attrs: Option<AttrMap>,
	/// Declared `<link>` tags, in declaration order.
	pub links: Vec<AttrMap>,
	/// Declared `<meta>` tags, in declaration order.
	pub metas: Vec<AttrMap>,
	/// Declared `<noscript>` tags, in declaration order.
	pub noscripts: Vec<AttrMap>,
	/// Declared `<script>` tags, in declaration order.
	pub scripts: Vec<AttrMap>,
	/// Declared `<style>` tags, in declaration order.
	pub styles: Vec<AttrMap>,
}

impl HeadProps {
	/// Creates an empty record declaring nothing.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares the document title.
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Declares the title template; `%s` expands to the resolved title.
	pub fn title_template(mut self, template: impl Into<String>) -> Self {
		self.title_template = Some(template.into());
		self
	}

	/// Declares the fallback title.
	pub fn default_title(mut self, title: impl Into<String>) -> Self {
		self.default_title = Some(title.into());
		self
	}

	/// Declares `<title>` element attributes.
	pub fn title_attrs(mut self, attrs: AttrMap) -> Self {
		self.title_attrs = Some(attrs);
		self
	}

	/// Declares a `<base>` tag.
	pub fn base(mut self, attrs: AttrMap) -> Self {
		self.base = Some(attrs);
		self
	}

	/// Declares root `<html>` element attributes.
	pub fn html_attrs(mut self, attrs: AttrMap) -> Self {
		self.html_attrs = Some(attrs);
		self
	}

	/// Declares `<body>` element attributes.
	pub fn body_attrs(mut self, attrs: AttrMap) -> Self {
		self.body_attrs = Some(attrs);
		self
	}

	/// Appends a `<link>` tag.
	pub fn link(mut self, attrs: AttrMap) -> Self {
		self.links.push(attrs);
		self
	}

	/// Appends a `<meta>` tag.
	pub fn meta(mut self, attrs: AttrMap) -> Self {
		self.metas.push(attrs);
		self
	}

	/// Appends a `<noscript>` tag.
	pub fn noscript(mut self, attrs: AttrMap) -> Self {
		self.noscripts.push(attrs);
		self
	}

	/// Appends a `<script>` tag.
	pub fn script(mut self, attrs: AttrMap) -> Self {
		self.scripts.push(attrs);
		self
	}

	/// Appends a `<style>` tag.
	pub fn style(mut self, attrs: AttrMap) -> Self {
		self.styles.push(attrs);
		self
	}

	/// The declared tag list for an array-type category.
	///
	/// [`TagCategory::Base`] is not an array category on the input side
	/// (a record declares at most one base map) and returns an empty slice.
	pub fn category_tags(&self, category: TagCategory) -> &[AttrMap] {
		match category {
			TagCategory::Base => &[],
			TagCategory::Link => &self.links,
			TagCategory::Meta => &self.metas,
			TagCategory::Noscript => &self.noscripts,
			TagCategory::Script => &self.scripts,
			TagCategory::Style => &self.styles,
		}
	}

	/// Returns true when the record declares nothing at all.
	pub fn is_empty(&self) -> bool {
		self == &HeadProps::default()
	}
}
