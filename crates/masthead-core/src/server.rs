//! Server-side markup serialization.
//!
//! On the server there is no document to mutate; the canonical state is
//! rendered to one escaped markup string per tag category, ready to be
//! spliced into any templating layer's `<head>`, `<html ...>` and
//! `<body ...>` slots.

use std::borrow::Cow;
use std::fmt::Write;

use serde::Serialize;

use crate::attrs::{AttrMap, AttrValue};
use crate::state::HeadState;
use crate::tags::{is_content_key, TagCategory, MARKER_ATTRIBUTE};

/// Escapes HTML special characters.
///
/// Only the minimal set (`&`, `<`, `>`, `"`, `'`) is rewritten; everything
/// else - non-ASCII text included - passes through byte-identical.
pub fn escape_html(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

/// Renders an attribute map as `name="value"` pairs separated by spaces.
///
/// A valueless flag renders as the bare attribute name.
fn render_attributes(attrs: &AttrMap) -> String {
	let mut out = String::new();
	for (name, value) in attrs.iter() {
		if !out.is_empty() {
			out.push(' ');
		}
		match value {
			AttrValue::Text(text) => {
				let _ = write!(out, "{}=\"{}\"", name, escape_html(text));
			}
			AttrValue::Flag => out.push_str(name),
		}
	}
	out
}

/// Renders the full `<title>` element, marker attribute included.
fn render_title(title: Option<&str>, attrs: &AttrMap) -> String {
	let attributes = render_attributes(attrs);
	let attributes = if attributes.is_empty() {
		attributes
	} else {
		format!(" {attributes}")
	};
	format!(
		"<title {}=\"true\"{}>{}</title>",
		MARKER_ATTRIBUTE,
		attributes,
		escape_html(title.unwrap_or_default())
	)
}

/// Renders one category's tags as a concatenated markup string.
///
/// Content-bearing categories emit their `innerHTML`/`cssText` raw between
/// open and close tags; the rest self-close.
fn render_tags(category: TagCategory, tags: &[AttrMap]) -> String {
	let mut out = String::new();
	for tag in tags {
		let _ = write!(out, "<{} {}=\"true\"", category.tag_name(), MARKER_ATTRIBUTE);
		for (name, value) in tag.iter() {
			if is_content_key(name) {
				continue;
			}
			match value {
				AttrValue::Text(text) => {
					let _ = write!(out, " {}=\"{}\"", name, escape_html(text));
				}
				AttrValue::Flag => {
					let _ = write!(out, " {name}");
				}
			}
		}
		if category.carries_content() {
			let content = tag
				.get("innerHTML")
				.or_else(|| tag.get("cssText"))
				.and_then(AttrValue::as_text)
				.unwrap_or_default();
			let _ = write!(out, ">{}</{}>", content, category.tag_name());
		} else {
			out.push_str("/>");
		}
	}
	out
}

/// The serialized head-state: one markup string per category, consumable
/// by any server-side templating layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHeadState {
	/// The complete `<title>` element.
	pub title: String,
	/// Markup for the surviving `<base>` tag, if any.
	pub base: String,
	/// Markup for all `<meta>` tags.
	pub meta: String,
	/// Markup for all `<link>` tags.
	pub link: String,
	/// Markup for all `<noscript>` tags.
	pub noscript: String,
	/// Markup for all `<script>` tags.
	pub script: String,
	/// Markup for all `<style>` tags.
	pub style: String,
	/// Attribute string for the root `<html>` element.
	pub html_attributes: String,
	/// Attribute string for the `<body>` element.
	pub body_attributes: String,
}

impl ServerHeadState {
	/// Serializes a canonical state into per-category markup strings.
	pub fn from_state(state: &HeadState) -> Self {
		Self {
			title: render_title(state.title.as_deref(), &state.title_attrs),
			base: render_tags(TagCategory::Base, &state.base_tags),
			meta: render_tags(TagCategory::Meta, &state.meta_tags),
			link: render_tags(TagCategory::Link, &state.link_tags),
			noscript: render_tags(TagCategory::Noscript, &state.noscript_tags),
			script: render_tags(TagCategory::Script, &state.script_tags),
			style: render_tags(TagCategory::Style, &state.style_tags),
			html_attributes: render_attributes(&state.html_attrs),
			body_attributes: render_attributes(&state.body_attrs),
		}
	}
}

impl From<&HeadState> for ServerHeadState {
	fn from(state: &HeadState) -> Self {
		ServerHeadState::from_state(state)
	}
}
