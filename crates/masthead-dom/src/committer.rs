//! The diffing head committer.
//!
//! `DomCommitter::commit` reconciles a canonical [`HeadState`] against a
//! [`Document`] with minimal mutation: root attributes are diffed against
//! the marker-recorded owned set, and head tags are matched structurally so
//! an unchanged tag is never detached and re-inserted.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use masthead_core::attrs::{AttrMap, AttrValue};
use masthead_core::state::HeadState;
use masthead_core::tags::{TagCategory, MARKER_ATTRIBUTE};

use crate::document::{Document, ElementId};

/// Elements added and removed by one commit, grouped by category.
///
/// Only categories with a non-empty delta appear in the maps. Removed
/// elements are detached but their ids stay inspectable through the
/// document arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitResult {
	/// Newly appended elements per category.
	pub added: BTreeMap<TagCategory, Vec<ElementId>>,
	/// Detached elements per category.
	pub removed: BTreeMap<TagCategory, Vec<ElementId>>,
}

impl CommitResult {
	/// True when the commit changed no tags.
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}

/// A fatal commit failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
	/// The document has no attached head element - the environment is
	/// malformed and committing cannot proceed.
	#[error("document is missing a head element")]
	MissingHead,
}

/// Reconciles canonical head-state against a document.
///
/// The committer owns a private ledger mapping each category to the
/// elements it previously created, persisted across commits so it removes
/// exactly what it added. Marked elements it did not create (for example
/// server-rendered output present at hydration) are adopted into the
/// ledger on first contact. Unmarked, untracked elements are never
/// touched.
#[derive(Debug, Clone, Default)]
pub struct DomCommitter {
	owned: BTreeMap<TagCategory, Vec<ElementId>>,
}

impl DomCommitter {
	/// Creates a committer with an empty ledger.
	pub fn new() -> Self {
		Self::default()
	}

	/// Commits a canonical state to the document.
	///
	/// Returns the added and removed elements per category. Committing the
	/// same state twice in a row yields an empty second delta.
	pub fn commit(
		&mut self,
		doc: &mut Document,
		state: &HeadState,
	) -> Result<CommitResult, CommitError> {
		if !doc.is_attached(doc.head()) {
			return Err(CommitError::MissingHead);
		}

		let html = doc.html();
		let body = doc.body();
		reconcile_attributes(doc, html, &state.html_attrs);
		reconcile_attributes(doc, body, &state.body_attrs);
		self.commit_title(doc, state);

		let mut result = CommitResult::default();
		for category in TagCategory::ALL {
			let (added, removed) = self.commit_tags(doc, category, state.tags(category));
			if !added.is_empty() {
				result.added.insert(category, added);
			}
			if !removed.is_empty() {
				result.removed.insert(category, removed);
			}
		}
		debug!(
			added = result.added.values().map(Vec::len).sum::<usize>(),
			removed = result.removed.values().map(Vec::len).sum::<usize>(),
			"committed head state"
		);
		Ok(result)
	}

	fn commit_title(&self, doc: &mut Document, state: &HeadState) {
		if let Some(title) = &state.title {
			if doc.title() != title {
				doc.set_title(title.clone());
			}
		}
		// title attributes reconcile even when the text is unchanged
		let title = doc.title_element();
		reconcile_attributes(doc, title, &state.title_attrs);
	}

	/// Diffs one category's desired tag list against the owned elements.
	fn commit_tags(
		&mut self,
		doc: &mut Document,
		category: TagCategory,
		desired: &[AttrMap],
	) -> (Vec<ElementId>, Vec<ElementId>) {
		let mut stale = self.owned_elements(doc, category);
		let mut kept: Vec<ElementId> = Vec::new();
		let mut pending: Vec<(AttrMap, Option<String>)> = Vec::new();

		for tag in desired {
			let parts = element_parts(tag);
			match stale
				.iter()
				.position(|&old| parts_match(doc, old, category, &parts))
			{
				// unchanged tag: keep it in place, do not re-insert
				Some(index) => kept.push(stale.remove(index)),
				None => pending.push(parts),
			}
		}

		for &old in &stale {
			doc.detach(old);
		}

		let mut added = Vec::with_capacity(pending.len());
		for (attrs, content) in pending {
			let element = doc.create_element(category.tag_name());
			for (name, value) in attrs.iter() {
				doc.set_attribute(element, name, value.clone());
			}
			if let Some(content) = content {
				doc.set_text(element, content);
			}
			doc.append_child(doc.head(), element);
			added.push(element);
		}

		let mut owned = kept;
		owned.extend(added.iter().copied());
		self.owned.insert(category, owned);

		(added, stale)
	}

	/// The elements this committer currently owns for a category, in head
	/// order: ledger entries still attached, plus marked head children of
	/// the tag name adopted from outside (server-rendered markup).
	fn owned_elements(&self, doc: &Document, category: TagCategory) -> Vec<ElementId> {
		let tracked = self.owned.get(&category);
		doc.children(doc.head())
			.iter()
			.copied()
			.filter(|&child| doc.tag_name(child).eq_ignore_ascii_case(category.tag_name()))
			.filter(|&child| {
				tracked.is_some_and(|ids| ids.contains(&child))
					|| doc.attribute(child, MARKER_ATTRIBUTE).is_some()
			})
			.collect()
	}
}

/// Splits a desired tag into the attribute set the element will carry
/// (marker stamped, content keys stripped) and its text content.
fn element_parts(tag: &AttrMap) -> (AttrMap, Option<String>) {
	let mut attrs = AttrMap::new();
	let mut content = None;
	for (name, value) in tag.iter() {
		if name == "innerHTML" || name == "cssText" {
			content = Some(value.as_text().unwrap_or_default().to_string());
		} else {
			attrs.set(name, value.clone());
		}
	}
	attrs.set(MARKER_ATTRIBUTE, "true");
	(attrs, content)
}

/// Whether an existing element already equals the desired tag parts.
fn parts_match(
	doc: &Document,
	element: ElementId,
	category: TagCategory,
	(attrs, content): &(AttrMap, Option<String>),
) -> bool {
	doc.tag_name(element).eq_ignore_ascii_case(category.tag_name())
		&& doc.attributes(element).set_equal(attrs)
		&& doc.text(element) == content.as_deref().unwrap_or_default()
}

/// Reconciles an attribute map against a root element (`html`, `body` or
/// `title`), using the marker attribute as the record of which names
/// masthead owns there.
///
/// Attribute names never declared through masthead are left untouched;
/// previously-owned names missing from the desired map are removed; the
/// marker is rewritten to the sorted desired names, or dropped entirely
/// when nothing is owned anymore.
fn reconcile_attributes(doc: &mut Document, element: ElementId, desired: &AttrMap) {
	let marker = doc
		.attribute(element, MARKER_ATTRIBUTE)
		.and_then(AttrValue::as_text)
		.unwrap_or_default();
	let mut owned: Vec<String> = if marker.is_empty() {
		Vec::new()
	} else {
		marker.split(',').map(str::to_string).collect()
	};
	let mut to_remove: Vec<String> = owned.clone();

	for (name, value) in desired.iter() {
		if doc.attribute(element, name) != Some(value) {
			doc.set_attribute(element, name, value.clone());
		}
		if !owned.iter().any(|o| o == name) {
			owned.push(name.to_string());
		}
		to_remove.retain(|o| o != name);
	}

	for name in &to_remove {
		doc.remove_attribute(element, name);
	}

	if owned.len() == to_remove.len() {
		// everything previously owned is gone and nothing new arrived
		doc.remove_attribute(element, MARKER_ATTRIBUTE);
		return;
	}

	let mut names: Vec<&str> = desired.iter().map(|(name, _)| name).collect();
	names.sort_unstable();
	let joined = names.join(",");
	if doc
		.attribute(element, MARKER_ATTRIBUTE)
		.and_then(AttrValue::as_text)
		!= Some(joined.as_str())
	{
		doc.set_attribute(element, MARKER_ATTRIBUTE, joined);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use masthead_core::attrs;
	use masthead_core::props::HeadProps;
	use masthead_core::reduce::reduce_props;

	fn state_of(props: HeadProps) -> HeadState {
		reduce_props(&[props])
	}

	#[test]
	fn test_commit_sets_title_and_tags() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();
		let state = state_of(
			HeadProps::new()
				.title("Home")
				.meta(attrs! { "charset" => "utf-8" })
				.link(attrs! { "rel" => "stylesheet", "href" => "/a.css" }),
		);

		let result = committer.commit(&mut doc, &state).unwrap();

		assert_eq!(doc.title(), "Home");
		assert_eq!(result.added[&TagCategory::Meta].len(), 1);
		assert_eq!(result.added[&TagCategory::Link].len(), 1);
		assert!(result.removed.is_empty());

		let meta = result.added[&TagCategory::Meta][0];
		assert_eq!(
			doc.attribute(meta, MARKER_ATTRIBUTE),
			Some(&AttrValue::Text("true".into()))
		);
	}

	#[test]
	fn test_commit_is_idempotent() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();
		let state = state_of(
			HeadProps::new()
				.title("Same")
				.meta(attrs! { "name" => "description", "content" => "x" })
				.script(attrs! { "src" => "/app.js" }),
		);

		let first = committer.commit(&mut doc, &state).unwrap();
		assert!(!first.is_empty());

		let second = committer.commit(&mut doc, &state).unwrap();
		assert!(second.is_empty());
		// the kept element is the very node from the first commit
		assert_eq!(
			committer.owned[&TagCategory::Meta],
			first.added[&TagCategory::Meta]
		);
	}

	#[test]
	fn test_changed_tag_replaces_only_itself() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();

		let first = committer
			.commit(
				&mut doc,
				&state_of(
					HeadProps::new()
						.meta(attrs! { "name" => "a", "content" => "1" })
						.meta(attrs! { "name" => "b", "content" => "2" }),
				),
			)
			.unwrap();
		let kept_b = first.added[&TagCategory::Meta][1];

		let second = committer
			.commit(
				&mut doc,
				&state_of(
					HeadProps::new()
						.meta(attrs! { "name" => "a", "content" => "changed" })
						.meta(attrs! { "name" => "b", "content" => "2" }),
				),
			)
			.unwrap();

		assert_eq!(second.added[&TagCategory::Meta].len(), 1);
		assert_eq!(second.removed[&TagCategory::Meta].len(), 1);
		assert!(doc.is_attached(kept_b));
		assert!(!doc.is_attached(second.removed[&TagCategory::Meta][0]));
	}

	#[test]
	fn test_unmarked_tags_survive() {
		let mut doc = Document::new();
		let foreign = doc.create_element("meta");
		doc.set_attribute(foreign, "name", "generator");
		doc.set_attribute(foreign, "content", "someone-else");
		doc.append_child(doc.head(), foreign);

		let mut committer = DomCommitter::new();
		let state = state_of(HeadProps::new().meta(attrs! { "charset" => "utf-8" }));
		committer.commit(&mut doc, &state).unwrap();

		assert!(doc.is_attached(foreign));

		// clearing our state still leaves the foreign tag alone
		committer.commit(&mut doc, &HeadState::empty()).unwrap();
		assert!(doc.is_attached(foreign));
	}

	#[test]
	fn test_marked_elements_are_adopted() {
		// server-rendered markup carries the marker but predates the ledger
		let mut doc = Document::new();
		let rendered = doc.create_element("meta");
		doc.set_attribute(rendered, MARKER_ATTRIBUTE, "true");
		doc.set_attribute(rendered, "name", "description");
		doc.set_attribute(rendered, "content", "ssr");
		doc.append_child(doc.head(), rendered);

		let mut committer = DomCommitter::new();
		let result = committer.commit(&mut doc, &HeadState::empty()).unwrap();

		assert_eq!(result.removed[&TagCategory::Meta], vec![rendered]);
		assert!(!doc.is_attached(rendered));
	}

	#[test]
	fn test_content_tags_set_text_not_attributes() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();
		let state = state_of(
			HeadProps::new()
				.style(attrs! { "cssText" => "body { margin: 0; }" })
				.script(attrs! { "innerHTML" => "window.x = 1;" }),
		);

		let result = committer.commit(&mut doc, &state).unwrap();
		let style = result.added[&TagCategory::Style][0];
		let script = result.added[&TagCategory::Script][0];

		assert_eq!(doc.text(style), "body { margin: 0; }");
		assert!(doc.attribute(style, "cssText").is_none());
		assert_eq!(doc.text(script), "window.x = 1;");
		assert!(doc.attribute(script, "innerHTML").is_none());
	}

	#[test]
	fn test_root_attributes_reconcile_with_marker() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();

		committer
			.commit(
				&mut doc,
				&state_of(HeadProps::new().html_attrs(attrs! { "lang" => "en", "class" => "light" })),
			)
			.unwrap();
		assert_eq!(
			doc.attribute(doc.html(), MARKER_ATTRIBUTE),
			Some(&AttrValue::Text("class,lang".into()))
		);

		committer
			.commit(
				&mut doc,
				&state_of(HeadProps::new().html_attrs(attrs! { "lang" => "ja" })),
			)
			.unwrap();
		assert_eq!(
			doc.attribute(doc.html(), "lang"),
			Some(&AttrValue::Text("ja".into()))
		);
		assert!(doc.attribute(doc.html(), "class").is_none());
		assert_eq!(
			doc.attribute(doc.html(), MARKER_ATTRIBUTE),
			Some(&AttrValue::Text("lang".into()))
		);
	}

	#[test]
	fn test_root_attributes_marker_removed_when_empty() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();

		committer
			.commit(
				&mut doc,
				&state_of(HeadProps::new().body_attrs(attrs! { "class" => "dark" })),
			)
			.unwrap();
		committer.commit(&mut doc, &HeadState::empty()).unwrap();

		assert!(doc.attribute(doc.body(), "class").is_none());
		assert!(doc.attribute(doc.body(), MARKER_ATTRIBUTE).is_none());
	}

	#[test]
	fn test_foreign_root_attributes_untouched() {
		let mut doc = Document::new();
		doc.set_attribute(doc.html(), "data-theme", "solar");

		let mut committer = DomCommitter::new();
		committer
			.commit(
				&mut doc,
				&state_of(HeadProps::new().html_attrs(attrs! { "lang" => "en" })),
			)
			.unwrap();
		committer.commit(&mut doc, &HeadState::empty()).unwrap();

		assert_eq!(
			doc.attribute(doc.html(), "data-theme"),
			Some(&AttrValue::Text("solar".into()))
		);
		assert!(doc.attribute(doc.html(), "lang").is_none());
	}

	#[test]
	fn test_flag_attribute_owned_by_name() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();
		committer
			.commit(
				&mut doc,
				&state_of(HeadProps::new().body_attrs(attrs! { "hidden" })),
			)
			.unwrap();
		assert_eq!(doc.attribute(doc.body(), "hidden"), Some(&AttrValue::Flag));
		assert_eq!(
			doc.attribute(doc.body(), MARKER_ATTRIBUTE),
			Some(&AttrValue::Text("hidden".into()))
		);
	}

	#[test]
	fn test_title_attributes_reconcile_without_text_change() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();

		committer
			.commit(
				&mut doc,
				&state_of(
					HeadProps::new()
						.title("T")
						.title_attrs(attrs! { "itemprop" => "name" }),
				),
			)
			.unwrap();
		committer
			.commit(&mut doc, &state_of(HeadProps::new().title("T")))
			.unwrap();

		assert_eq!(doc.title(), "T");
		assert!(doc.attribute(doc.title_element(), "itemprop").is_none());
	}

	#[test]
	fn test_missing_title_leaves_text_alone() {
		let mut doc = Document::new();
		doc.set_title("Existing");
		let mut committer = DomCommitter::new();
		committer.commit(&mut doc, &HeadState::empty()).unwrap();
		assert_eq!(doc.title(), "Existing");
	}

	#[test]
	fn test_missing_head_is_fatal() {
		let mut doc = Document::new();
		doc.detach(doc.head());
		let mut committer = DomCommitter::new();
		let err = committer.commit(&mut doc, &HeadState::empty()).unwrap_err();
		assert_eq!(err, CommitError::MissingHead);
	}

	#[test]
	fn test_base_tag_committed() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();
		let state = state_of(HeadProps::new().base(attrs! { "href" => "/app/" }));
		let result = committer.commit(&mut doc, &state).unwrap();
		assert_eq!(result.added[&TagCategory::Base].len(), 1);
	}

	#[test]
	fn test_new_tags_append_in_order() {
		let mut doc = Document::new();
		let mut committer = DomCommitter::new();
		let state = state_of(
			HeadProps::new()
				.meta(attrs! { "name" => "a", "content" => "1" })
				.meta(attrs! { "name" => "b", "content" => "2" })
				.meta(attrs! { "name" => "c", "content" => "3" }),
		);
		let result = committer.commit(&mut doc, &state).unwrap();
		let added = &result.added[&TagCategory::Meta];

		let head_children = doc.children(doc.head());
		let tail = &head_children[head_children.len() - 3..];
		assert_eq!(tail, added.as_slice());
	}
}
