//! The deepest-wins state reducer.
//!
//! `reduce_props` folds the ordered list of every mounted component's
//! [`HeadProps`] into one [`HeadState`]. List order is the precedence axis:
//! records later in the list come from deeper (more specific) components and
//! win ties. The function is pure - same input, same output, no I/O.

use std::collections::HashSet;

use crate::attrs::{AttrMap, AttrValue};
use crate::props::HeadProps;
use crate::state::HeadState;
use crate::tags::{is_exact_case_key, TagCategory};

/// Reduces an ordered declaration list to the canonical head-state.
///
/// An empty list reduces to [`HeadState::empty`].
pub fn reduce_props(props_list: &[HeadProps]) -> HeadState {
	HeadState {
		title: resolve_title(props_list),
		title_attrs: merged_attrs(props_list, |p| p.title_attrs.as_ref()),
		html_attrs: merged_attrs(props_list, |p| p.html_attrs.as_ref()),
		body_attrs: merged_attrs(props_list, |p| p.body_attrs.as_ref()),
		base_tags: base_tags(props_list),
		link_tags: category_tags(props_list, TagCategory::Link),
		meta_tags: category_tags(props_list, TagCategory::Meta),
		noscript_tags: category_tags(props_list, TagCategory::Noscript),
		script_tags: category_tags(props_list, TagCategory::Script),
		style_tags: category_tags(props_list, TagCategory::Style),
	}
}

/// Innermost declared value for a scalar field.
fn innermost<'a, T: ?Sized>(
	props_list: &'a [HeadProps],
	field: impl Fn(&'a HeadProps) -> Option<&'a T>,
) -> Option<&'a T> {
	props_list.iter().rev().find_map(field)
}

/// Resolves the title, applying the innermost template when both a template
/// and a title are declared.
///
/// The `%s` substitution is literal: the title text is never
/// pattern-interpreted, whatever characters it contains.
fn resolve_title(props_list: &[HeadProps]) -> Option<String> {
	let title = innermost(props_list, |p| p.title.as_deref());
	let template = innermost(props_list, |p| p.title_template.as_deref());

	if let (Some(template), Some(title)) = (template, title) {
		return Some(template.replace("%s", title));
	}

	title
		.map(str::to_string)
		.or_else(|| innermost(props_list, |p| p.default_title.as_deref()).map(str::to_string))
}

/// Shallow-merges an attribute-map field across the list, outer to inner,
/// so deeper records overwrite per key.
fn merged_attrs<'a>(
	props_list: &'a [HeadProps],
	field: impl Fn(&'a HeadProps) -> Option<&'a AttrMap>,
) -> AttrMap {
	let mut merged = AttrMap::new();
	for props in props_list {
		if let Some(map) = field(props) {
			merged.merge_from(map);
		}
	}
	merged
}

/// Picks the innermost `<base>` declaration carrying a usable `href`.
///
/// At most one base tag ever survives; records whose base map lacks a
/// non-empty `href` (case-insensitive) are passed over in favor of
/// shallower ones.
fn base_tags(props_list: &[HeadProps]) -> Vec<AttrMap> {
	for props in props_list.iter().rev() {
		if let Some(base) = &props.base {
			let qualifies = base
				.iter()
				.any(|(name, value)| name.eq_ignore_ascii_case("href") && value.identity_text().is_some());
			if qualifies {
				return vec![base.clone()];
			}
		}
	}
	Vec::new()
}

/// A tag's deduplication identity: primary attribute key plus its
/// lowercased value.
type TagIdentity = (String, String);

/// Computes the primary attribute key and identity value for a tag, or
/// `None` when the tag carries no usable identity and must be dropped.
fn primary_identity(category: TagCategory, tag: &AttrMap) -> Option<TagIdentity> {
	if category == TagCategory::Link {
		return link_identity(tag);
	}

	let primaries = category.primary_attributes();
	let mut primary: Option<(String, &AttrValue)> = None;
	for (name, value) in tag.iter() {
		let lower = name.to_ascii_lowercase();
		if primaries.contains(&lower.as_str()) {
			primary = Some((lower, value));
		}
		// camelCase content keys match with exact case only
		if is_exact_case_key(name) && primaries.contains(&name) {
			primary = Some((name.to_string(), value));
		}
	}

	let (key, value) = primary?;
	let value = value.identity_text()?;
	Some((key, value.to_lowercase()))
}

/// Link tags can be identified by either `rel` or `href`; `href` is the
/// primary identity whenever present, and `rel` takes over only when no
/// usable `href` exists.
fn link_identity(tag: &AttrMap) -> Option<TagIdentity> {
	let truthy = |wanted: &str| {
		tag.iter()
			.find(|(name, value)| name.eq_ignore_ascii_case(wanted) && value.identity_text().is_some())
			.and_then(|(_, value)| value.identity_text())
	};
	if let Some(href) = truthy("href") {
		return Some(("href".to_string(), href.to_lowercase()));
	}
	let rel = truthy("rel")?;
	Some(("rel".to_string(), rel.to_lowercase()))
}

/// For style tags, `innerHTML` is accepted as an alias for `cssText` when
/// the tag declares no `cssText` of its own; the surviving tag is
/// normalized to carry `cssText`.
fn normalize_style_tag(tag: &AttrMap) -> AttrMap {
	if tag.get("cssText").is_some() || tag.get("innerHTML").is_none() {
		return tag.clone();
	}
	tag.iter()
		.map(|(name, value)| {
			let name = if name == "innerHTML" { "cssText" } else { name };
			(name.to_string(), value.clone())
		})
		.collect()
}

/// Reduces one array-type category across the whole list.
///
/// Precedence is computed in two explicit passes: an inner-to-outer pass
/// that filters each component's tags against identities already claimed by
/// deeper components, then an outer-to-inner emission pass. Duplicates
/// within a single component never suppress each other and keep their
/// declared order.
fn category_tags(props_list: &[HeadProps], category: TagCategory) -> Vec<AttrMap> {
	let mut claimed: HashSet<TagIdentity> = HashSet::new();
	// surviving tags per component, innermost component first
	let mut surviving: Vec<Vec<AttrMap>> = Vec::with_capacity(props_list.len());

	for props in props_list.iter().rev() {
		let mut instance_claims: Vec<TagIdentity> = Vec::new();
		let mut kept: Vec<AttrMap> = Vec::new();
		for tag in props.category_tags(category) {
			let tag = if category == TagCategory::Style {
				normalize_style_tag(tag)
			} else {
				tag.clone()
			};
			let Some(identity) = primary_identity(category, &tag) else {
				// no usable identity: deliberate silent drop
				continue;
			};
			if claimed.contains(&identity) {
				continue;
			}
			instance_claims.push(identity);
			kept.push(tag);
		}
		// claims become visible to shallower components only after the
		// whole instance is processed
		claimed.extend(instance_claims);
		surviving.push(kept);
	}

	surviving.into_iter().rev().flatten().collect()
}
