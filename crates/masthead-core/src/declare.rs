//! Normalization of declared head-tag nodes into [`HeadProps`].
//!
//! Host frameworks hand masthead the children a declaring component
//! rendered, already parsed down to tag name, attribute map and text
//! children. This module folds those declarations into a single
//! [`HeadProps`] record, validating content shape as it goes: self-closing
//! categories reject children, content-bearing categories accept exactly
//! one text child, and unrecognized tags are skipped with a warning.

use thiserror::Error;
use tracing::warn;

use crate::attrs::AttrMap;
use crate::props::HeadProps;
use crate::tags::VALID_TAG_NAMES;

/// One declared child of a declaring component.
#[derive(Debug, Clone)]
pub enum Declaration {
	/// A recognized (or not) head tag node.
	Tag(DeclaredTag),
	/// A nested component where a tag was expected. Declaring components
	/// must not nest; the declaration is skipped with a warning.
	Component,
}

/// A declared tag node in normalized form: tag name, attributes and the
/// node's text children.
#[derive(Debug, Clone, Default)]
pub struct DeclaredTag {
	/// The lowercase tag name as declared.
	pub tag: String,
	/// The node's attribute map.
	pub attrs: AttrMap,
	/// The node's text children, in order.
	pub text: Vec<String>,
}

impl DeclaredTag {
	/// Creates a declared tag with no attributes or children.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attrs: AttrMap::new(),
			text: Vec::new(),
		}
	}

	/// Builder-style attribute setter.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<crate::attrs::AttrValue>) -> Self {
		self.attrs.set(name, value);
		self
	}

	/// Builder-style text child.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text.push(text.into());
		self
	}
}

impl From<DeclaredTag> for Declaration {
	fn from(tag: DeclaredTag) -> Self {
		Declaration::Tag(tag)
	}
}

/// Content-shape validation failure for a declared tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
	/// A content-bearing tag declared more than one text child.
	#[error("expected <{tag}> to have a single string as its only child")]
	MultipleTextChildren {
		/// The offending tag name.
		tag: String,
	},
	/// A self-closing tag declared children.
	#[error("<{tag}> elements are self-closing and can not contain children")]
	UnexpectedChildren {
		/// The offending tag name.
		tag: String,
	},
}

/// Folds a component's declarations into a [`HeadProps`] record.
///
/// `base_props` carries the component's direct props (title template,
/// default title, ...); declared tags layer on top of it. Unrecognized
/// tags and nested components are skipped with a `tracing` warning;
/// content-shape violations abort with an error.
pub fn props_from_declarations(
	declarations: &[Declaration],
	base_props: HeadProps,
) -> Result<HeadProps, NormalizeError> {
	let mut props = base_props;

	for declaration in declarations {
		let node = match declaration {
			Declaration::Tag(node) => node,
			Declaration::Component => {
				warn!("declaring components must not be nested inside each other; skipping");
				continue;
			}
		};

		if !VALID_TAG_NAMES.contains(&node.tag.as_str()) {
			warn!(
				tag = node.tag.as_str(),
				"only {} elements are recognized in head declarations; skipping",
				VALID_TAG_NAMES.join(", ")
			);
			continue;
		}

		// every recognized tag accepts at most one text child, except
		// title, which joins all of them
		if node.text.len() > 1 && node.tag != "title" {
			return Err(NormalizeError::MultipleTextChildren {
				tag: node.tag.clone(),
			});
		}

		match node.tag.as_str() {
			"title" => {
				props.title = Some(node.text.concat());
				merge_into(&mut props.title_attrs, &node.attrs);
			}
			"base" => {
				reject_children(node)?;
				merge_into(&mut props.base, &node.attrs);
			}
			"html" => merge_into(&mut props.html_attrs, &node.attrs),
			"body" => merge_into(&mut props.body_attrs, &node.attrs),
			"link" => {
				reject_children(node)?;
				props.links.push(node.attrs.clone());
			}
			"meta" => {
				reject_children(node)?;
				props.metas.push(node.attrs.clone());
			}
			"script" => props.scripts.push(with_content(node, "innerHTML")),
			"noscript" => props.noscripts.push(with_content(node, "innerHTML")),
			"style" => {
				let mut tag = with_content(node, "cssText");
				// innerHTML is an alias for cssText on style declarations
				if tag.get("cssText").is_none() {
					if let Some(css) = tag.remove("innerHTML") {
						tag.set("cssText", css);
					}
				}
				props.styles.push(tag);
			}
			// unreachable: the recognition check above filtered the rest
			_ => {}
		}
	}

	Ok(props)
}

fn merge_into(target: &mut Option<AttrMap>, attrs: &AttrMap) {
	target.get_or_insert_with(AttrMap::new).merge_from(attrs);
}

fn reject_children(node: &DeclaredTag) -> Result<(), NormalizeError> {
	if node.text.is_empty() {
		Ok(())
	} else {
		Err(NormalizeError::UnexpectedChildren {
			tag: node.tag.clone(),
		})
	}
}

/// Copies a content-bearing node's attributes, storing its lone text child
/// under the given content key.
fn with_content(node: &DeclaredTag, content_key: &str) -> AttrMap {
	let mut attrs = node.attrs.clone();
	if let Some(text) = node.text.first() {
		attrs.set(content_key, text.clone());
	}
	attrs
}
