//! An in-memory document.
//!
//! Elements live in an arena indexed by [`ElementId`]; ids stay valid for
//! the document's lifetime, including for detached elements, so commit
//! observers can inspect removed nodes after the fact.

use masthead_core::attrs::{AttrMap, AttrValue};
use masthead_core::escape_html;

/// Stable handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct NodeData {
	tag: String,
	attrs: AttrMap,
	children: Vec<ElementId>,
	parent: Option<ElementId>,
	text: String,
}

impl NodeData {
	fn new(tag: &str) -> Self {
		Self {
			tag: tag.to_string(),
			attrs: AttrMap::new(),
			children: Vec::new(),
			parent: None,
			text: String::new(),
		}
	}
}

/// An in-memory document with the fixed root structure
/// `html > (head > title, body)`.
#[derive(Debug, Clone)]
pub struct Document {
	nodes: Vec<NodeData>,
	html: ElementId,
	head: ElementId,
	body: ElementId,
	title: ElementId,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates an empty document with its root elements in place.
	pub fn new() -> Self {
		let mut doc = Self {
			nodes: Vec::new(),
			html: ElementId(0),
			head: ElementId(0),
			body: ElementId(0),
			title: ElementId(0),
		};
		doc.html = doc.create_element("html");
		doc.head = doc.create_element("head");
		doc.body = doc.create_element("body");
		doc.title = doc.create_element("title");
		doc.append_child(doc.html, doc.head);
		doc.append_child(doc.html, doc.body);
		doc.append_child(doc.head, doc.title);
		doc
	}

	/// The root `<html>` element.
	pub fn html(&self) -> ElementId {
		self.html
	}

	/// The `<head>` element.
	pub fn head(&self) -> ElementId {
		self.head
	}

	/// The `<body>` element.
	pub fn body(&self) -> ElementId {
		self.body
	}

	/// The `<title>` element.
	pub fn title_element(&self) -> ElementId {
		self.title
	}

	/// The document title text.
	pub fn title(&self) -> &str {
		self.text(self.title)
	}

	/// Replaces the document title text.
	pub fn set_title(&mut self, title: impl Into<String>) {
		let id = self.title;
		self.node_mut(id).text = title.into();
	}

	/// Creates a detached element.
	pub fn create_element(&mut self, tag: &str) -> ElementId {
		let id = ElementId(self.nodes.len());
		self.nodes.push(NodeData::new(tag));
		id
	}

	/// The element's tag name.
	pub fn tag_name(&self, id: ElementId) -> &str {
		&self.node(id).tag
	}

	/// The element's attribute map.
	pub fn attributes(&self, id: ElementId) -> &AttrMap {
		&self.node(id).attrs
	}

	/// Looks up one attribute by exact name.
	pub fn attribute(&self, id: ElementId, name: &str) -> Option<&AttrValue> {
		self.node(id).attrs.get(name)
	}

	/// Sets an attribute on an element.
	pub fn set_attribute(&mut self, id: ElementId, name: impl Into<String>, value: impl Into<AttrValue>) {
		self.node_mut(id).attrs.set(name, value);
	}

	/// Removes an attribute from an element.
	pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
		self.node_mut(id).attrs.remove(name);
	}

	/// The element's text content.
	pub fn text(&self, id: ElementId) -> &str {
		&self.node(id).text
	}

	/// Replaces the element's text content.
	pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
		self.node_mut(id).text = text.into();
	}

	/// The element's children, in document order.
	pub fn children(&self, id: ElementId) -> &[ElementId] {
		&self.node(id).children
	}

	/// The element's parent, if attached.
	pub fn parent(&self, id: ElementId) -> Option<ElementId> {
		self.node(id).parent
	}

	/// Appends a detached element as the last child of `parent`.
	///
	/// # Panics
	///
	/// Panics if `child` is already attached somewhere.
	pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
		assert!(
			self.node(child).parent.is_none(),
			"append_child: element is already attached"
		);
		self.node_mut(child).parent = Some(parent);
		self.node_mut(parent).children.push(child);
	}

	/// Detaches an element from its parent. The element (and its id) stays
	/// valid; it simply no longer belongs to the document tree.
	///
	/// # Panics
	///
	/// Panics if the element has no parent - removing an unattached tag is
	/// a programmer error, mirroring the fatal missing-parent condition.
	pub fn detach(&mut self, id: ElementId) {
		let parent = self
			.node(id)
			.parent
			.unwrap_or_else(|| panic!("attempted to remove <{}> without a parent node", self.node(id).tag));
		self.node_mut(parent).children.retain(|&c| c != id);
		self.node_mut(id).parent = None;
	}

	/// Whether the element is attached under the document root.
	pub fn is_attached(&self, id: ElementId) -> bool {
		let mut current = id;
		loop {
			if current == self.html {
				return true;
			}
			match self.node(current).parent {
				Some(parent) => current = parent,
				None => return false,
			}
		}
	}

	/// Structural node equality: tag name (case-insensitive), attribute set
	/// (order-insensitive) and text content.
	pub fn node_equal(&self, a: ElementId, b: ElementId) -> bool {
		let a = self.node(a);
		let b = self.node(b);
		a.tag.eq_ignore_ascii_case(&b.tag) && a.attrs.set_equal(&b.attrs) && a.text == b.text
	}

	/// Renders an element subtree to markup, mainly for inspection in
	/// tests and debugging.
	pub fn outer_html(&self, id: ElementId) -> String {
		let mut out = String::new();
		self.render_into(id, &mut out);
		out
	}

	fn render_into(&self, id: ElementId, out: &mut String) {
		let node = self.node(id);
		out.push('<');
		out.push_str(&node.tag);
		for (name, value) in node.attrs.iter() {
			out.push(' ');
			out.push_str(name);
			if let AttrValue::Text(text) = value {
				out.push_str("=\"");
				out.push_str(&escape_html(text));
				out.push('"');
			}
		}
		out.push('>');
		out.push_str(&node.text);
		for &child in &node.children {
			self.render_into(child, out);
		}
		out.push_str("</");
		out.push_str(&node.tag);
		out.push('>');
	}

	fn node(&self, id: ElementId) -> &NodeData {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: ElementId) -> &mut NodeData {
		&mut self.nodes[id.0]
	}
}
