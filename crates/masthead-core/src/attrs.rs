//! Ordered attribute maps.
//!
//! Declared head tags are bags of attributes whose declaration order is
//! meaningful (it decides primary-attribute identification and output
//! order), so the map is backed by an insertion-ordered vector of pairs
//! rather than a hash map. Attribute names keep their declared case for
//! output and are compared case-insensitively where identity matters.

use serde::{Deserialize, Serialize};

/// The value of a single attribute.
///
/// Most attributes carry a string value; a [`AttrValue::Flag`] is a
/// valueless marker that renders as the bare attribute name
/// (boolean-style presence, e.g. `defer` on a script tag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
	/// A string-valued attribute, rendered as `name="value"`.
	Text(String),
	/// A valueless attribute, rendered as the bare name.
	Flag,
}

impl AttrValue {
	/// Returns the string value, if this is a text attribute.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			AttrValue::Text(value) => Some(value),
			AttrValue::Flag => None,
		}
	}

	/// Returns the value usable as a tag identity: a non-empty string.
	///
	/// Flags and empty strings cannot establish identity and resolve to
	/// `None`.
	pub fn identity_text(&self) -> Option<&str> {
		match self {
			AttrValue::Text(value) if !value.is_empty() => Some(value),
			_ => None,
		}
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::Text(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		AttrValue::Text(value)
	}
}

impl From<&String> for AttrValue {
	fn from(value: &String) -> Self {
		AttrValue::Text(value.clone())
	}
}

/// An insertion-ordered attribute map.
///
/// Setting an attribute whose exact name is already present replaces the
/// value in place, keeping the original position; new names append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrMap {
	entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
	/// Creates an empty attribute map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when the map holds no attributes.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of attributes in the map.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Sets an attribute, replacing an exact-name match in place.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
		let name = name.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(n, _)| *n == name) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((name, value)),
		}
	}

	/// Sets a valueless flag attribute.
	pub fn set_flag(&mut self, name: impl Into<String>) {
		let name = name.into();
		match self.entries.iter_mut().find(|(n, _)| *n == name) {
			Some(entry) => entry.1 = AttrValue::Flag,
			None => self.entries.push((name, AttrValue::Flag)),
		}
	}

	/// Builder-style [`AttrMap::set`].
	pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.set(name, value);
		self
	}

	/// Builder-style [`AttrMap::set_flag`].
	pub fn with_flag(mut self, name: impl Into<String>) -> Self {
		self.set_flag(name);
		self
	}

	/// Looks up an attribute by exact name.
	pub fn get(&self, name: &str) -> Option<&AttrValue> {
		self.entries
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v)
	}

	/// Looks up the first attribute whose name matches case-insensitively.
	///
	/// Returns the stored name alongside the value, since declared case is
	/// preserved.
	pub fn get_ignore_case(&self, name: &str) -> Option<(&str, &AttrValue)> {
		self.entries
			.iter()
			.find(|(n, _)| n.eq_ignore_ascii_case(name))
			.map(|(n, v)| (n.as_str(), v))
	}

	/// Removes an attribute by exact name, returning its value.
	pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
		let index = self.entries.iter().position(|(n, _)| n == name)?;
		Some(self.entries.remove(index).1)
	}

	/// Iterates attributes in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
		self.entries.iter().map(|(n, v)| (n.as_str(), v))
	}

	/// Merges `other` over this map, replacing per exact name.
	pub fn merge_from(&mut self, other: &AttrMap) {
		for (name, value) in other.iter() {
			self.set(name, value.clone());
		}
	}

	/// Order-insensitive equality over the attribute sets.
	///
	/// Used for node equality during commit diffing, where attribute order
	/// carries no meaning.
	pub fn set_equal(&self, other: &AttrMap) -> bool {
		self.len() == other.len()
			&& self
				.iter()
				.all(|(name, value)| other.get(name) == Some(value))
	}
}

impl FromIterator<(String, AttrValue)> for AttrMap {
	fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
		let mut map = AttrMap::new();
		for (name, value) in iter {
			map.set(name, value);
		}
		map
	}
}

/// Builds an [`AttrMap`] from `name => value` pairs and bare flag names.
///
/// ```
/// use masthead_core::attrs;
///
/// let link = attrs! { "rel" => "stylesheet", "href" => "/app.css", "disabled" };
/// assert_eq!(link.len(), 3);
/// ```
#[macro_export]
macro_rules! attrs {
	() => { $crate::attrs::AttrMap::new() };
	($($tt:tt)+) => {{
		let mut map = $crate::attrs::AttrMap::new();
		$crate::__attrs_entries!(map; $($tt)+);
		map
	}};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __attrs_entries {
	($map:ident;) => {};
	($map:ident; $name:expr => $value:expr, $($rest:tt)*) => {
		$map.set($name, $value);
		$crate::__attrs_entries!($map; $($rest)*);
	};
	($map:ident; $name:expr => $value:expr) => {
		$map.set($name, $value);
	};
	($map:ident; $name:expr, $($rest:tt)*) => {
		$map.set_flag($name);
		$crate::__attrs_entries!($map; $($rest)*);
	};
	($map:ident; $name:expr) => {
		$map.set_flag($name);
	};
}
