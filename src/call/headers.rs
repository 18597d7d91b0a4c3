//! Case-insensitive header collection with unique keys.

// self
use crate::_prelude::*;

/// Header name to value map; names compare case-insensitively and stay unique.
///
/// Insertion order is preserved and the casing of the most recent insert wins, so headers go out
/// on the wire the way callers spelled them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct HeaderSet(Vec<(String, String)>);
impl HeaderSet {
	/// Creates an empty header set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a header, returning the previous value when one existed.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		let name = name.into();
		let value = value.into();

		match self.position(&name) {
			Some(idx) => {
				let (slot_name, slot_value) = &mut self.0[idx];

				*slot_name = name;

				Some(std::mem::replace(slot_value, value))
			},
			None => {
				self.0.push((name, value));

				None
			},
		}
	}

	/// Appends `value` to an existing header as a comma-separated list, or inserts it.
	pub fn append(&mut self, name: &str, value: &str) {
		match self.position(name) {
			Some(idx) => {
				let slot = &mut self.0[idx].1;

				slot.push_str(", ");
				slot.push_str(value);
			},
			None => self.0.push((name.into(), value.into())),
		}
	}

	/// Returns the value stored for `name`, if any.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.position(name).map(|idx| self.0[idx].1.as_str())
	}

	/// Removes `name`, returning its value when present.
	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.position(name).map(|idx| self.0.remove(idx).1)
	}

	/// Returns `true` when a header named `name` exists.
	pub fn contains(&self, name: &str) -> bool {
		self.position(name).is_some()
	}

	/// Iterates over `(name, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Returns the number of headers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no headers are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.0.iter().position(|(existing, _)| existing.eq_ignore_ascii_case(name))
	}
}
impl Debug for HeaderSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_map().entries(self.iter()).finish()
	}
}
impl From<Vec<(String, String)>> for HeaderSet {
	fn from(pairs: Vec<(String, String)>) -> Self {
		pairs.into_iter().collect()
	}
}
impl<K, V> FromIterator<(K, V)> for HeaderSet
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut headers = Self::new();

		for (name, value) in iter {
			headers.insert(name, value);
		}

		headers
	}
}
