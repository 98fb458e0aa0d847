//! Dotted field paths into a form's value tree
//!
//! Fields are addressed the way the UI names them: object keys and array
//! indices joined by dots (`social.twitter`, `phones.0`,
//! `ph_numbers.1.number`).

use serde_json::Value;
use std::fmt;

/// One step of a [`FieldPath`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
	Key(String),
	Index(usize),
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Segment::Key(k) => write!(f, "{}", k),
			Segment::Index(i) => write!(f, "{}", i),
		}
	}
}

/// A parsed dotted path addressing one slot in the value tree.
///
/// Purely-numeric segments are treated as array indices, everything else as
/// object keys. Empty segments are ignored, so `""` parses to the root path.
///
/// # Examples
///
/// ```
/// use grappelli_forms::FieldPath;
///
/// let path = FieldPath::from("ph_numbers.1.number");
/// assert_eq!(path.to_string(), "ph_numbers.1.number");
/// assert_eq!(path.len(), 3);
///
/// let root = FieldPath::from("");
/// assert!(root.is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
	segments: Vec<Segment>,
}

impl FieldPath {
	/// The empty path, addressing the whole record.
	pub fn root() -> Self {
		Self { segments: vec![] }
	}

	/// Build a single-key path without going through the parser.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_forms::FieldPath;
	///
	/// assert_eq!(FieldPath::key("email"), FieldPath::from("email"));
	/// ```
	pub fn key(key: impl Into<String>) -> Self {
		Self {
			segments: vec![Segment::Key(key.into())],
		}
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	pub fn is_root(&self) -> bool {
		self.segments.is_empty()
	}

	/// Append an object key.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_forms::FieldPath;
	///
	/// let path = FieldPath::from("social").child("twitter");
	/// assert_eq!(path.to_string(), "social.twitter");
	/// ```
	pub fn child(&self, key: impl Into<String>) -> Self {
		let mut segments = self.segments.clone();
		segments.push(Segment::Key(key.into()));
		Self { segments }
	}

	/// Append an array index.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_forms::FieldPath;
	///
	/// let path = FieldPath::from("ph_numbers").index(2).child("number");
	/// assert_eq!(path.to_string(), "ph_numbers.2.number");
	/// ```
	pub fn index(&self, index: usize) -> Self {
		let mut segments = self.segments.clone();
		segments.push(Segment::Index(index));
		Self { segments }
	}

	/// The path with the last segment removed, or `None` at the root.
	pub fn parent(&self) -> Option<Self> {
		if self.segments.is_empty() {
			return None;
		}
		Some(Self {
			segments: self.segments[..self.segments.len() - 1].to_vec(),
		})
	}

	/// Whether `prefix` is a (non-strict) ancestor of this path.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_forms::FieldPath;
	///
	/// let path = FieldPath::from("social.twitter");
	/// assert!(path.starts_with(&FieldPath::from("social")));
	/// assert!(path.starts_with(&path));
	/// assert!(!path.starts_with(&FieldPath::from("phones")));
	/// ```
	pub fn starts_with(&self, prefix: &FieldPath) -> bool {
		self.segments.len() >= prefix.segments.len()
			&& self.segments[..prefix.segments.len()] == prefix.segments[..]
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, segment) in self.segments.iter().enumerate() {
			if i > 0 {
				write!(f, ".")?;
			}
			write!(f, "{}", segment)?;
		}
		Ok(())
	}
}

impl From<&str> for FieldPath {
	fn from(raw: &str) -> Self {
		let segments = raw
			.split('.')
			.filter(|s| !s.is_empty())
			.map(|s| match s.parse::<usize>() {
				Ok(i) => Segment::Index(i),
				Err(_) => Segment::Key(s.to_string()),
			})
			.collect();
		Self { segments }
	}
}

impl From<&FieldPath> for FieldPath {
	fn from(path: &FieldPath) -> Self {
		path.clone()
	}
}

impl From<String> for FieldPath {
	fn from(raw: String) -> Self {
		FieldPath::from(raw.as_str())
	}
}

/// Read the value at `path`, if present.
pub(crate) fn get_at<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
	let mut current = root;
	for segment in path.segments() {
		current = match segment {
			Segment::Key(k) => current.as_object()?.get(k)?,
			Segment::Index(i) => current.as_array()?.get(*i)?,
		};
	}
	Some(current)
}

/// Write `value` at `path`, creating intermediate objects and arrays.
///
/// Arrays are padded with `Null` up to the addressed index; a scalar found
/// where a container is needed is replaced by the container.
pub(crate) fn set_at(root: &mut Value, path: &FieldPath, value: Value) {
	let mut current = root;
	for (pos, segment) in path.segments().iter().enumerate() {
		let last = pos == path.len() - 1;
		match segment {
			Segment::Key(k) => {
				if !current.is_object() {
					*current = Value::Object(serde_json::Map::new());
				}
				let map = current.as_object_mut().expect("just installed an object");
				if last {
					map.insert(k.clone(), value);
					return;
				}
				current = map.entry(k.clone()).or_insert(Value::Null);
			}
			Segment::Index(i) => {
				if !current.is_array() {
					*current = Value::Array(vec![]);
				}
				let arr = current.as_array_mut().expect("just installed an array");
				while arr.len() <= *i {
					arr.push(Value::Null);
				}
				if last {
					arr[*i] = value;
					return;
				}
				current = &mut arr[*i];
			}
		}
	}
	// Root path: replace the record wholesale.
	*current = value;
}

/// Remove the slot at `path`. Array removals shift later elements down.
pub(crate) fn remove_at(root: &mut Value, path: &FieldPath) -> Option<Value> {
	let parent = path.parent()?;
	let container = get_at_mut(root, &parent)?;
	match path.segments().last()? {
		Segment::Key(k) => container.as_object_mut()?.remove(k),
		Segment::Index(i) => {
			let arr = container.as_array_mut()?;
			if *i < arr.len() {
				Some(arr.remove(*i))
			} else {
				None
			}
		}
	}
}

fn get_at_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
	let mut current = root;
	for segment in path.segments() {
		current = match segment {
			Segment::Key(k) => current.as_object_mut()?.get_mut(k)?,
			Segment::Index(i) => current.as_array_mut()?.get_mut(*i)?,
		};
	}
	Some(current)
}

/// Re-home `path` after row `removed` was deleted from the array at `prefix`.
///
/// Returns `None` when the path pointed into the removed row, the shifted
/// path when it pointed past it, and the path unchanged otherwise.
pub(crate) fn shift_after_remove(
	path: &FieldPath,
	prefix: &FieldPath,
	removed: usize,
) -> Option<FieldPath> {
	if !path.starts_with(prefix) || path.len() == prefix.len() {
		return Some(path.clone());
	}
	match path.segments()[prefix.len()] {
		Segment::Index(i) if i == removed => None,
		Segment::Index(i) if i > removed => {
			let mut segments = path.segments().to_vec();
			segments[prefix.len()] = Segment::Index(i - 1);
			Some(FieldPath { segments })
		}
		_ => Some(path.clone()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("username", 1)]
	#[case("social.twitter", 2)]
	#[case("phones.0", 2)]
	#[case("ph_numbers.1.number", 3)]
	fn test_parse_roundtrip(#[case] raw: &str, #[case] len: usize) {
		// Arrange & Act
		let path = FieldPath::from(raw);

		// Assert
		assert_eq!(path.len(), len);
		assert_eq!(path.to_string(), raw);
	}

	#[rstest]
	fn test_numeric_segments_become_indices() {
		let path = FieldPath::from("phones.1");
		assert_eq!(path.segments()[1], Segment::Index(1));
	}

	#[rstest]
	fn test_empty_segments_are_skipped() {
		assert_eq!(FieldPath::from("a..b"), FieldPath::from("a.b"));
		assert!(FieldPath::from("").is_root());
	}

	#[rstest]
	fn test_get_at_nested() {
		let record = json!({
			"social": { "twitter": "@me" },
			"phones": ["111", "333"],
		});

		assert_eq!(
			get_at(&record, &FieldPath::from("social.twitter")),
			Some(&json!("@me"))
		);
		assert_eq!(get_at(&record, &FieldPath::from("phones.1")), Some(&json!("333")));
		assert_eq!(get_at(&record, &FieldPath::from("phones.7")), None);
		assert_eq!(get_at(&record, &FieldPath::from("missing.deep")), None);
	}

	#[rstest]
	fn test_set_at_creates_intermediates() {
		// Arrange
		let mut record = json!({});

		// Act
		set_at(&mut record, &FieldPath::from("social.twitter"), json!("@me"));
		set_at(&mut record, &FieldPath::from("ph_numbers.1.number"), json!("42"));

		// Assert
		assert_eq!(
			record,
			json!({
				"social": { "twitter": "@me" },
				"ph_numbers": [null, { "number": "42" }],
			})
		);
	}

	#[rstest]
	fn test_set_at_root_replaces_record() {
		let mut record = json!({ "a": 1 });
		set_at(&mut record, &FieldPath::root(), json!({ "b": 2 }));
		assert_eq!(record, json!({ "b": 2 }));
	}

	#[rstest]
	fn test_remove_at_shifts_array() {
		let mut record = json!({ "ph_numbers": [{ "number": "a" }, { "number": "b" }] });

		let removed = remove_at(&mut record, &FieldPath::from("ph_numbers.0"));

		assert_eq!(removed, Some(json!({ "number": "a" })));
		assert_eq!(record, json!({ "ph_numbers": [{ "number": "b" }] }));
	}

	#[rstest]
	#[case("ph_numbers.0.number", Some("ph_numbers.0.number"))]
	#[case("ph_numbers.1.number", None)]
	#[case("ph_numbers.2.number", Some("ph_numbers.1.number"))]
	#[case("email", Some("email"))]
	fn test_shift_after_remove(#[case] raw: &str, #[case] expected: Option<&str>) {
		// Arrange
		let prefix = FieldPath::from("ph_numbers");

		// Act
		let shifted = shift_after_remove(&FieldPath::from(raw), &prefix, 1);

		// Assert
		assert_eq!(shifted, expected.map(FieldPath::from));
	}
}
