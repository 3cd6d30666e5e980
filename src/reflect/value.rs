use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Materialized value produced by the visitor.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Integer scalar, widened to `i64`.
	Integer(i64),
	/// Float scalar, widened to `f64`.
	Float(f64),
	/// Boolean scalar.
	Bool(bool),
	/// Interned identifier.
	Name(Box<str>),
	/// Owned string.
	String(Box<str>),
	/// Display text.
	Text(Box<str>),
	/// Ordered elements of a sequence or inline array.
	Sequence(Vec<Value>),
	/// Nested record.
	Record(RecordValue),
	/// Placeholder for a kind the visitor does not understand.
	Unsupported {
		/// Catalog type text of the skipped kind.
		kind: Box<str>,
	},
}

/// Record value with field names preserved in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
	/// Record type name from the catalog.
	pub type_name: Box<str>,
	/// Field values in declaration order.
	pub fields: Vec<FieldValue>,
}

/// Named field value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Field identifier.
	pub name: Box<str>,
	/// Field payload.
	pub value: Value,
}

impl Value {
	/// Short lowercase label of the value variant.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::Integer(_) => "integer",
			Self::Float(_) => "float",
			Self::Bool(_) => "bool",
			Self::Name(_) => "name",
			Self::String(_) => "string",
			Self::Text(_) => "text",
			Self::Sequence(_) => "sequence",
			Self::Record(_) => "record",
			Self::Unsupported { .. } => "unsupported",
		}
	}

	/// Borrow the record payload, if any.
	pub fn as_record(&self) -> Option<&RecordValue> {
		match self {
			Self::Record(item) => Some(item),
			_ => None,
		}
	}

	/// Borrow the sequence elements, if any.
	pub fn as_sequence(&self) -> Option<&[Value]> {
		match self {
			Self::Sequence(items) => Some(items),
			_ => None,
		}
	}
}

impl RecordValue {
	/// Look up a field value by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}

	/// Iterate field names in declaration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|field| field.name.as_ref())
	}
}

/// Strings serialize bare; names, texts, and unsupported markers are wrapped in a one-key object so the
/// three textual kinds stay distinguishable in JSON.
impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Integer(v) => serializer.serialize_i64(*v),
			Self::Float(v) => serializer.serialize_f64(*v),
			Self::Bool(v) => serializer.serialize_bool(*v),
			Self::String(v) => serializer.serialize_str(v),
			Self::Name(v) => tagged(serializer, "name", v),
			Self::Text(v) => tagged(serializer, "text", v),
			Self::Unsupported { kind } => tagged(serializer, "unsupported", kind),
			Self::Sequence(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Record(item) => item.serialize(serializer),
		}
	}
}

impl Serialize for RecordValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.fields.len()))?;
		for field in &self.fields {
			map.serialize_entry(field.name.as_ref(), &field.value)?;
		}
		map.end()
	}
}

fn tagged<S: Serializer>(serializer: S, tag: &str, value: &str) -> Result<S::Ok, S::Error> {
	let mut map = serializer.serialize_map(Some(1))?;
	map.serialize_entry(tag, value)?;
	map.end()
}
