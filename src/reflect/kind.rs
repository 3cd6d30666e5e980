use crate::reflect::LayoutId;

/// Runtime kind tag carried by every field and sequence element descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
	/// Integer of `width` bytes.
	Integer {
		/// Storage width in bytes (1, 2, 4, or 8).
		width: u8,
		/// Sign-extend when widening to `i64`.
		signed: bool,
	},
	/// IEEE-754 float of `width` bytes.
	Float {
		/// Storage width in bytes (4 or 8).
		width: u8,
	},
	/// One-byte boolean.
	Bool,
	/// Interned identifier, stored as a name table index.
	Name,
	/// Owned UTF-8 string.
	String,
	/// Display text; stored like a string but kept distinct.
	Text,
	/// Variable-length sequence of the inner kind.
	Sequence(Box<Kind>),
	/// Nested record stored inline.
	Record(LayoutId),
	/// Catalog kind the visitor does not understand.
	Unsupported {
		/// Original type text.
		tag: Box<str>,
		/// Declared storage size, 0 when unknown.
		size: usize,
	},
}

impl Kind {
	/// Return whether the kind holds a single scalar value.
	pub fn is_scalar(&self) -> bool {
		matches!(
			self,
			Self::Integer { .. } | Self::Float { .. } | Self::Bool | Self::Name | Self::String | Self::Text
		)
	}

	/// Return a primitive kind for a builtin type name.
	pub fn primitive(name: &str) -> Option<Self> {
		let kind = match name {
			"i8" => Self::Integer { width: 1, signed: true },
			"i16" => Self::Integer { width: 2, signed: true },
			"i32" => Self::Integer { width: 4, signed: true },
			"i64" => Self::Integer { width: 8, signed: true },
			"u8" => Self::Integer { width: 1, signed: false },
			"u16" => Self::Integer { width: 2, signed: false },
			"u32" => Self::Integer { width: 4, signed: false },
			"f32" => Self::Float { width: 4 },
			"f64" => Self::Float { width: 8 },
			"bool" => Self::Bool,
			"name" => Self::Name,
			"string" => Self::String,
			"text" => Self::Text,
			_ => return None,
		};
		Some(kind)
	}
}

/// Parsed base of a field type expression, before layout names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BaseExpr<'a> {
	/// Builtin scalar.
	Scalar(Kind),
	/// `seq<inner>`.
	Sequence(Box<BaseExpr<'a>>),
	/// Bare identifier; a record when the catalog defines it.
	Named(&'a str),
	/// Generic constructor other than `seq`, kept verbatim.
	Generic(&'a str),
}

/// Parsed field type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeExpr<'a> {
	/// Element type.
	pub base: BaseExpr<'a>,
	/// Flattened inline repetition count.
	pub array_dim: usize,
}

/// Parse `base ('[' N ']')*` into element type and repetition count.
pub(crate) fn parse_type_expr(raw: &str) -> Option<TypeExpr<'_>> {
	let trimmed = raw.trim();
	let split = dims_start(trimmed);
	let base = parse_base(trimmed[..split].trim())?;

	let mut tail = &trimmed[split..];
	let mut total = 1_usize;
	while !tail.is_empty() {
		let rest = tail.strip_prefix('[')?;
		let end = rest.find(']')?;
		let dim = rest[..end].trim().parse::<usize>().ok()?;
		total = total.saturating_mul(dim);
		tail = rest[end + 1..].trim_start();
	}

	Some(TypeExpr { base, array_dim: total })
}

fn parse_base(text: &str) -> Option<BaseExpr<'_>> {
	if text.is_empty() {
		return None;
	}

	if let Some(open) = text.find('<') {
		let inner = text.strip_suffix('>')?[open + 1..].trim();
		let ctor = text[..open].trim();
		if !is_ident(ctor) || inner.is_empty() {
			return None;
		}
		if ctor == "seq" {
			if dims_start(inner) != inner.len() {
				return None;
			}
			return Some(BaseExpr::Sequence(Box::new(parse_base(inner)?)));
		}
		return Some(BaseExpr::Generic(text));
	}

	if let Some(kind) = Kind::primitive(text) {
		return Some(BaseExpr::Scalar(kind));
	}
	is_ident(text).then_some(BaseExpr::Named(text))
}

fn dims_start(text: &str) -> usize {
	let mut depth = 0_i32;
	for (idx, ch) in text.char_indices() {
		match ch {
			'<' => depth += 1,
			'>' => depth -= 1,
			'[' if depth == 0 => return idx,
			_ => {}
		}
	}
	text.len()
}

fn is_ident(text: &str) -> bool {
	let mut chars = text.chars();
	let Some(first) = chars.next() else {
		return false;
	};
	(first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
