use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reflect::kind::{BaseExpr, parse_type_expr};
use crate::reflect::storage::SLOT_SIZE;
use crate::reflect::{Kind, Result, WalkError};

/// Index of a record layout within its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutId(pub u32);

impl LayoutId {
	/// Return the id as a vector index.
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for LayoutId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Static metadata for one field of a record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	/// Field identifier.
	pub name: Box<str>,
	/// Type expression as written in the catalog description.
	pub type_name: Box<str>,
	/// Element kind.
	pub kind: Kind,
	/// Byte offset of the first element within the record.
	pub offset: usize,
	/// Inline repetition count.
	pub array_dim: usize,
}

/// Ordered field layout of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
	/// Record type name.
	pub name: Box<str>,
	/// Total record size in bytes.
	pub size: usize,
	/// Record alignment in bytes.
	pub align: usize,
	/// Field descriptors in declaration order.
	pub fields: Vec<FieldDescriptor>,
}

impl RecordLayout {
	/// Look up a field descriptor by name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name.as_ref() == name)
	}
}

/// Serializable description of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSpec {
	/// Record layouts in catalog order.
	#[serde(default)]
	pub layouts: Vec<LayoutSpec>,
}

/// Serializable description of one record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
	/// Record type name.
	pub name: String,
	/// Explicit total size; derived from fields when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<usize>,
	/// Fields in declaration order.
	#[serde(default)]
	pub fields: Vec<FieldSpec>,
}

/// Serializable description of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
	/// Field identifier.
	pub name: String,
	/// Type expression, for example `f32`, `seq<Point>`, or `i16[4]`.
	#[serde(rename = "type")]
	pub ty: String,
	/// Explicit byte offset; placed at natural alignment when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offset: Option<usize>,
	/// Element size for kinds the catalog cannot size itself; applies to the elements of `seq<...>`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<usize>,
}

impl CatalogSpec {
	/// Create an empty description.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a layout.
	pub fn layout(mut self, layout: LayoutSpec) -> Self {
		self.layouts.push(layout);
		self
	}

	/// Parse a JSON catalog description.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Render the description as compact JSON.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}

impl LayoutSpec {
	/// Create a layout with no fields.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			size: None,
			fields: Vec::new(),
		}
	}

	/// Fix the total record size.
	pub fn sized(mut self, size: usize) -> Self {
		self.size = Some(size);
		self
	}

	/// Append a sequentially placed field.
	pub fn field(self, name: impl Into<String>, ty: impl Into<String>) -> Self {
		self.with(FieldSpec::new(name, ty))
	}

	/// Append a field at an explicit byte offset.
	pub fn field_at(self, name: impl Into<String>, ty: impl Into<String>, offset: usize) -> Self {
		self.with(FieldSpec::new(name, ty).at(offset))
	}

	/// Append a prepared field description.
	pub fn with(mut self, field: FieldSpec) -> Self {
		self.fields.push(field);
		self
	}
}

impl FieldSpec {
	/// Create a sequentially placed field.
	pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: ty.into(),
			offset: None,
			size: None,
		}
	}

	/// Place the field at an explicit byte offset.
	pub fn at(mut self, offset: usize) -> Self {
		self.offset = Some(offset);
		self
	}

	/// Declare the element size of an otherwise unsized kind.
	pub fn sized(mut self, size: usize) -> Self {
		self.size = Some(size);
		self
	}
}

/// Validated record layouts addressable by id and name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	layouts: Vec<RecordLayout>,
	by_name: HashMap<Box<str>, LayoutId>,
}

struct PendingField<'a> {
	spec: &'a FieldSpec,
	kind: Kind,
	array_dim: usize,
}

#[derive(Clone)]
enum Mark {
	Unvisited,
	Active,
	Done { size: usize, align: usize },
}

struct Placer<'a, 'b> {
	specs: &'a [LayoutSpec],
	pending: &'b [Vec<PendingField<'a>>],
	marks: Vec<Mark>,
	offsets: Vec<Vec<usize>>,
}

impl Catalog {
	/// Build and validate a catalog from its description.
	pub fn build(spec: &CatalogSpec) -> Result<Self> {
		let mut by_name = HashMap::with_capacity(spec.layouts.len());
		for (idx, layout) in spec.layouts.iter().enumerate() {
			let id = LayoutId(idx as u32);
			if by_name.insert(layout.name.clone().into_boxed_str(), id).is_some() {
				return Err(WalkError::DuplicateLayout { name: layout.name.clone() });
			}
		}

		let mut pending = Vec::with_capacity(spec.layouts.len());
		for layout in &spec.layouts {
			let mut fields = Vec::with_capacity(layout.fields.len());
			for field in &layout.fields {
				let expr = parse_type_expr(&field.ty).ok_or_else(|| WalkError::InvalidTypeExpr {
					layout: layout.name.clone(),
					field: field.name.clone(),
					expr: field.ty.clone(),
				})?;
				fields.push(PendingField {
					spec: field,
					kind: resolve_base(&expr.base, &by_name, field.size),
					array_dim: expr.array_dim,
				});
			}
			pending.push(fields);
		}

		let mut placer = Placer {
			specs: &spec.layouts,
			pending: &pending,
			marks: vec![Mark::Unvisited; spec.layouts.len()],
			offsets: vec![Vec::new(); spec.layouts.len()],
		};
		let mut layouts = Vec::with_capacity(spec.layouts.len());
		for (idx, (layout, fields)) in spec.layouts.iter().zip(&pending).enumerate() {
			let (size, align) = placer.place(idx)?;
			let field_offsets = std::mem::take(&mut placer.offsets[idx]);
			let fields = fields
				.iter()
				.zip(field_offsets)
				.map(|(field, offset)| FieldDescriptor {
					name: field.spec.name.clone().into_boxed_str(),
					type_name: field.spec.ty.trim().to_owned().into_boxed_str(),
					kind: field.kind.clone(),
					offset,
					array_dim: field.array_dim,
				})
				.collect();
			layouts.push(RecordLayout {
				name: layout.name.clone().into_boxed_str(),
				size,
				align,
				fields,
			});
		}

		log::debug!("catalog built with {} layouts", layouts.len());
		Ok(Self { layouts, by_name })
	}

	/// Parse and build a catalog from JSON text.
	pub fn from_json(text: &str) -> Result<Self> {
		Self::build(&CatalogSpec::from_json(text)?)
	}

	/// Look up a layout by id.
	pub fn layout(&self, id: LayoutId) -> Option<&RecordLayout> {
		self.layouts.get(id.index())
	}

	/// Look up a layout and its id by record name.
	pub fn layout_by_name(&self, name: &str) -> Option<(LayoutId, &RecordLayout)> {
		let id = *self.by_name.get(name)?;
		Some((id, &self.layouts[id.index()]))
	}

	/// Return all layouts in catalog order.
	pub fn layouts(&self) -> &[RecordLayout] {
		&self.layouts
	}

	/// Return number of layouts.
	pub fn len(&self) -> usize {
		self.layouts.len()
	}

	/// Return whether the catalog has no layouts.
	pub fn is_empty(&self) -> bool {
		self.layouts.is_empty()
	}

	/// Storage size of one element of `kind`.
	pub fn size_of(&self, kind: &Kind) -> usize {
		match kind {
			Kind::Record(id) => self.layout(*id).map_or(0, |layout| layout.size),
			other => scalar_size(other),
		}
	}

	/// Storage alignment of one element of `kind`.
	pub fn align_of(&self, kind: &Kind) -> usize {
		match kind {
			Kind::Record(id) => self.layout(*id).map_or(1, |layout| layout.align),
			other => scalar_align(other),
		}
	}

	/// Render a kind using catalog layout names.
	pub fn kind_label(&self, kind: &Kind) -> String {
		match kind {
			Kind::Integer { width, signed } => format!("{}{}", if *signed { 'i' } else { 'u' }, u32::from(*width) * 8),
			Kind::Float { width } => format!("f{}", u32::from(*width) * 8),
			Kind::Bool => "bool".to_owned(),
			Kind::Name => "name".to_owned(),
			Kind::String => "string".to_owned(),
			Kind::Text => "text".to_owned(),
			Kind::Sequence(inner) => format!("seq<{}>", self.kind_label(inner)),
			Kind::Record(id) => self.layout(*id).map_or_else(|| format!("<layout {id}>"), |layout| layout.name.to_string()),
			Kind::Unsupported { tag, .. } => tag.to_string(),
		}
	}
}

impl Placer<'_, '_> {
	fn place(&mut self, idx: usize) -> Result<(usize, usize)> {
		match self.marks[idx] {
			Mark::Done { size, align } => return Ok((size, align)),
			Mark::Active => {
				return Err(WalkError::CyclicLayout {
					name: self.specs[idx].name.clone(),
				});
			}
			Mark::Unvisited => {}
		}
		self.marks[idx] = Mark::Active;

		let specs = self.specs;
		let pending = self.pending;
		let spec = &specs[idx];
		let mut cursor = 0_usize;
		let mut extent = 0_usize;
		let mut max_align = 1_usize;
		let mut offsets = Vec::with_capacity(pending[idx].len());

		for field in &pending[idx] {
			let (size, align) = match &field.kind {
				Kind::Record(id) => self.place(id.index())?,
				other => (scalar_size(other), scalar_align(other)),
			};
			max_align = max_align.max(align);

			let offset = field.spec.offset.unwrap_or_else(|| round_up(cursor, align));
			let end = offset.saturating_add(size.saturating_mul(field.array_dim));
			cursor = cursor.max(end);
			extent = extent.max(end);
			offsets.push(offset);

			if let Some(declared) = spec.size {
				if end > declared {
					return Err(WalkError::LayoutOverflow {
						layout: spec.name.clone(),
						field: field.spec.name.clone(),
						end,
						size: declared,
					});
				}
			}
		}

		let size = spec.size.unwrap_or_else(|| round_up(extent, max_align));
		self.offsets[idx] = offsets;
		self.marks[idx] = Mark::Done { size, align: max_align };
		Ok((size, max_align))
	}
}

fn resolve_base(base: &BaseExpr<'_>, by_name: &HashMap<Box<str>, LayoutId>, size_hint: Option<usize>) -> Kind {
	match base {
		BaseExpr::Scalar(kind) => kind.clone(),
		BaseExpr::Sequence(inner) => Kind::Sequence(Box::new(resolve_base(inner, by_name, size_hint))),
		BaseExpr::Named(name) => match by_name.get(*name) {
			Some(id) => Kind::Record(*id),
			None => Kind::Unsupported {
				tag: (*name).into(),
				size: size_hint.unwrap_or(0),
			},
		},
		BaseExpr::Generic(text) => Kind::Unsupported {
			tag: (*text).into(),
			size: size_hint.unwrap_or(0),
		},
	}
}

fn scalar_size(kind: &Kind) -> usize {
	match kind {
		Kind::Integer { width, .. } | Kind::Float { width } => usize::from(*width),
		Kind::Bool => 1,
		Kind::Name => 4,
		Kind::String | Kind::Text | Kind::Sequence(_) => SLOT_SIZE,
		Kind::Unsupported { size, .. } => *size,
		Kind::Record(_) => 0,
	}
}

fn scalar_align(kind: &Kind) -> usize {
	match kind {
		Kind::Integer { width, .. } | Kind::Float { width } => usize::from(*width),
		Kind::Bool => 1,
		Kind::Name => 4,
		Kind::String | Kind::Text | Kind::Sequence(_) => 8,
		Kind::Unsupported { .. } | Kind::Record(_) => 1,
	}
}

fn round_up(value: usize, align: usize) -> usize {
	if align <= 1 {
		return value;
	}
	value.div_ceil(align).saturating_mul(align)
}
