use crate::reflect::bytes::Cursor;
use crate::reflect::storage::{SequenceView, read_name, read_slot_string};
use crate::reflect::value::{FieldValue, RecordValue, Value};
use crate::reflect::{Catalog, FieldDescriptor, Kind, LayoutId, RecordLayout, Result, Storage, ValueHandle, WalkError};

/// What the visitor does with fields of a kind it does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
	/// Keep the field and map it to [`Value::Unsupported`].
	#[default]
	Mark,
	/// Drop the field from the record.
	Omit,
}

/// Runtime limits and behavior switches for value traversal.
#[derive(Debug, Clone)]
pub struct VisitOptions {
	/// Maximum record/sequence nesting depth.
	pub max_depth: u32,
	/// Maximum element count accepted from one sequence slot.
	pub max_sequence_len: usize,
	/// Handling of unsupported field kinds.
	pub unsupported: UnsupportedPolicy,
}

impl Default for VisitOptions {
	fn default() -> Self {
		Self {
			max_depth: 32,
			max_sequence_len: 65536,
			unsupported: UnsupportedPolicy::Mark,
		}
	}
}

impl VisitOptions {
	/// Preset tuned for interactive inspection output.
	pub fn for_inspect() -> Self {
		Self {
			max_depth: 12,
			max_sequence_len: 4096,
			unsupported: UnsupportedPolicy::Mark,
		}
	}
}

/// Record instance whose type is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnyRecord {
	/// Layout describing the instance.
	pub layout: LayoutId,
	/// Address of the first byte of the instance.
	pub addr: u64,
}

/// Visit every field of one record instance in declaration order.
///
/// Fields with `array_dim == 1` map to their single value; every other dimension maps to a
/// [`Value::Sequence`] of `array_dim` elements.
pub fn visit_record<S: Storage + ?Sized>(catalog: &Catalog, storage: &S, layout: &RecordLayout, base: ValueHandle, opt: &VisitOptions) -> Result<RecordValue> {
	Walker { catalog, storage, opt }.record(layout, base, 0)
}

/// Read one element of `field` at `handle`.
pub fn visit_field<S: Storage + ?Sized>(catalog: &Catalog, storage: &S, field: &FieldDescriptor, handle: ValueHandle, opt: &VisitOptions) -> Result<Value> {
	Walker { catalog, storage, opt }.value(&field.kind, handle, 0)
}

/// Read one value of `kind` at `handle`.
pub fn visit_value<S: Storage + ?Sized>(catalog: &Catalog, storage: &S, kind: &Kind, handle: ValueHandle, opt: &VisitOptions) -> Result<Value> {
	Walker { catalog, storage, opt }.value(kind, handle, 0)
}

/// Resolve a runtime-typed record and visit it.
pub fn visit_any<S: Storage + ?Sized>(catalog: &Catalog, storage: &S, root: AnyRecord, opt: &VisitOptions) -> Result<RecordValue> {
	let layout = catalog.layout(root.layout).ok_or(WalkError::UnknownLayout { id: root.layout.0 })?;
	let base = storage.resolve(root.addr)?;
	visit_record(catalog, storage, layout, base, opt)
}

struct Walker<'a, S: ?Sized> {
	catalog: &'a Catalog,
	storage: &'a S,
	opt: &'a VisitOptions,
}

impl<S: Storage + ?Sized> Walker<'_, S> {
	fn record(&self, layout: &RecordLayout, base: ValueHandle, depth: u32) -> Result<RecordValue> {
		if depth >= self.opt.max_depth {
			return Err(WalkError::DepthExceeded { max_depth: self.opt.max_depth });
		}
		log::trace!("visit {} at 0x{:016x}", layout.name, base.addr());

		let mut fields = Vec::with_capacity(layout.fields.len());
		for field in &layout.fields {
			if let Kind::Unsupported { tag, .. } = &field.kind {
				log::debug!("{}.{} has unsupported kind {tag}", layout.name, field.name);
				if self.opt.unsupported == UnsupportedPolicy::Omit {
					continue;
				}
			}

			let start = base.at(field.offset);
			let value = if field.array_dim == 1 {
				self.value(&field.kind, start, depth)?
			} else {
				let stride = self.catalog.size_of(&field.kind);
				let mut items = Vec::with_capacity(field.array_dim);
				for index in 0..field.array_dim {
					items.push(self.value(&field.kind, start.at(index * stride), depth)?);
				}
				Value::Sequence(items)
			};

			fields.push(FieldValue {
				name: field.name.clone(),
				value,
			});
		}

		Ok(RecordValue {
			type_name: layout.name.clone(),
			fields,
		})
	}

	fn value(&self, kind: &Kind, handle: ValueHandle, depth: u32) -> Result<Value> {
		match kind {
			Kind::Integer { width, signed } => match read_integer(self.storage, handle, *width, *signed)? {
				Some(value) => Ok(Value::Integer(value)),
				None => Ok(unsupported_width(self.catalog, kind)),
			},
			Kind::Float { width } => match read_float(self.storage, handle, *width)? {
				Some(value) => Ok(Value::Float(value)),
				None => Ok(unsupported_width(self.catalog, kind)),
			},
			Kind::Bool => Ok(Value::Bool(self.storage.read(handle, 1)?[0] != 0)),
			Kind::Name => Ok(Value::Name(read_name(self.storage, handle)?)),
			Kind::String => Ok(Value::String(read_slot_string(self.storage, handle)?)),
			Kind::Text => Ok(Value::Text(read_slot_string(self.storage, handle)?)),
			Kind::Sequence(inner) => self.sequence(inner, handle, depth + 1),
			Kind::Record(id) => {
				let layout = self.catalog.layout(*id).ok_or(WalkError::UnknownLayout { id: id.0 })?;
				Ok(Value::Record(self.record(layout, handle, depth + 1)?))
			}
			Kind::Unsupported { tag, .. } => Ok(Value::Unsupported { kind: tag.clone() }),
		}
	}

	fn sequence(&self, inner: &Kind, handle: ValueHandle, depth: u32) -> Result<Value> {
		if depth >= self.opt.max_depth {
			return Err(WalkError::DepthExceeded { max_depth: self.opt.max_depth });
		}

		let view = SequenceView::open(self.storage, handle, self.catalog.size_of(inner), self.opt.max_sequence_len)?;
		let mut items = Vec::with_capacity(view.len());
		for element in view.handles() {
			items.push(self.value(inner, element, depth)?);
		}
		Ok(Value::Sequence(items))
	}
}

fn read_integer<S: Storage + ?Sized>(storage: &S, handle: ValueHandle, width: u8, signed: bool) -> Result<Option<i64>> {
	if !matches!(width, 1 | 2 | 4 | 8) {
		return Ok(None);
	}

	let mut cursor = Cursor::new(storage.read(handle, usize::from(width))?);
	let value = match (width, signed) {
		(1, true) => i64::from(cursor.read_u8()? as i8),
		(1, false) => i64::from(cursor.read_u8()?),
		(2, true) => i64::from(cursor.read_u16_le()? as i16),
		(2, false) => i64::from(cursor.read_u16_le()?),
		(4, true) => i64::from(cursor.read_u32_le()? as i32),
		(4, false) => i64::from(cursor.read_u32_le()?),
		_ => cursor.read_i64_le()?,
	};
	Ok(Some(value))
}

fn read_float<S: Storage + ?Sized>(storage: &S, handle: ValueHandle, width: u8) -> Result<Option<f64>> {
	match width {
		4 => Ok(Some(f64::from(Cursor::new(storage.read(handle, 4)?).read_f32_le()?))),
		8 => Ok(Some(Cursor::new(storage.read(handle, 8)?).read_f64_le()?)),
		_ => Ok(None),
	}
}

fn unsupported_width(catalog: &Catalog, kind: &Kind) -> Value {
	let label = catalog.kind_label(kind);
	log::debug!("unsupported scalar width {label}");
	Value::Unsupported { kind: label.into_boxed_str() }
}
