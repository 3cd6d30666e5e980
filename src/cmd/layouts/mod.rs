use std::path::PathBuf;

use layoutwalk::reflect::{Catalog, Kind, RecordLayout, Result, Snapshot, WalkError};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub layout: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List catalog layouts, or print the fields of one layout.
pub fn run(args: Args) -> Result<()> {
	let Args { path, layout, json } = args;

	let snapshot = Snapshot::open(&path)?;
	let catalog = snapshot.catalog()?;

	let Some(name) = layout else {
		if json {
			let payload: Vec<_> = catalog.layouts().iter().map(|item| layout_json(&catalog, item)).collect();
			return emit_json(&payload);
		}

		println!("path: {}", path.display());
		println!("layout_count: {}", catalog.len());
		for item in catalog.layouts() {
			println!("  {} size={} align={} fields={}", item.name, item.size, item.align, item.fields.len());
		}
		return Ok(());
	};

	let (id, item) = catalog.layout_by_name(&name).ok_or(WalkError::LayoutNotFound { name })?;
	if json {
		return emit_json(&layout_json(&catalog, item));
	}

	println!("layout: {}", item.name);
	println!("layout_id: {}", id);
	println!("size: {}", item.size);
	println!("align: {}", item.align);
	println!("field_count: {}", item.fields.len());
	for field in &item.fields {
		let dim = if field.array_dim == 1 { String::new() } else { format!("[{}]", field.array_dim) };
		println!("  +{:<4} {} {}{}", field.offset, catalog.kind_label(&field.kind), field.name, dim);
	}

	Ok(())
}

fn layout_json(catalog: &Catalog, layout: &RecordLayout) -> LayoutJson {
	LayoutJson {
		name: layout.name.to_string(),
		size: layout.size,
		align: layout.align,
		fields: layout
			.fields
			.iter()
			.map(|field| FieldJson {
				name: field.name.to_string(),
				type_name: field.type_name.to_string(),
				kind: catalog.kind_label(&field.kind),
				offset: field.offset,
				array_dim: field.array_dim,
				supported: !matches!(field.kind, Kind::Unsupported { .. }),
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	kind: String,
	offset: usize,
	array_dim: usize,
	supported: bool,
}

#[derive(serde::Serialize)]
struct LayoutJson {
	name: String,
	size: usize,
	align: usize,
	fields: Vec<FieldJson>,
}

#[cfg(test)]
mod tests;
