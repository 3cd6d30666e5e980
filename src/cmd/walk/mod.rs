use std::path::PathBuf;

use layoutwalk::reflect::{AnyRecord, RecordValue, Result, Snapshot, UnsupportedPolicy, Value, VisitOptions, WalkError, visit_any};

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::{addr_hex, emit_json, parse_addr};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub root: Option<String>,
	#[arg(long)]
	pub layout: Option<String>,
	#[arg(long)]
	pub addr: Option<String>,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-seq")]
	pub max_seq: Option<usize>,
	#[arg(long = "omit-unsupported")]
	pub omit_unsupported: bool,
}

enum RootSelector {
	Label(String),
	Explicit { layout: String, addr: u64 },
	First,
}

/// Visit one root record of a snapshot and print its value tree.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		root,
		layout,
		addr,
		json,
		max_depth,
		max_seq,
		omit_unsupported,
	} = args;

	let selector = parse_root_selector(root, layout, addr)?;

	let mut options = VisitOptions::for_inspect();
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}
	if let Some(max_seq) = max_seq {
		options.max_sequence_len = max_seq;
	}
	if omit_unsupported {
		options.unsupported = UnsupportedPolicy::Omit;
	}

	let snapshot = Snapshot::open(&path)?;
	let catalog = snapshot.catalog()?;
	let arena = snapshot.arena()?;

	let (label, target) = match selector {
		RootSelector::Label(label) => {
			let root = snapshot.root_by_label(&label)?;
			(label, root.bind(&catalog)?)
		}
		RootSelector::Explicit { layout, addr } => {
			let (id, _) = catalog.layout_by_name(&layout).ok_or(WalkError::LayoutNotFound { name: layout.clone() })?;
			(format!("{layout}@{}", addr_hex(addr)), AnyRecord { layout: id, addr })
		}
		RootSelector::First => {
			let root = snapshot.roots()?.into_iter().next().ok_or(WalkError::NoRoots)?;
			let target = root.bind(&catalog)?;
			(root.label.into_string(), target)
		}
	};

	let layout_name = catalog.layout(target.layout).map(|item| item.name.to_string()).unwrap_or_default();
	log::debug!("walking {label} as {layout_name} at {}", addr_hex(target.addr));
	let value = visit_any(&catalog, &arena, target, &options)?;

	if json {
		let payload = WalkJson {
			path: path.display().to_string(),
			root: label,
			layout: layout_name,
			addr: addr_hex(target.addr),
			value: &value,
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("root: {label}");
	println!("layout: {layout_name}");
	println!("addr: {}", addr_hex(target.addr));
	print_value(&Value::Record(value), PrintOptions::default());
	Ok(())
}

fn parse_root_selector(root: Option<String>, layout: Option<String>, addr: Option<String>) -> Result<RootSelector> {
	match (root, layout, addr) {
		(Some(label), None, None) => Ok(RootSelector::Label(label)),
		(None, Some(layout), Some(addr)) => Ok(RootSelector::Explicit {
			layout,
			addr: parse_addr(&addr)?,
		}),
		(None, None, None) => Ok(RootSelector::First),
		(Some(_), _, _) => Err(WalkError::InvalidRootSelector {
			reason: "--root cannot be combined with --layout/--addr",
		}),
		_ => Err(WalkError::InvalidRootSelector {
			reason: "--layout and --addr must be given together",
		}),
	}
}

#[derive(serde::Serialize)]
struct WalkJson<'a> {
	path: String,
	root: String,
	layout: String,
	addr: String,
	value: &'a RecordValue,
}
