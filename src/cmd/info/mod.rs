use std::path::PathBuf;

use layoutwalk::reflect::{Result, Snapshot};

use crate::cmd::util::{addr_hex, emit_json, render_code};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print header fields, block statistics, and recorded roots.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let snapshot = Snapshot::open(&path)?;
	let stats = snapshot.scan_block_stats()?;
	let catalog = snapshot.catalog()?;
	let roots = snapshot.roots()?;

	let mut entries: Vec<_> = stats.codes.into_iter().collect();
	entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			compression: snapshot.compression.as_str(),
			header_size: snapshot.header.header_size,
			format_version: snapshot.header.format_version,
			writer_version: snapshot.header.writer_version,
			block_count: stats.block_count,
			has_catalog: stats.has_catalog,
			has_endb: stats.has_endb,
			last_code: render_code(stats.last_code),
			data_bytes: stats.data_bytes,
			freed_blocks: stats.freed_blocks,
			layout_count: catalog.len(),
			codes: entries
				.iter()
				.map(|(code, count)| CodeCountJson {
					code: render_code(*code),
					count: *count,
				})
				.collect(),
			roots: roots
				.iter()
				.map(|root| RootJson {
					label: root.label.to_string(),
					layout: root.layout.to_string(),
					addr: addr_hex(root.addr),
				})
				.collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("compression: {}", snapshot.compression.as_str());
	println!("header_size: {}", snapshot.header.header_size);
	println!("format_version: {}", snapshot.header.format_version);
	println!("writer_version: {}", snapshot.header.writer_version);
	println!("block_count: {}", stats.block_count);
	println!("has_catalog: {}", stats.has_catalog);
	println!("has_endb: {}", stats.has_endb);
	println!("last_code: {}", render_code(stats.last_code));
	println!("data_bytes: {}", stats.data_bytes);
	println!("freed_blocks: {}", stats.freed_blocks);
	println!("layout_count: {}", catalog.len());

	println!("codes:");
	for (code, count) in entries {
		println!("  {}: {}", render_code(code), count);
	}

	println!("roots:");
	for root in &roots {
		println!("  {} {} {}", root.label, root.layout, addr_hex(root.addr));
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct CodeCountJson {
	code: String,
	count: u32,
}

#[derive(serde::Serialize)]
struct RootJson {
	label: String,
	layout: String,
	addr: String,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	compression: &'static str,
	header_size: usize,
	format_version: u16,
	writer_version: u16,
	block_count: u32,
	has_catalog: bool,
	has_endb: bool,
	last_code: String,
	data_bytes: u64,
	freed_blocks: u32,
	layout_count: usize,
	codes: Vec<CodeCountJson>,
	roots: Vec<RootJson>,
}

#[cfg(test)]
mod tests;
