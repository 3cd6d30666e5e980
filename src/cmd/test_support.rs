use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use layoutwalk::reflect::{Arena, CatalogSpec, Compression, FieldSpec, LayoutSpec, SnapshotWriter};

static LAYOUTWALK_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Write the shared scene snapshot under the temp dir and return its path.
///
/// Roots: `line` (Line), `polygon` (Polygon with three points), `actor` (Actor with an unsupported
/// delegate field), `stale` (freed Line).
pub(crate) fn scene_snapshot(name: &str, compression: Compression) -> PathBuf {
	let spec = CatalogSpec::new()
		.layout(LayoutSpec::new("Point").field("x", "f32").field("y", "f32"))
		.layout(LayoutSpec::new("Line").field("start", "Point").field("end", "Point"))
		.layout(LayoutSpec::new("Polygon").field("points", "seq<Point>").field("flags", "u8[2]"))
		.layout(
			LayoutSpec::new("Actor")
				.field("id", "name")
				.field("title", "text")
				.with(FieldSpec::new("on_hit", "delegate").sized(8))
				.field("health", "i32"),
		);

	let mut arena = Arena::new();
	let line = arena.alloc(floats(&[0.0, 0.0, 3.0, 4.0]));
	let stale = arena.alloc(floats(&[1.0, 1.0, 2.0, 2.0]));
	arena.free(stale);

	let points = arena.alloc_seq(floats(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]), 3);
	let mut polygon = points.encode().to_vec();
	polygon.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
	let polygon = arena.alloc(polygon);

	let id = arena.intern("hero");
	let title = arena.alloc_str("The Hero");
	let mut actor = vec![0_u8; 8];
	actor[..4].copy_from_slice(&id.to_le_bytes());
	actor.extend_from_slice(&title.encode());
	actor.extend_from_slice(&[0; 8]);
	actor.extend_from_slice(&75_i32.to_le_bytes());
	actor.extend_from_slice(&[0; 4]);
	let actor = arena.alloc(actor);

	let path = std::env::temp_dir().join(format!("layoutwalk-{}-{name}.lws", std::process::id()));
	SnapshotWriter::new(&spec, &arena)
		.root("line", "Line", line)
		.root("polygon", "Polygon", polygon)
		.root("actor", "Actor", actor)
		.root("stale", "Line", stale)
		.write(&path, compression)
		.expect("scene snapshot writes");
	path
}

pub(crate) fn run_layoutwalk(args: &[&str]) -> Output {
	Command::new(layoutwalk_bin()).args(args).output().expect("layoutwalk command executes")
}

pub(crate) fn run_layoutwalk_json(args: &[&str]) -> serde_json::Value {
	let output = run_layoutwalk(args);
	assert!(
		output.status.success(),
		"layoutwalk command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn floats(values: &[f32]) -> Vec<u8> {
	values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn layoutwalk_bin() -> &'static PathBuf {
	LAYOUTWALK_BIN.get_or_init(resolve_layoutwalk_bin)
}

fn resolve_layoutwalk_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_layoutwalk") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| manifest_dir.join("target"));

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "layoutwalk.exe" } else { "layoutwalk" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "layoutwalk"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build layoutwalk binary at {}", bin.display());

	bin
}
