use layoutwalk::reflect::Compression;

use crate::cmd::test_support::{run_layoutwalk, run_layoutwalk_json, scene_snapshot};

#[test]
fn layouts_json_lists_catalog_in_order() {
	let snapshot = scene_snapshot("layouts-all", Compression::None);
	let snapshot = snapshot.to_string_lossy().into_owned();
	let json = run_layoutwalk_json(&["layouts", &snapshot, "--json"]);

	let names: Vec<&str> = json
		.as_array()
		.expect("layout array")
		.iter()
		.filter_map(|item| item["name"].as_str())
		.collect();
	assert_eq!(names, vec!["Point", "Line", "Polygon", "Actor"]);
}

#[test]
fn layout_json_shows_offsets_and_kinds() {
	let snapshot = scene_snapshot("layouts-actor", Compression::None);
	let snapshot = snapshot.to_string_lossy().into_owned();
	let json = run_layoutwalk_json(&["layouts", &snapshot, "--layout", "Actor", "--json"]);

	assert_eq!(json["size"], 40);
	let fields = json["fields"].as_array().expect("field array");
	assert_eq!(fields[1]["name"], "title");
	assert_eq!(fields[1]["offset"], 8);
	assert_eq!(fields[1]["kind"], "text");
	assert_eq!(fields[2]["type"], "delegate");
	assert_eq!(fields[2]["supported"], false);
	assert_eq!(fields[3]["offset"], 32);
}

#[test]
fn unknown_layout_fails() {
	let snapshot = scene_snapshot("layouts-missing", Compression::None);
	let snapshot = snapshot.to_string_lossy().into_owned();
	let output = run_layoutwalk(&["layouts", &snapshot, "--layout", "Ghost"]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("Ghost"));
}
