use layoutwalk::reflect::Compression;

use crate::cmd::test_support::{run_layoutwalk, run_layoutwalk_json, scene_snapshot};

#[test]
fn info_json_reports_blocks_and_roots() {
	let snapshot = scene_snapshot("info-json", Compression::Zstd);
	let snapshot = snapshot.to_string_lossy().into_owned();
	let json = run_layoutwalk_json(&["info", &snapshot, "--json"]);

	assert_eq!(json["compression"], "zstd");
	assert_eq!(json["format_version"], 1);
	assert_eq!(json["has_catalog"], true);
	assert_eq!(json["has_endb"], true);
	assert_eq!(json["last_code"], "ENDB");
	assert_eq!(json["layout_count"], 4);
	assert_eq!(json["freed_blocks"], 1);

	let roots = json["roots"].as_array().expect("roots array");
	let labels: Vec<&str> = roots.iter().filter_map(|root| root["label"].as_str()).collect();
	assert_eq!(labels, vec!["line", "polygon", "actor", "stale"]);
	assert!(roots[0]["addr"].as_str().is_some_and(|item| item.starts_with("0x")));
}

#[test]
fn info_rejects_non_snapshot_files() {
	let path = std::env::temp_dir().join(format!("layoutwalk-{}-not-a-snapshot.txt", std::process::id()));
	std::fs::write(&path, b"hello world").expect("write scratch file");
	let path = path.to_string_lossy().into_owned();

	let output = run_layoutwalk(&["info", &path]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: unsupported compression or not a snapshot"), "stderr was: {stderr}");
}
