use std::fs;
use std::path::Path;

use branchline_cli::commands::{self, Summary, PREVIEW_LINES};
use pretty_assertions::assert_eq;

const GOOD: &str = r##"
id: market
characters:
  vendor:
    name: Fruit Vendor
    color: "#33aa33"
start: hello
nodes:
  hello:
    say:
      speaker: vendor
      text: Fresh apples!
    next: pick
  pick:
    choice:
      - text: Buy one
        next: buy
      - text: No thanks
        next: bye
  buy:
    set:
      apples: 1
    next: bye
  bye:
    end: true
"##;

const BROKEN: &str = r#"
id: broken
start: a
nodes:
  a:
    say: Where to?
    next: nowhere
"#;

const LONG: &str = r#"
id: long
start: n1
nodes:
  n1: {say: One, next: n2}
  n2: {say: Two, next: n3}
  n3: {say: Three, next: n4}
  n4: {say: Four, next: n5}
  n5: {say: Five, next: n6}
  n6: {say: Six, next: n7}
  n7: {end: true}
"#;

fn write_sources(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn output(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_validate_reports_diagnostics() {
    let src = tempfile::tempdir().unwrap();
    write_sources(src.path(), &[("broken.yaml", BROKEN), ("market.yaml", GOOD)]);

    let mut buffer = Vec::new();
    let summary = commands::validate(src.path(), &mut buffer).unwrap();
    let text = output(buffer);

    assert_eq!(summary, Summary { ok: 1, errors: 1 });
    assert!(!summary.is_success());
    assert!(text.contains("ERR_VALIDATION_DANGLING_REFERENCE"));
    assert!(text.ends_with("1 valid, 1 with errors\n"));
}

#[test]
fn test_validate_counts_load_failures() {
    let src = tempfile::tempdir().unwrap();
    write_sources(src.path(), &[("bad.yaml", "nodes: [1, 2]\n")]);

    let mut buffer = Vec::new();
    let summary = commands::validate(src.path(), &mut buffer).unwrap();
    assert_eq!(summary, Summary { ok: 0, errors: 1 });
    assert!(output(buffer).contains("bad.yaml"));
}

#[test]
fn test_convert_writes_outputs() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(src.path(), &[("broken.yaml", BROKEN), ("market.yaml", GOOD)]);

    let mut buffer = Vec::new();
    let summary = commands::convert(src.path(), out.path(), false, &mut buffer).unwrap();
    let text = output(buffer);

    assert_eq!(summary, Summary { ok: 1, errors: 1 });
    assert!(text.contains("Skipping broken: dialogue has errors"));
    assert!(!out.path().join("broken.dtl").exists());

    let dtl = fs::read_to_string(out.path().join("market.dtl")).unwrap();
    assert_eq!(
        dtl,
        [
            "label hello",
            "vendor: Fresh apples!",
            "label pick",
            "- Buy one",
            "\tjump buy",
            "- No thanks",
            "\tjump bye",
            "label buy",
            "set {apples} = 1",
            "label bye",
            "[end_timeline]",
            "",
        ]
        .join("\n")
    );

    let json = fs::read_to_string(out.path().join("market.timeline.json")).unwrap();
    assert!(json.contains("\"event_name\": \"label\""));

    let character = fs::read_to_string(out.path().join("characters").join("vendor.dch")).unwrap();
    assert!(character.contains("\"display_name\": \"Fruit Vendor\""));
}

#[test]
fn test_convert_dry_run_previews() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(src.path(), &[("long.yml", LONG)]);

    let mut buffer = Vec::new();
    let summary = commands::convert(src.path(), &out.path().join("gen"), true, &mut buffer).unwrap();
    let text = output(buffer);

    assert!(summary.is_success());
    assert!(!out.path().join("gen").exists());

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "--- long.dtl ---");
    assert_eq!(lines[1..=PREVIEW_LINES].last(), Some(&"Five"));
    // 6 say nodes and one end node, two lines each
    assert_eq!(lines[PREVIEW_LINES + 1], "... (4 more lines)");
}

#[test]
fn test_format_rewrites_in_place() {
    let src = tempfile::tempdir().unwrap();
    let path = src.path().join("market.yaml");
    fs::write(&path, GOOD).unwrap();

    let mut buffer = Vec::new();
    commands::format(&path, &mut buffer).unwrap();
    assert!(output(buffer).starts_with("Formatted "));

    let formatted = fs::read_to_string(&path).unwrap();
    assert!(formatted.starts_with("id: market\n"));
    assert!(formatted.contains("ui:"));

    // Formatting is idempotent
    let mut buffer = Vec::new();
    commands::format(&path, &mut buffer).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), formatted);
}

#[test]
fn test_format_empty_file_fails() {
    let src = tempfile::tempdir().unwrap();
    let path = src.path().join("empty.yaml");
    fs::write(&path, "").unwrap();

    let mut buffer = Vec::new();
    let error = commands::format(&path, &mut buffer).unwrap_err();
    assert!(error.to_string().contains("is empty"));
}

#[test]
fn test_convert_rejects_ids_outside_output_dir() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let escaping = "id: ../escaped\nstart: a\nnodes:\n  a:\n    end: true\n";
    let bad_character = "id: fine\ncharacters:\n  ../npc: Sneaky\nstart: a\nnodes:\n  a:\n    end: true\n";
    write_sources(src.path(), &[("a.yaml", escaping), ("b.yaml", bad_character)]);

    let gen = out.path().join("gen");
    let mut buffer = Vec::new();
    let summary = commands::convert(src.path(), &gen, false, &mut buffer).unwrap();
    let text = output(buffer);

    assert_eq!(summary, Summary { ok: 0, errors: 2 });
    assert!(text.contains("'../escaped' cannot be used as a file name"));
    assert!(text.contains("'../npc' cannot be used as a file name"));
    assert!(!out.path().join("escaped.dtl").exists());
    assert!(!gen.join("fine.dtl").exists());
}

#[test]
fn test_safe_file_stems() {
    assert!(commands::is_safe_file_stem("village_intro"));
    assert!(commands::is_safe_file_stem("act1.scene2"));
    assert!(!commands::is_safe_file_stem(""));
    assert!(!commands::is_safe_file_stem(".."));
    assert!(!commands::is_safe_file_stem("a/b"));
    assert!(!commands::is_safe_file_stem("a\\b"));
}
