use super::*;
use std::env;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const TWO_ORDER_DOC: &str = r#"{
  "tasks": [
    {
      "taskId": 3,
      "isTrainingTask": true,
      "orders": [
        {
          "orderId": 11,
          "receivingBinTag": "C11",
          "sourceBins": [
            {"binTag": "B31", "numItems": 2},
            {"binTag": "A32", "numItems": 1},
            {"binTag": "A12", "numItems": 4}
          ]
        },
        {
          "orderId": 12,
          "receivingBinTag": "C12",
          "sourceBins": [
            {"binTag": "A41", "numItems": 3}
          ]
        }
      ]
    },
    {
      "taskId": 4,
      "orders": [
        {
          "orderId": 13,
          "receivingBinTag": "C13",
          "sourceBins": [{"binTag": "B22", "numItems": 5}]
        }
      ]
    }
  ]
}"#;

fn tag(raw: &str) -> BinTag {
    BinTag::parse(raw).expect("valid tag")
}

#[test]
fn bin_tag_accepts_rack_letter_and_two_digits() {
    let parsed = tag("A32");
    assert_eq!(parsed.as_str(), "A32");
    assert_eq!(parsed.rack(), 'A');
    assert_eq!(tag("C11").rack(), 'C');
}

#[test]
fn bin_tag_rejects_malformed_values() {
    for raw in ["", "A3", "A321", "a32", "3A2", "AB2", "A3x", "*", "D11", "Z99"] {
        assert!(BinTag::parse(raw).is_err(), "{raw:?} should be rejected");
    }
}

#[test]
fn bin_tag_error_names_the_input() {
    let err = BinTag::parse("Z1").unwrap_err();
    assert!(err.to_string().contains("\"Z1\""));
}

#[test]
fn orders_split_per_rack_and_group_within_definition() {
    let sequence = parse_task_document(TWO_ORDER_DOC).expect("document parses");
    let summary: Vec<(u32, u32, char, &str)> = sequence
        .iter()
        .map(|task| {
            (
                task.task_id,
                task.order_id,
                task.rack,
                task.receive_bin.tag.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (3, 11, 'A', "C11"),
            (3, 12, 'A', "C12"),
            (3, 11, 'B', "C11"),
            (4, 13, 'B', "C13"),
        ]
    );
}

#[test]
fn split_tasks_keep_source_order_and_count_invariant() {
    let sequence = parse_task_document(TWO_ORDER_DOC).expect("document parses");
    let first = sequence.first().expect("at least one task");
    let tags: Vec<&str> = first.source_bins.iter().map(|bin| bin.tag.as_str()).collect();
    assert_eq!(tags, vec!["A32", "A12"]);
    for task in &sequence {
        assert_eq!(task.receive_bin.expected_count, task.total_items());
        assert!(!task.source_bins.is_empty());
    }
}

#[test]
fn training_flag_defaults_to_false() {
    let sequence = parse_task_document(TWO_ORDER_DOC).expect("document parses");
    let flags: Vec<bool> = sequence.iter().map(|task| task.training).collect();
    assert_eq!(flags, vec![true, true, true, false]);
}

#[test]
fn rejects_invalid_bin_tag() {
    let raw = r#"{"tasks":[{"taskId":1,"orders":[{"orderId":1,"receivingBinTag":"C11",
        "sourceBins":[{"binTag":"A3","numItems":1}]}]}]}"#;
    let err = parse_task_document(raw).unwrap_err();
    assert!(format!("{err:#}").contains("invalid bin tag"));
}

#[test]
fn rejects_bins_on_racks_the_hub_cannot_report() {
    for raw in [
        r#"{"tasks":[{"taskId":1,"orders":[{"orderId":5,"receivingBinTag":"C11",
            "sourceBins":[{"binTag":"D11","numItems":1}]}]}]}"#,
        r#"{"tasks":[{"taskId":1,"orders":[{"orderId":5,"receivingBinTag":"D11",
            "sourceBins":[{"binTag":"A11","numItems":1}]}]}]}"#,
    ] {
        let err = parse_task_document(raw).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("\"D11\""), "{message}");
        assert!(message.contains("racks ABC"), "{message}");
    }
}

#[test]
fn rejects_rack_total_that_overflows() {
    let raw = r#"{"tasks":[{"taskId":6,"orders":[{"orderId":21,"receivingBinTag":"C12",
        "sourceBins":[{"binTag":"B11","numItems":4000000000},
                      {"binTag":"A11","numItems":1},
                      {"binTag":"B12","numItems":4000000000}]}]}]}"#;
    let err = parse_task_document(raw).unwrap_err();
    assert_eq!(
        err.to_string(),
        "order 21 of task 6 has too many items on rack B"
    );
}

#[test]
fn large_counts_that_fit_are_kept() {
    let raw = r#"{"tasks":[{"taskId":6,"orders":[{"orderId":21,"receivingBinTag":"C12",
        "sourceBins":[{"binTag":"B11","numItems":4000000000},
                      {"binTag":"A11","numItems":4000000000}]}]}]}"#;
    let sequence = parse_task_document(raw).expect("per-rack totals fit");
    let totals: Vec<u32> = sequence
        .iter()
        .map(|task| task.receive_bin.expected_count)
        .collect();
    assert_eq!(totals, vec![4_000_000_000, 4_000_000_000]);
}

#[test]
fn rejects_order_without_source_bins() {
    let raw = r#"{"tasks":[{"taskId":2,"orders":[{"orderId":9,"receivingBinTag":"C11",
        "sourceBins":[]}]}]}"#;
    let err = parse_task_document(raw).unwrap_err();
    assert!(err.to_string().contains("order 9 of task 2"));
}

#[test]
fn rejects_malformed_json() {
    assert!(parse_task_document("{\"tasks\": [").is_err());
}

#[test]
fn empty_document_yields_empty_sequence() {
    let sequence = parse_task_document(r#"{"tasks": []}"#).expect("document parses");
    assert!(sequence.is_empty());
    assert_eq!(sequence.len(), 0);
}

#[test]
fn pick_list_lists_bins_and_targets() {
    let sequence = parse_task_document(TWO_ORDER_DOC).expect("document parses");
    let listing = sequence.render_pick_list();
    assert!(listing.contains("task 3 order 11 rack A (training)"));
    assert!(listing.contains("A32 x1"));
    assert!(listing.contains("-> C13 (5 items)"));
}

#[test]
fn load_task_file_reports_missing_path() {
    let err = load_task_file(Path::new("/nonexistent/pick_tasks.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read task file"));
}

#[test]
fn load_task_file_reads_document_from_disk() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = env::temp_dir().join(format!("pickbylight_tasks_{nanos}.json"));
    fs::write(&path, TWO_ORDER_DOC).expect("write task file");
    let sequence = load_task_file(&path).expect("load task file");
    let _ = fs::remove_file(&path);
    assert_eq!(sequence.len(), 4);
}
