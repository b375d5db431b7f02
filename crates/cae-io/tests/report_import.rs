//! Report import against geometry parts.

use std::fs;

use cae_io::{
    GeometryImporter, ImportError, NodeBound, PartGeometry, RecordingProgress, ReportDiagnostic,
    ReportFormat, ReportImporter,
};
use nalgebra::Vector3;

fn part_with_nodes(count: usize) -> PartGeometry {
    let mut deck = String::from("*Part, name=Coil\n*Node\n");
    for id in 1..=count {
        deck.push_str(&format!("{id}, {id}., 0., 0.\n"));
    }
    deck.push_str("*End Part\n");
    let import = GeometryImporter::import_str(&deck, None).expect("deck imports");
    import.part("Coil").expect("coil part").clone()
}

fn nonzero_cells(model: &cae_io::ReportModel) -> usize {
    model
        .snapshots()
        .iter()
        .flat_map(|s| s.displacements.iter())
        .flat_map(|d| d.iter())
        .filter(|v| **v != 0.0)
        .count()
}

#[test]
fn single_block_lands_in_one_node_and_axis() {
    let report = "\
                    U:U2 PI: COIL-1
          X                N: 3

          0.               0.5
          1.               1.5
";
    let model = ReportImporter::default()
        .import_str(report, &part_with_nodes(4))
        .expect("report imports");

    assert_eq!(model.part_name(), "Coil");
    assert_eq!(model.times(), &[0.0, 1.0]);
    assert_eq!(model.node_count(), 4);
    assert_eq!(model.snapshots()[0].displacements[2], Vector3::new(0.0, 0.5, 0.0));
    assert_eq!(model.snapshots()[1].displacements[2], Vector3::new(0.0, 1.5, 0.0));
    assert_eq!(nonzero_cells(&model), 2);
    assert!(model.diagnostics().is_empty());
}

#[test]
fn mid_edge_node_block_is_skipped() {
    let report = "\
X  U:U1 N: 1

0.   1.
1.   2.

X  U:U3 N: 10

0.   5.
1.   6.
";
    let model = ReportImporter::default()
        .import_str(report, &part_with_nodes(4))
        .expect("out-of-range blocks do not fail the import");

    assert_eq!(nonzero_cells(&model), 2);
    assert_eq!(
        model.diagnostics(),
        &[ReportDiagnostic::OutOfRangeNode {
            line: 6,
            node: 9,
            limit: 3
        }]
    );
}

#[test]
fn highest_node_id_is_outside_the_default_bound() {
    // 4 nodes, max node id 3; `N: 4` is node index 3.
    let report = "X U:U1 N: 4\n\n0. 7.\n1. 8.\n";
    let part = part_with_nodes(4);

    let model = ReportImporter::default().import_str(report, &part).expect("report imports");
    assert_eq!(nonzero_cells(&model), 0);
    assert_eq!(
        model.diagnostics(),
        &[ReportDiagnostic::OutOfRangeNode {
            line: 1,
            node: 3,
            limit: 3
        }]
    );

    let format = ReportFormat {
        node_bound: NodeBound::NodeCount,
        ..ReportFormat::standard()
    };
    let model = ReportImporter::new(format).import_str(report, &part).expect("report imports");
    assert_eq!(model.snapshots()[1].displacements[3], Vector3::new(8.0, 0.0, 0.0));
    assert!(model.diagnostics().is_empty());
}

#[test]
fn legacy_format_reads_literal_marker() {
    let report = "X  U:U3 N: 2\n\n0. -1.\n0.5 -2.\n";
    let model = ReportImporter::new(ReportFormat::legacy())
        .import_str(report, &part_with_nodes(3))
        .expect("legacy report imports");
    assert_eq!(model.snapshots()[1].displacements[1], Vector3::new(0.0, 0.0, -2.0));
}

#[test]
fn non_monotonic_times_are_kept() {
    let report = "X U:U1 N: 1\n\n0. 1.\n1. 2.\n1. 3.\n";
    let model = ReportImporter::default()
        .import_str(report, &part_with_nodes(2))
        .expect("report imports");
    assert_eq!(model.times(), &[0.0, 1.0, 1.0]);
    assert!(matches!(
        model.diagnostics(),
        [ReportDiagnostic::NonMonotonicTime { index: 2, .. }]
    ));
}

#[test]
fn format_file_and_report_file_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let format_path = dir.path().join("format.json");
    fs::write(&format_path, r#"{ "node_id_base": 0 }"#).expect("format written");
    let report_path = dir.path().join("coil.rpt");
    fs::write(&report_path, "X U:U1 N: 0\n\n0. 4.\n").expect("report written");

    let format = ReportFormat::from_json_file(&format_path).expect("format loads");
    let mut recorder = RecordingProgress::default();
    let model = ReportImporter::new(format)
        .import_file(&report_path, &part_with_nodes(2), Some(&mut recorder))
        .expect("report imports");

    assert_eq!(model.snapshots()[0].displacements[0], Vector3::new(4.0, 0.0, 0.0));
    assert!(recorder.events.iter().all(|e| e.unit == "bytes"));
    assert!(!recorder.events.is_empty());
}

#[test]
fn report_without_headers_is_fatal() {
    let err = ReportImporter::default()
        .import_str("0. 1.\n1. 2.\n", &part_with_nodes(1))
        .expect_err("no header");
    assert!(matches!(err, ImportError::Format { .. }));
}
