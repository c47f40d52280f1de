use voter_stats::analysis::{
    aggregate_by_division, clean, derive, detect_outliers, top_n, AnalysisError, DropReason,
};
use voter_stats::charts::{prepare_bar, prepare_box, prepare_scatter};
use voter_stats::commands::analyze;
use voter_stats::config::AnalysisConfig;
use voter_stats::formats::voter_csv::{load_from_reader, ReaderOptions};
use voter_stats::model::MetricKey;
use voter_stats::reports::generator::{generate_report, ReportInputs};

const TABLE: &str = "\
Division,District,Active Registration,Male,Female,Other
Pune,Satara,250,100,150,0
Pune,Sangli,400,200,190,10
Pune,Kolhapur,abc,1,1,0
Nagpur,Wardha,50,0,50,0
Nagpur,Bhandara,\"1,200\",600,600,0
Pune,Satara,999,1,1,0
Konkan,,10,5,5,0
Nagpur,Gondia,-4,1,1,0
";

#[test]
fn table_flows_through_every_stage() {
    let table = load_from_reader(TABLE.as_bytes(), &ReaderOptions::default()).unwrap();
    assert_eq!(table.len(), 8);

    let cleaned = clean(table).unwrap();
    let kept: Vec<&str> = cleaned.records.iter().map(|r| r.district.as_str()).collect();
    assert_eq!(kept, vec!["Satara", "Sangli", "Wardha", "Bhandara"]);
    assert_eq!(cleaned.dropped_count(), 4);

    let reasons: Vec<(u64, &DropReason)> =
        cleaned.dropped.iter().map(|d| (d.line, &d.reason)).collect();
    assert!(matches!(reasons[0], (4, DropReason::Unparseable { .. })));
    assert!(matches!(reasons[1], (7, DropReason::DuplicateDistrict { .. })));
    assert!(matches!(reasons[2], (8, DropReason::MissingIdentifier { .. })));
    assert!(matches!(reasons[3], (9, DropReason::NegativeCount { .. })));

    let derived = derive(cleaned.records.clone());
    assert_eq!(derived[0].metrics.gender_ratio, Some(1500.0));
    assert_eq!(derived[2].metrics.gender_ratio, None);
    assert!(derived.iter().all(|d| d.metrics.reconciled));

    let aggregates = aggregate_by_division(&derived);
    let divisions: Vec<&str> = aggregates.iter().map(|a| a.division.as_str()).collect();
    assert_eq!(divisions, vec!["Pune", "Nagpur"]);
    assert_eq!(aggregates[0].total_active, 650);
    assert_eq!(aggregates[1].total_active, 1250);

    let top: Vec<&str> = top_n(&derived, 2, MetricKey::ActiveRegistrations)
        .iter()
        .map(|d| d.record.district.as_str())
        .collect();
    assert_eq!(top, vec!["Bhandara", "Sangli"]);

    let ratio_outliers = detect_outliers(&derived, MetricKey::GenderRatio, 1.5).unwrap();
    let registration_outliers =
        detect_outliers(&derived, MetricKey::ActiveRegistrations, 1.5).unwrap();

    let scatter = prepare_scatter(&derived, &ratio_outliers);
    assert_eq!(scatter.point_count(), 3);
    assert!(!prepare_box(&aggregates).is_empty());
    let top_refs = top_n(&derived, 10, MetricKey::ActiveRegistrations);
    assert!(!prepare_bar(&top_refs, &aggregates, &registration_outliers).is_empty());

    let report = generate_report(&ReportInputs {
        input: "inline.csv",
        cleaned: &cleaned,
        derived: &derived,
        aggregates: &aggregates,
        ratio_outliers: &ratio_outliers,
        registration_outliers: &registration_outliers,
        top_n: 2,
        outlier_threshold: 1.5,
    });
    assert_eq!(report.overall.total_active, 1900);
    assert_eq!(report.dropped_rows.len(), 4);
    assert_eq!(report.top_by_gender_ratio[0].district, "Satara");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["droppedRows"][0]["reason"]["kind"], "unparseable");
    assert_eq!(json["topByRegistration"][0]["district"], "Bhandara");
}

#[test]
fn all_rows_invalid_is_a_data_error() {
    let data = "division,district,male_count,female_count,active_registrations\n\
                Pune,,1,1,2\n\
                Pune,Satara,-1,1,0\n";
    let table = load_from_reader(data.as_bytes(), &ReaderOptions::default()).unwrap();
    assert!(matches!(clean(table), Err(AnalysisError::DataFormat(_))));
}

#[test]
fn analyze_reports_missing_input() {
    let output_dir = std::env::temp_dir().join(format!("voter_stats_missing_{}", std::process::id()));
    let config = AnalysisConfig {
        input: output_dir.join("absent.csv"),
        output_dir: output_dir.clone(),
        ..AnalysisConfig::default()
    };

    let err = analyze(&config).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
    assert!(!output_dir.join("summary.json").exists());
}

#[test]
fn analyze_rejects_negative_threshold() {
    let dir = std::env::temp_dir().join(format!("voter_stats_threshold_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let input = dir.join("data.csv");
    std::fs::write(&input, TABLE).unwrap();

    let config = AnalysisConfig {
        input,
        output_dir: dir.join("out"),
        outlier_threshold: -1.0,
        ..AnalysisConfig::default()
    };

    let err = analyze(&config).unwrap_err();
    assert!(err.to_string().to_lowercase().contains("threshold"));
    assert!(!dir.join("out").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn analyze_sample_writes_every_output() {
    let output_dir = std::env::temp_dir().join(format!("voter_stats_sample_{}", std::process::id()));
    let config = AnalysisConfig {
        input: std::path::PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample.csv")),
        output_dir: output_dir.clone(),
        ..AnalysisConfig::default()
    };

    let summary = analyze(&config).unwrap();

    assert!(summary.chart_failures.is_empty(), "{:?}", summary.chart_failures);
    assert_eq!(summary.rows_loaded, 36);
    assert_eq!(summary.rows_kept, 36);
    assert_eq!(summary.rows_dropped, 0);
    assert_eq!(summary.charts_written.len(), 3);

    for name in ["scatter_plot.png", "box_plot.png", "bar_plot.png", "summary.json"] {
        let path = output_dir.join(name);
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        assert!(size > 0, "{} missing or empty", path.display());
    }

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(json["overall"]["district_count"], 36);
    assert_eq!(json["overall"]["division_count"], 6);
    assert_eq!(json["topByRegistration"][0]["district"], "Pune");

    std::fs::remove_dir_all(&output_dir).unwrap();
}

#[test]
fn part_above_active_never_reaches_metrics() {
    let data = "division,district,male_count,female_count,active_registrations\n\
                X,A,10,200,100\n\
                X,B,40,60,100\n";
    let table = load_from_reader(data.as_bytes(), &ReaderOptions::default()).unwrap();
    let cleaned = clean(table).unwrap();
    assert_eq!(cleaned.dropped_count(), 1);
    assert!(matches!(
        cleaned.dropped[0].reason,
        DropReason::InconsistentCounts { .. }
    ));

    for d in derive(cleaned.records) {
        let pct = d.metrics.female_percentage.unwrap();
        assert!((0.0..=100.0).contains(&pct));
    }
}
