//! End-to-end runs over real workbook and CSV files.

use romi_core::config::{AppConfig, DashboardConfig, InputConfig, OutputConfig};
use romi_core::ReportError;
use romi_reporting::ingest::REQUIRED_COLUMNS;
use romi_reporting::run;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SHEET: &str = "Сквозная аналитика 2025";

type Row<'a> = (Option<&'a str>, Option<&'a str>, [f64; 7]);

fn sample_rows() -> Vec<Row<'static>> {
    vec![
        (Some("ad"), Some("google"), [100.0, 40.0, 30.0, 3.0, 1.0, 2.0, 300.0]),
        (Some("ad"), Some("google"), [50.0, 10.0, 8.0, 1.0, 1.0, 0.0, 100.0]),
        (Some("ad"), Some("yandex"), [80.0, 20.0, 15.0, 0.0, 0.0, 0.0, 0.0]),
        (Some("organic"), None, [0.0, 0.0, 120.0, 5.0, 2.0, 3.0, 900.0]),
        (Some("ad"), None, [10.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0]),
        (None, None, [0.0, 0.0, 4.0, 1.0, 0.0, 0.0, 0.0]),
    ]
}

fn write_workbook(path: &Path, sheet_name: &str, columns: &[&str], rows: &[Row<'_>]) {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name).unwrap();
        for (c, name) in columns.iter().enumerate() {
            sheet.write_string(0, c as u16, *name).unwrap();
        }
        for (r, (traffic, utm, values)) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            if let Some(traffic) = traffic {
                sheet.write_string(r, 0, *traffic).unwrap();
            }
            if let Some(utm) = utm {
                sheet.write_string(r, 1, *utm).unwrap();
            }
            for (i, value) in values.iter().enumerate() {
                if 2 + i < columns.len() {
                    sheet.write_number(r, 2 + i as u16, *value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

fn config_for(dir: &TempDir, input: PathBuf) -> AppConfig {
    AppConfig {
        input: InputConfig {
            path: input,
            sheet: SHEET.to_string(),
        },
        output: OutputConfig {
            dashboard_path: dir.path().join("marketing_dashboard.png"),
            summary_path: dir.path().join("marketing_summary.csv"),
            summary_json_path: Some(dir.path().join("marketing_summary.json")),
        },
        dashboard: DashboardConfig {
            enabled: false,
            ..Default::default()
        },
    }
}

#[test]
fn test_workbook_to_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.xlsx");
    write_workbook(&input, SHEET, &REQUIRED_COLUMNS, &sample_rows());

    let config = config_for(&dir, input);
    let summary = run(&config).unwrap();

    assert_eq!(summary.records, 6);
    assert_eq!(summary.totals.sources, 4);
    assert!((summary.totals.costs - 240.0).abs() < 1e-9);
    assert!(summary.dashboard.is_none());

    let csv = std::fs::read_to_string(&config.output.summary_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "source,costs,clicks,total_leads,cpa,orders,revenue,roas",
            "google,150.00,50.00,6.00,25.00,2.00,400.00,2.67",
            "organic,0.00,0.00,7.00,0.00,3.00,900.00,",
            "other,10.00,2.00,1.00,10.00,0.00,0.00,0.00",
            "yandex,80.00,20.00,0.00,,0.00,0.00,0.00",
        ]
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(config.output.summary_json_path.unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["row_count"], 4);
}

#[test]
fn test_csv_input_matches_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.csv");
    std::fs::write(
        &input,
        "traffic_source,utm_source,costs,clicks,visits,leads,q_leads,orders,revenue\n\
         ad,google,100,40,30,3,1,2,300\n\
         ad,google,50,10,8,1,1,0,100\n",
    )
    .unwrap();

    let config = config_for(&dir, input);
    let summary = run(&config).unwrap();
    assert_eq!(summary.totals.sources, 1);

    let csv = std::fs::read_to_string(&config.output.summary_path).unwrap();
    assert_eq!(
        csv.lines().nth(1),
        Some("google,150.00,50.00,6.00,25.00,2.00,400.00,2.67")
    );
}

#[test]
fn test_missing_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.xlsx");
    write_workbook(&input, "Other sheet", &REQUIRED_COLUMNS, &sample_rows());

    let err = run(&config_for(&dir, input)).unwrap_err();
    assert!(matches!(err, ReportError::MissingSheet { ref sheet, .. } if sheet == SHEET));
}

#[test]
fn test_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.xlsx");
    // Drop the trailing revenue column.
    let columns = &REQUIRED_COLUMNS[..REQUIRED_COLUMNS.len() - 1];
    write_workbook(&input, SHEET, columns, &sample_rows());

    let err = run(&config_for(&dir, input)).unwrap_err();
    assert!(matches!(err, ReportError::MissingColumn(ref c) if c == "revenue"));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&config_for(&dir, dir.path().join("absent.xlsx"))).unwrap_err();
    assert!(matches!(err, ReportError::Spreadsheet(_)));
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn test_dashboard_png_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.xlsx");
    write_workbook(&input, SHEET, &REQUIRED_COLUMNS, &sample_rows());

    let mut config = config_for(&dir, input);
    config.dashboard = DashboardConfig {
        width: 900,
        height: 600,
        ..Default::default()
    };
    let summary = run(&config).unwrap();

    let png = summary.dashboard.unwrap();
    let bytes = std::fs::read(png).unwrap();
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}
