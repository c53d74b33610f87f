use cartproj_core::{
    engine::{Projection, ProjectionEngine},
    export::{export_timestamped, row_columns, write_csv, Cell},
    scenario::{Scenario, YearMap},
};

fn projection() -> Projection {
    let partner: YearMap = [(1, 30.0), (2, 71.0), (3, 115.0), (4, 176.0), (5, 261.0)]
        .into_iter()
        .collect();
    ProjectionEngine::build_test()
        .run(&Scenario::new(2025, 7, 5, partner))
        .unwrap()
}

fn to_csv(p: &Projection) -> String {
    let mut buf = Vec::new();
    write_csv(&p.rows, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn header_carries_the_reporting_columns() {
    let text = to_csv(&projection());
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();

    for name in [
        "Year",
        "Month",
        "Relative_Year",
        "Relative_Month",
        "Year_Month",
        "Year_Fraction",
        "Partner_Carts",
        "Direct_Carts",
        "Total_Carts",
        "Monthly_Runs",
        "Mammalian_Vessels",
        "AAV_Auto_Vessels",
        "Total_Vessels",
        "TCU_Partner_Price",
        "Installation_Our_Cost",
        "Installation_Our_Cost_Total",
        "Base_Hardware_End_Price_Adjusted",
        "Total_Our_Cost",
        "Total_Our_Revenue",
        "Total_Market_Revenue",
        "Partner_Profit",
        "Our_Gross_Margin",
        "Partner_Margin",
    ] {
        assert!(headers.iter().any(|h| h == name), "missing column {name}");
    }

    let unique: std::collections::BTreeSet<&str> = headers.iter().collect();
    assert_eq!(unique.len(), headers.len(), "duplicate column names");
}

#[test]
fn one_record_per_month() {
    let text = to_csv(&projection());
    assert_eq!(text.lines().count(), 61);

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 60);
    let width = reader.headers().unwrap().len();
    assert!(records.iter().all(|r| r.len() == width));
}

#[test]
fn exported_columns_sum_like_the_table() {
    let p = projection();
    let text = to_csv(&p);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let rel = headers.iter().position(|h| h == "Relative_Year").unwrap();
    let carts = headers.iter().position(|h| h == "Partner_Carts").unwrap();

    let mut year_one = 0;
    for record in reader.records() {
        let record = record.unwrap();
        if &record[rel] == "1" {
            year_one += record[carts].parse::<i64>().unwrap();
        }
    }
    assert_eq!(year_one, 30);
}

#[test]
fn row_columns_expose_typed_cells() {
    let p = projection();
    let cols = row_columns(&p.rows[0]);
    let get = |name: &str| cols.iter().find(|(n, _)| n == name).map(|(_, c)| c.clone());

    assert_eq!(get("Year"), Some(Cell::Int(2025)));
    assert_eq!(get("Year_Month"), Some(Cell::Text("2025-07".into())));
    assert_eq!(get("Year_Fraction").and_then(|c| c.as_f64()), Some(0.0));
    assert_eq!(
        get("Total_Our_Revenue").and_then(|c| c.as_f64()),
        Some(p.rows[0].value_chain.total_our_revenue)
    );
}

#[test]
fn empty_table_writes_nothing() {
    let mut buf = Vec::new();
    write_csv(&[], &mut buf).unwrap();
    assert!(buf.is_empty());
}

#[test]
fn timestamped_export_lands_in_the_directory() {
    let dir = std::env::temp_dir().join(format!("cartproj-export-{}", uuid::Uuid::new_v4()));
    let path = export_timestamped(&projection().rows, &dir).unwrap();

    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("financial_projection_"));
    assert!(file_name.ends_with(".csv"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 61);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn installation_unit_cost_and_line_total_are_separate_columns() {
    let p = projection();
    let row = p
        .rows
        .iter()
        .find(|r| r.sales.monthly_new_carts > 1)
        .unwrap();
    let cols = row_columns(row);
    let get = |name: &str| {
        cols.iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, c)| c.as_f64())
    };

    assert_eq!(get("Installation_Our_Cost"), Some(5_000.0));
    assert_eq!(
        get("Installation_Our_Cost_Total"),
        Some(row.sales.monthly_new_carts as f64 * 5_000.0)
    );
    assert_eq!(get("Base_Hardware_Our_Cost"), Some(row.value_chain.base_hardware.our_cost));
    assert_eq!(get("Installation_Unit_Cost"), None);
}
