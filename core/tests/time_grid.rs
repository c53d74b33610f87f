use cartproj_core::time_grid::{build_time_grid, date_value};

#[test]
fn horizon_has_twelve_rows_per_year() {
    for (year, month, years) in [(2025, 7, 5), (2024, 1, 1), (2026, 12, 3)] {
        let grid = build_time_grid(year, month, years).unwrap();
        assert_eq!(grid.periods.len(), 12 * years as usize, "{year}-{month} x{years}");
        for y in 1..=years {
            let count = grid.periods.iter().filter(|p| p.relative_year == y).count();
            assert_eq!(count, 12);
        }
    }
}

#[test]
fn months_are_contiguous_and_ordered() {
    let grid = build_time_grid(2025, 7, 5).unwrap();
    for (i, pair) in grid.periods.windows(2).enumerate() {
        assert_eq!(pair[1].date_value - pair[0].date_value, 1, "gap after row {i}");
        assert_eq!(pair[1].months_from_start, pair[0].months_from_start + 1);
    }
    assert_eq!(grid.periods[0].date_value, date_value(2025, 7));
}

#[test]
fn year_fraction_steps_by_a_twelfth() {
    let grid = build_time_grid(2025, 7, 2).unwrap();
    assert_eq!(grid.periods[0].year_fraction, 0.0);
    for (i, p) in grid.periods.iter().enumerate() {
        let expected = i as f64 / 12.0;
        assert!((p.year_fraction - expected).abs() < 1e-9, "row {i}: {}", p.year_fraction);
    }
}

#[test]
fn relative_and_calendar_quarters_differ() {
    let grid = build_time_grid(2025, 7, 1).unwrap();
    let first = &grid.periods[0];
    assert_eq!(first.relative_month, 1);
    assert_eq!(first.quarter, 3);
    assert_eq!(first.month_in_quarter, 1);

    let last = &grid.periods[11];
    assert_eq!((last.year, last.month), (2026, 6));
    assert_eq!(last.relative_month, 12);
    assert_eq!(last.quarter, 2);
    assert_eq!(last.month_in_quarter, 3);
    assert_eq!(last.year_month, "2026-06");
}

#[test]
fn invalid_start_is_rejected() {
    assert!(build_time_grid(2025, 0, 1).is_err());
    assert!(build_time_grid(2025, 13, 1).is_err());
    assert!(build_time_grid(2025, 1, 0).is_err());
}
