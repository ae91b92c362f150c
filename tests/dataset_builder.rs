use togglechart::dataset::{AGGREGATE_INDEX, DatasetError, HIDE_ALL_LABEL};
use togglechart::{AggregateColumn, Cell, ColumnType, Dataset, DatasetBuilder, NamedSeries};

fn two_series(aggregate: AggregateColumn) -> Result<Dataset, DatasetError> {
    DatasetBuilder::new("Quarter")
        .categories(["Q1", "Q2", "Q3"])
        .series(NamedSeries::new("North", [1.0, 2.0, 3.0]))
        .series(NamedSeries::new("South", [3.0, 2.0, 1.0]))
        .aggregate(aggregate)
        .build()
}

#[test]
fn synthesized_aggregate_sits_at_index_one() {
    let ds = two_series(AggregateColumn::Synthesize).unwrap();
    let labels: Vec<&str> = ds.columns().iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["Quarter", HIDE_ALL_LABEL, "North", "South"]);
    assert_eq!(ds.column(0).unwrap().kind, ColumnType::String);
    assert_eq!(ds.column(AGGREGATE_INDEX).unwrap().kind, ColumnType::Number);
    assert_eq!(ds.series_values(AGGREGATE_INDEX), vec![Some(0.0); 3]);
    assert_eq!(ds.data_series_indices(), 2..4);
}

#[test]
fn supplied_aggregate_uses_first_series() {
    let ds = two_series(AggregateColumn::Supplied).unwrap();
    assert_eq!(ds.column_count(), 3);
    assert_eq!(ds.column(1).unwrap().label, "North");
    assert_eq!(ds.series_values(1), vec![Some(0.0); 3]);
    assert_eq!(ds.data_series_indices(), 2..3);
}

#[test]
fn builder_rejects_bad_input() {
    let empty = DatasetBuilder::new("Year")
        .series(NamedSeries::new("A", Vec::<f64>::new()))
        .build();
    assert_eq!(empty.unwrap_err(), DatasetError::EmptyCategories);

    let none = DatasetBuilder::new("Year").categories(["2010"]).build();
    assert_eq!(none.unwrap_err(), DatasetError::NoSeries);

    let short = DatasetBuilder::new("Year")
        .categories(["2010", "2011"])
        .series(NamedSeries::new("A", [1.0]))
        .build();
    assert!(matches!(
        short.unwrap_err(),
        DatasetError::SeriesLength { expected: 2, found: 1, .. }
    ));
}

#[test]
fn from_rows_keeps_nulls_and_rejects_text_values() {
    let ds = Dataset::from_rows(
        &["Year", "A"],
        vec![
            vec![Cell::from("2010"), Cell::from(1.5)],
            vec![Cell::from("2011"), Cell::Null],
        ],
        AggregateColumn::Synthesize,
    )
    .unwrap();
    assert_eq!(ds.series_values(2), vec![Some(1.5), None]);
    assert_eq!(ds.value_range([2]), Some((1.5, 1.5)));

    let err = Dataset::from_rows(
        &["Year", "A"],
        vec![vec![Cell::from("2010"), Cell::from("oops")]],
        AggregateColumn::Synthesize,
    )
    .unwrap_err();
    assert_eq!(err, DatasetError::NonNumeric { row: 0, column: 1 });
}

#[test]
fn demo_table_has_six_years_of_four_groups() {
    let ds = Dataset::demo();
    assert_eq!(ds.row_count(), 6);
    assert_eq!(ds.categories().first().map(String::as_str), Some("2008"));
    assert_eq!(ds.column(5).unwrap().label, "Group4");
    assert_eq!(ds.cell(2, 2), Some(&Cell::Number(1670.0)));
    assert_eq!(ds.value_range(ds.data_series_indices()), Some((0.0, 1950.0)));
}

#[test]
fn dataset_serializes_as_columns_and_rows() {
    let ds = two_series(AggregateColumn::Synthesize).unwrap();
    let json = serde_json::to_value(&ds).unwrap();
    assert_eq!(json["columns"][1]["label"], HIDE_ALL_LABEL);
    assert_eq!(json["rows"][0][0], "Q1");
    let back: Dataset = serde_json::from_value(json).unwrap();
    assert_eq!(back, ds);
}

fn page_table(aggregate: Cell) -> Vec<Vec<Cell>> {
    [
        ("2008", 300.0, 1600.0),
        ("2009", 900.0, 1200.0),
        ("2010", 1670.0, 1060.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (year, a, b))| {
        let agg = if i == 1 { aggregate.clone() } else { Cell::from(0.0) };
        vec![Cell::from(year), agg, Cell::from(a), Cell::from(b)]
    })
    .collect()
}

#[test]
fn table_with_toggle_column_is_not_given_a_second_one() {
    for agg in [Cell::from(0.0), Cell::Null] {
        let ds = Dataset::from_rows(
            &["Year", HIDE_ALL_LABEL, "Group1", "Group2"],
            page_table(agg.clone()),
            AggregateColumn::Synthesize,
        )
        .unwrap();
        let labels: Vec<&str> = ds.columns().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Year", HIDE_ALL_LABEL, "Group1", "Group2"], "{agg:?}");
        assert_eq!(ds.series_values(AGGREGATE_INDEX), vec![Some(0.0); 3]);
        assert_eq!(ds.clone().with_aggregate(), ds);
    }
}

#[test]
fn toggle_label_over_real_values_still_gets_an_aggregate() {
    let ds = Dataset::from_rows(
        &["Year", HIDE_ALL_LABEL, "Group1", "Group2"],
        page_table(Cell::from(5.0)),
        AggregateColumn::Synthesize,
    )
    .unwrap();
    assert_eq!(ds.column_count(), 5);
}

#[test]
fn deserialized_short_rows_do_not_panic() {
    let ds: Dataset = serde_json::from_str(
        r#"{"columns": [{"label": "Year", "kind": "string"}, {"label": "A", "kind": "number"}],
            "rows": [[], ["2010", 1]]}"#,
    )
    .unwrap();
    assert_eq!(ds.categories(), vec![String::new(), "2010".to_string()]);
    assert_eq!(ds.series_values(1), vec![None, Some(1.0)]);

    let ds = ds.with_aggregate();
    assert_eq!(ds.column(1).unwrap().label, HIDE_ALL_LABEL);
    assert_eq!(ds.series_values(1), vec![Some(0.0), Some(0.0)]);
}
