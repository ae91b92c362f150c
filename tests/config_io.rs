use std::fs;
use togglechart::viz::LegendMode;
use togglechart::{AggregateColumn, ChartConfig, Rgb, VisibilityController};

#[test]
fn config_file_drives_the_controller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.json");
    fs::write(
        &path,
        r##"{
            "default_visible": [3],
            "options": {
                "title": "Sales",
                "legend": "bottom",
                "series_colors": { "1": "#112233" }
            },
            "table": {
                "header": ["Year", "North", "South"],
                "rows": [["2012", 10, 12], ["2013", 14, null]]
            }
        }"##,
    )
    .unwrap();

    let cfg = ChartConfig::load(&path).unwrap();
    assert_eq!(cfg.options.title, "Sales");
    assert_eq!(cfg.options.legend, LegendMode::Bottom);
    assert_eq!(cfg.aggregate, AggregateColumn::Synthesize);

    let ds = cfg.dataset().unwrap();
    let mut c = VisibilityController::new(&ds).with_series_colors(&cfg.options.series_colors);
    c.initialize(&cfg.default_visible);
    assert_eq!(c.visible_series(), vec![3]);
    assert!(c.style(2).unwrap().is_muted());

    c.handle_legend_click(2);
    assert_eq!(c.style(2).unwrap().color, Some(Rgb::new(0x11, 0x22, 0x33)));
}

#[test]
fn malformed_config_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = ChartConfig::load(&path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("invalid config"));
    assert!(msg.contains("broken.json"));
}

#[test]
fn bad_color_is_a_parse_error() {
    let err = ChartConfig::from_json(r#"{"options": {"background_color": "blue"}}"#);
    assert!(err.is_err());
}

#[test]
fn config_round_trips_through_json() {
    let cfg = ChartConfig::default();
    let text = serde_json::to_string(&cfg).unwrap();
    assert_eq!(ChartConfig::from_json(&text).unwrap(), cfg);
}

#[test]
fn out_of_range_color_keys_are_ignored() {
    let cfg = ChartConfig::from_json(
        r##"{"options": {"series_colors": {"18446744073709551615": "#112233", "2": "#445566"}}}"##,
    )
    .unwrap();
    let ds = cfg.dataset().unwrap();
    let mut c = VisibilityController::new(&ds).with_series_colors(&cfg.options.series_colors);
    c.initialize(&[2, 3, 4, 5]);
    assert_eq!(c.style(3).unwrap().color, Some(Rgb::new(0x44, 0x55, 0x66)));
    assert_eq!(c.style(0), None);
    assert_eq!(c.style(2).unwrap().color, None);
}
