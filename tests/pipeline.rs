use std::io::Write;

use anyhow::{Context, Result};

use icefeed::config::{FeedConfig, ValidationMode};
use icefeed::data::filter::rows_where;
use icefeed::data::loader::load_file;
use icefeed::data::reshape::{pivot_months, split_date_column};
use icefeed::feed::{open_destinations, FeedDriver, VecRenderer};
use icefeed::series::{SeriesPreset, SeriesSpec, TableBuilder};

fn csv_file(contents: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn wide_csv_feeds_every_month() -> Result<()> {
    let file = csv_file(
        "Year,Jan_Value,Apr_Value,Jul_Value,Oct_Value\n\
         1979,15.4,14.9,9.4,8.2\n\
         1980,15.1,,9.3,8.4\n\
         1981,15.0,14.7,bad,8.1\n",
    )?;
    let dataset = load_file(file.path())?;

    let config = FeedConfig {
        preset: SeriesPreset::Quarterly,
        ..FeedConfig::default()
    };
    let specs = config.series_specs();
    let mut lanes = open_destinations(&mut VecRenderer, &specs);
    let report = FeedDriver::new(config.key_column.clone())
        .with_pacing(config.pacing())
        .run(&dataset, &mut lanes)?;

    assert_eq!(report.admitted_for("Jan_Value"), 3);
    assert_eq!(report.admitted_for("Apr_Value"), 2);
    assert_eq!(report.admitted_for("Jul_Value"), 2);
    assert_eq!(report.admitted_for("Oct_Value"), 3);
    assert!(report.errors.is_empty());

    let (_, apr) = lanes
        .iter()
        .find(|(spec, _)| spec.name == "Apr_Value")
        .context("Apr lane")?;
    let keys: Vec<f64> = apr.points.iter().map(|p| p.key).collect();
    assert_eq!(keys, vec![1979.0, 1981.0]);
    Ok(())
}

#[test]
fn strict_table_matches_strict_feed() -> Result<()> {
    let file = csv_file(
        "Year,Jan_Value,Feb_Value\n\
         1979,15.4,16.1\n\
         1980,NaN,16.0\n\
         1981,15.0,15.9\n",
    )?;
    let dataset = load_file(file.path())?;
    let specs = vec![SeriesSpec::new("Jan_Value"), SeriesSpec::new("Feb_Value")];

    let table = TableBuilder::new("Year")
        .with_mode(ValidationMode::Strict)
        .build(&dataset, &specs)?;

    let mut lanes = open_destinations(&mut VecRenderer, &specs);
    FeedDriver::new("Year")
        .with_mode(ValidationMode::Strict)
        .run(&dataset, &mut lanes)?;

    for (spec, sink) in &lanes {
        let series = table.get(&spec.name).context("series in table")?;
        let fed: Vec<_> = sink.points.clone();
        let built: Vec<_> = series.points().collect();
        assert_eq!(fed, built, "{}", spec.name);
    }
    Ok(())
}

#[test]
fn long_format_per_month_charts() -> Result<()> {
    let file = csv_file(
        "Date,Value\n\
         197901,15.4\n\
         197902,16.1\n\
         198001,15.1\n\
         198002,\n\
         198101,15.0\n",
    )?;
    let long = split_date_column(load_file(file.path())?, "Date", "Year", "Month")?;

    // one single-series feed per month
    let january = rows_where(&long, "Month", 1.0);
    let spec = SeriesSpec::new("Value").named("Month 1");
    let mut lanes = open_destinations(&mut VecRenderer, std::slice::from_ref(&spec));
    let report = FeedDriver::new("Year").run(&january, &mut lanes)?;
    assert_eq!(report.admitted_for("Month 1"), 3);

    // or the wide layout for a multi-series feed
    let wide = pivot_months(&long, "Year", "Month", "Value")?;
    let table = TableBuilder::new("Year").build(
        &wide,
        &[SeriesSpec::new("Jan_Value"), SeriesSpec::new("Feb_Value")],
    )?;
    assert_eq!(table.get("Jan_Value").context("Jan")?.len(), 3);
    assert_eq!(table.get("Feb_Value").context("Feb")?.keys, vec![1979.0]);
    Ok(())
}

#[test]
fn long_layout_config_feeds_through_load() -> Result<()> {
    let file = csv_file(
        "Date,Value\n\
         197901,15.4\n\
         197902,16.1\n\
         198001,15.1\n\
         198002,\n\
         198101,15.0\n",
    )?;

    let config = FeedConfig::from_json(r#"{ "layout": { "long": {} } }"#)?;
    let dataset = config.load_dataset(file.path())?;
    let specs = config.series_specs();
    let mut lanes = open_destinations(&mut VecRenderer, &specs);
    let report = FeedDriver::new(config.key_column.clone()).run(&dataset, &mut lanes)?;
    assert_eq!(report.admitted_for("Jan_Value"), 3);
    assert_eq!(report.admitted_for("Feb_Value"), 1);
    assert_eq!(report.total_admitted(), 4);

    let february = FeedConfig::from_json(r#"{ "layout": { "long": { "month": "Feb" } } }"#)?;
    let dataset = february.load_dataset(file.path())?;
    let specs = february.series_specs();
    assert_eq!(specs.len(), 1);
    let mut lanes = open_destinations(&mut VecRenderer, &specs);
    let report = FeedDriver::new("Year").run(&dataset, &mut lanes)?;
    assert_eq!(report.admitted_for("Feb_Value"), 1);
    assert_eq!(report.rows_total, 2);
    Ok(())
}
