use csv_query::{CsvError, CsvParseError, CsvParser, CsvParserBuilder, Row};
use std::{fs::File, io::Write, path::PathBuf};

const ACCESS_LOG: &str = "time,status,result\n\
                          17:00,200,OK\n\
                          17:30,201,Created\n\
                          18:00,404,Not Found\n\
                          18:04,500,Internal Server Error\n";

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut f = File::create(&path)?;
    f.write_all(contents.as_bytes())?;
    Ok(path)
}

fn statuses(rows: &[Row]) -> Vec<&str> {
    rows.iter().map(|r| &r["status"]).collect()
}

#[test]
fn counts_rows_and_answers_queries() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "access.csv", ACCESS_LOG)?;
    let mut csv = CsvParser::open(&path)?;

    assert!(!csv.is_empty()?);
    assert_eq!(csv.count()?, 4);

    let by_index: Vec<Row> = (0..csv.count()?).map(|i| csv.get(i)).collect::<Result<_, _>>()?;
    let by_iteration: Vec<Row> = csv.rows().collect::<Result<_, _>>()?;
    assert_eq!(by_index, by_iteration);

    let fifth = csv.get(3)?;
    assert_eq!(fifth.get("time")?, "18:04");
    assert_eq!(fifth.get("status")?, "500");
    assert_eq!(fifth.get("result")?, "Internal Server Error");

    let matches = csv.where_equals("status", "OK".to_string())?;
    assert!(matches.is_empty());

    let matches = csv.where_greater_than("status", 200)?;
    assert_eq!(statuses(&matches), ["201", "404", "500"]);

    let matches = csv.where_less_than("status", 500)?;
    assert_eq!(statuses(&matches), ["200", "201", "404"]);

    let matches = csv.where_equals("Status", 404)?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].get("result")?, "Not Found");
    Ok(())
}

#[test]
fn out_of_range_indexes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "access.csv", ACCESS_LOG)?;
    let mut csv = CsvParser::open(&path)?;
    let count = csv.count()?;

    for index in [count, count + 1, 10, usize::MAX] {
        assert!(
            matches!(csv.get(index), Err(CsvError::IndexOutOfRange { .. })),
            "index {index}"
        );
    }
    Ok(())
}

#[test]
fn construction_errors() {
    assert!(matches!(
        CsvParser::open("NotFound.csv"),
        Err(CsvError::NotFound { .. })
    ));
    assert!(matches!(
        CsvParser::open(""),
        Err(CsvError::InvalidArgument(_))
    ));
    assert!(matches!(
        CsvParserBuilder::new().open(),
        Err(CsvError::NullArgument(_))
    ));
}

#[test]
fn malformed_row_fails_iteration() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "short.csv", "time,status,result\n17:00,200,OK\n17:30,201\n")?;
    let mut csv = CsvParser::open(&path)?;

    let results: Vec<_> = csv.rows().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(CsvError::Parse(CsvParseError::FieldCountMismatch { line: 3, .. }))
    ));
    Ok(())
}

#[test]
fn blank_lines_are_skipped_by_iteration_and_queries() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(
        &dir,
        "blank.csv",
        "time,status,result\n17:00,200,OK\n\n , , \n18:04,500,Internal Server Error\n\n",
    )?;
    let mut csv = CsvParser::open(&path)?;

    assert_eq!(csv.count()?, 5);
    let rows: Vec<Row> = csv.rows().collect::<Result<_, _>>()?;
    assert_eq!(statuses(&rows), ["200", "500"]);
    assert_eq!(csv.where_greater_than("status", 0)?.len(), 2);
    Ok(())
}

#[test]
fn iterating_twice_restarts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "access.csv", ACCESS_LOG)?;
    let mut csv = CsvParser::open(&path)?;

    let first: Vec<Row> = (&mut csv).into_iter().collect::<Result<_, _>>()?;
    let second: Vec<Row> = (&mut csv).into_iter().collect::<Result<_, _>>()?;
    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn second_pass_restarts_after_find_stops_on_last_row() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "access.csv", ACCESS_LOG)?;
    let mut csv = CsvParser::open(&path)?;

    let hit = csv
        .rows()
        .find(|r| r.as_ref().is_ok_and(|row| &row["status"] == "500"))
        .transpose()?;
    assert_eq!(hit.map(|row| row["result"].to_string()).as_deref(), Some("Internal Server Error"));
    assert_eq!(csv.rows().count(), 4);
    Ok(())
}

#[test]
fn query_argument_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "access.csv", ACCESS_LOG)?;
    let mut csv = CsvParser::open(&path)?;

    let err = csv.where_equals("", 1).unwrap_err();
    assert!(matches!(err, CsvError::InvalidArgument(_)));
    assert!(!err.is_parse());
    let err = csv.where_equals("latency", 1).unwrap_err();
    assert!(err.is_parse());
    assert!(matches!(
        err,
        CsvError::Parse(CsvParseError::UnknownField { .. })
    ));
    assert!(std::error::Error::source(&err).is_some());

    let err = csv.where_greater_than("result", 1).unwrap_err();
    assert!(matches!(
        err,
        CsvError::Parse(CsvParseError::Conversion { .. })
    ));
    Ok(())
}

#[test]
fn rows_outlive_the_parser() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_csv(&dir, "access.csv", ACCESS_LOG)?;
    let mut csv = CsvParser::open(&path)?;
    let row = csv.get(2)?;
    csv.close();
    assert_eq!(row.get_as::<u16>("status")?, 404);
    Ok(())
}

#[test]
fn semicolon_latin1_with_trimming() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("latin1.csv");
    File::create(&path)?.write_all(b"Name ; City\n Jos\xE9 ; M\xE1laga \n")?;

    let mut csv = CsvParserBuilder::new()
        .delimiter(';')?
        .encoding_label("latin1")?
        .ignore_white_spaces(true)
        .from_path(&path)?;
    let row = csv.get(0)?;
    assert_eq!(row.get("name")?, "José");
    assert_eq!(row.get("CITY")?, "Málaga");
    Ok(())
}
