use clap::{Arg, ArgAction, Command};
use crc32fast::Hasher as Crc32;
use csv_query::{CsvParserBuilder, Row};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("bench")
        .arg(Arg::new("path").long("path").value_parser(clap::value_parser!(PathBuf)).required(true))
        .arg(Arg::new("delim").long("delim").default_value(","))
        .arg(Arg::new("trim").long("trim").help("Trim whitespace around field values").action(ArgAction::SetTrue))
        .arg(Arg::new("where-gt").long("where-gt").help("FIELD=NUMBER; count rows whose field is greater"))
        .arg(Arg::new("verify").long("verify").help("Check that indexed access and iteration produce the same rows (CRC32 over fields)").action(ArgAction::SetTrue))
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").unwrap();
    let delim = matches
        .get_one::<String>("delim")
        .and_then(|d| d.chars().next())
        .ok_or_else(|| anyhow::anyhow!("--delim must not be empty"))?;

    let mut csv = CsvParserBuilder::new()
        .delimiter(delim)?
        .ignore_white_spaces(matches.get_flag("trim"))
        .from_path(path)?;

    let start = Instant::now();
    let count = csv.count()?;
    println!(
        "source={} rows={} headers={:?}\ncount elapsed={:.3}s",
        path.display(),
        count,
        csv.header().names(),
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let mut iterated = Crc32::new();
    let mut yielded = 0usize;
    for row in &mut csv {
        checksum(&mut iterated, &row?);
        yielded += 1;
    }
    report("iterate", yielded, start);

    let start = Instant::now();
    let mut indexed = Crc32::new();
    for i in 0..count {
        let row = csv.get(i)?;
        if !row.is_blank() {
            checksum(&mut indexed, &row);
        }
    }
    report("index", count, start);

    if let Some(filter) = matches.get_one::<String>("where-gt") {
        let (field, value) = filter
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--where-gt expects FIELD=NUMBER"))?;
        let value: f64 = value.trim().parse()?;
        let start = Instant::now();
        match csv.where_greater_than(field, value) {
            Ok(found) => {
                report(&format!("where {field} > {value} matched={}", found.len()), count, start)
            }
            // bad field name or non-numeric column: report and keep benchmarking
            Err(e) if e.is_parse() => println!("where {field} > {value} skipped: {e}"),
            Err(e) => return Err(e.into()),
        }
    }

    if matches.get_flag("verify") {
        let (a, b) = (iterated.finalize(), indexed.finalize());
        if a != b {
            return Err(anyhow::anyhow!(
                "iteration crc=0x{a:08x} differs from indexed crc=0x{b:08x}"
            ));
        }
        println!("verify ok crc=0x{a:08x}");
    }

    csv.close();
    Ok(())
}

// accumulate CRC32 over all fields separated by '\x1f' (unit separator)
fn checksum(crc: &mut Crc32, row: &Row) {
    for (fi, value) in row.values().iter().enumerate() {
        if fi > 0 {
            crc.update(&[0x1f]);
        }
        crc.update(value.as_bytes());
    }
    crc.update(&[0x1e]);
}

fn report(label: &str, rows: usize, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    let rps = rows as f64 / elapsed.max(f64::EPSILON);
    println!("{label}: elapsed={elapsed:.3}s rows/sec={rps:.0}");
}
