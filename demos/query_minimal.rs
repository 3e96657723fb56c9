use csv_query::CsvParser;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let path = Path::new("./data/access_log.csv");
    let mut csv = CsvParser::open(path)?;

    if !csv.is_empty()? {
        for i in 0..csv.count()? {
            let row = csv.get(i)?;
            println!("{}: {}", row.get("time")?, row.get("result")?);
        }
        for row in &mut csv {
            let row = row?;
            println!("{}: {}", &row["time"], &row["result"]);
        }
    }

    let server_errors = csv.where_greater_than("status", 499)?;
    let ok = csv.where_equals("status", 200)?;
    println!("ok={} server_errors={}", ok.len(), server_errors.len());
    Ok(())
}
