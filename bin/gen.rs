use clap::{Arg, Command};
use std::io::{self, Write};

const RESULTS: [(u16, &str); 6] = [
    (200, "OK"),
    (201, "Created"),
    (301, "Moved Permanently"),
    (404, "Not Found"),
    (429, "Too Many Requests"),
    (500, "Internal Server Error"),
];

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Write a synthetic time,status,result access log to stdout")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(Arg::new("delim").long("delim").default_value(","))
        .arg(
            Arg::new("blank_every")
                .long("blank-every")
                .help("Insert a blank line after every N rows")
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let delim = matches.get_one::<String>("delim").unwrap();
    let blank_every = matches.get_one::<u64>("blank_every").copied().filter(|n| *n > 0);

    let mut out = io::BufWriter::new(io::stdout().lock());
    writeln!(&mut out, "time{delim}status{delim}result")?;

    // Deterministic data: one row per minute, cycling through status codes
    for i in 0..rows {
        let (status, result) = RESULTS[(i % RESULTS.len() as u64) as usize];
        let minutes = i % (24 * 60);
        writeln!(
            &mut out,
            "{:02}:{:02}{delim}{status}{delim}{result}",
            minutes / 60,
            minutes % 60
        )?;
        if let Some(n) = blank_every {
            if (i + 1) % n == 0 {
                writeln!(&mut out)?;
            }
        }
        if i % 10_000 == 0 {
            out.flush()?;
        } // keep buffers moving on huge runs
    }

    out.flush()?;
    Ok(())
}
