use csv_query::{CsvConfiguration, CsvParser, Row};
use proptest::prelude::*;
use std::io::Cursor;

fn render(statuses: &[u16], trailing_newline: bool) -> String {
    let mut text = String::from("id,status\n");
    let lines: Vec<String> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{i},{s}"))
        .collect();
    text.push_str(&lines.join("\n"));
    if trailing_newline && !lines.is_empty() {
        text.push('\n');
    }
    text
}

fn parser(text: String) -> CsvParser<csv_query::StreamLineSource<Cursor<Vec<u8>>>> {
    CsvParser::from_reader(Cursor::new(text.into_bytes()), CsvConfiguration::default())
        .expect("parser")
}

fn ids(rows: &[Row]) -> Vec<usize> {
    rows.iter().map(|r| r.get_as("id").expect("id")).collect()
}

proptest! {
    #[test]
    fn count_matches_data_lines(statuses in prop::collection::vec(0u16..1000, 0..40), nl in any::<bool>()) {
        let mut csv = parser(render(&statuses, nl));
        prop_assert_eq!(csv.count().unwrap(), statuses.len());
        prop_assert_eq!(csv.count().unwrap(), statuses.len());
    }

    #[test]
    fn random_access_agrees_with_iteration(
        statuses in prop::collection::vec(0u16..1000, 1..30),
        probes in prop::collection::vec(any::<prop::sample::Index>(), 1..20),
    ) {
        let mut csv = parser(render(&statuses, true));
        let all: Vec<Row> = csv.rows().collect::<Result<_, _>>().unwrap();
        for probe in probes {
            let i = probe.index(statuses.len());
            prop_assert_eq!(&csv.get(i).unwrap(), &all[i]);
        }
    }

    #[test]
    fn comparisons_partition_rows(statuses in prop::collection::vec(0u16..10, 0..30), pivot in 0u16..10) {
        let mut csv = parser(render(&statuses, true));
        let eq = ids(&csv.where_equals("status", pivot).unwrap());
        let gt = ids(&csv.where_greater_than("status", pivot).unwrap());
        let lt = ids(&csv.where_less_than("status", pivot).unwrap());

        let mut union: Vec<usize> = eq.iter().chain(&gt).chain(&lt).copied().collect();
        union.sort_unstable();
        prop_assert_eq!(union, (0..statuses.len()).collect::<Vec<_>>());
        for (i, s) in statuses.iter().enumerate() {
            prop_assert_eq!(eq.contains(&i), *s == pivot);
            prop_assert_eq!(gt.contains(&i), *s > pivot);
            prop_assert_eq!(lt.contains(&i), *s < pivot);
        }
    }
}
