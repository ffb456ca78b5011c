use anyhow::{Context, Result};

/// Splits CSV text into rows without ever failing.
///
/// Quoted fields may contain commas, quotes and newlines. Rows may have any
/// width. A record the reader cannot decode becomes an empty row so that the
/// rows after it keep their sheet row numbers.
pub fn parse_csv_text(text: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        match record {
            Ok(record) => rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            ),
            Err(err) => {
                log::debug!("unreadable csv record {}: {err}", idx + 1);
                rows.push(Vec::new());
            }
        }
    }
    rows
}

pub fn write_csv_text(rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .context("failed to encode csv row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv writer: {err}"))?;
    String::from_utf8(bytes).context("csv output is not valid utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_commas_stay_in_one_cell() {
        let rows = parse_csv_text(
            "\"Company Name\",\"Headquarters\"\n\"Acme, Inc.\",\"Austin, TX\"\n",
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["Acme, Inc.", "Austin, TX"]);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let rows = parse_csv_text("a,b,c\n1\n1,2,3,4\n");

        assert_eq!(rows[1], vec!["1"]);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn unbalanced_quote_does_not_fail() {
        let rows = parse_csv_text("Company Name,Notes\nAcme,\"never closed\nGlobex,ok\n");

        assert_eq!(rows[0], vec!["Company Name", "Notes"]);
        assert_eq!(rows[1][0], "Acme");
    }

    #[test]
    fn written_text_parses_back() {
        let rows = vec![
            vec!["Company Name".to_string(), "Notes".to_string()],
            vec!["Acme, Inc.".to_string(), "said \"hi\"".to_string()],
        ];

        let text = write_csv_text(&rows).expect("csv should encode");

        assert_eq!(parse_csv_text(&text), rows);
    }
}
