//! Delimited-text input: header row plus comma-separated data rows.
//!
//! No quoting or escaping. Blank lines are skipped. Headers are trimmed and
//! lowercased; values are trimmed. Short rows are padded with "".

use crate::{
    error::{MindError, MindResult},
    types::RawRow,
};
use serde_json::Value;

pub fn parse_delimited(text: &str) -> MindResult<Vec<RawRow>> {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(MindError::malformed("CSV file is empty or invalid"));
    }
    let body = lines.join("\n");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(header) => header?.iter().map(|h| h.to_lowercase()).collect(),
        None => return Err(MindError::malformed("CSV file has no header row")),
    };

    let mut rows = Vec::with_capacity(lines.len() - 1);
    for record in records {
        let record = record?;
        let mut row = RawRow::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            row.insert(header.clone(), Value::String(value.to_string()));
        }
        rows.push(row);
    }
    log::debug!("Parsed {} rows with {} columns", rows.len(), headers.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_trimmed_and_lowercased() {
        let rows = parse_delimited(" Employee_ID , NAME \nE1, Ada \n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["employee_id"], "E1");
        assert_eq!(rows[0]["name"], "Ada");
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let rows = parse_delimited("a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "");
        assert_eq!(rows[0]["c"], "");
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1]["c"], "3");
    }

    #[test]
    fn blank_lines_and_crlf_ignored() {
        let rows = parse_delimited("a,b\r\n\r\n1,2\r\n   \r\n3,4\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["b"], "4");
    }

    #[test]
    fn quotes_are_not_special() {
        let rows = parse_delimited("name,shift\n\"Lee,Day\"\n").unwrap();
        assert_eq!(rows[0]["name"], "\"Lee");
        assert_eq!(rows[0]["shift"], "Day\"");
    }

    #[test]
    fn fewer_than_two_lines_is_malformed() {
        for input in ["", "   \n  ", "employee_id,name", "employee_id,name\n\n"] {
            assert!(
                matches!(parse_delimited(input), Err(MindError::MalformedInput { .. })),
                "expected malformed for {input:?}"
            );
        }
    }
}
