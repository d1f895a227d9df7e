// src/io/loader.rs

use crate::error::{PlannerError, Result};
use crate::model::table::RawTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 20;

/// Guesses the field delimiter from the first lines of the file.
///
/// Picks the candidate that splits every sampled line into the same number
/// of fields (more than one), preferring the largest field count. Quoted
/// sections are skipped while counting. Defaults to a comma.
pub fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return b',';
    }

    let mut best: Option<(u8, usize, bool)> = None;
    for &delim in &CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, delim)).collect();
        let header_count = counts[0];
        if header_count == 0 {
            continue;
        }
        let consistent = counts.iter().all(|&c| c == header_count);
        let better = match best {
            None => true,
            Some((_, count, was_consistent)) => {
                (consistent && !was_consistent)
                    || (consistent == was_consistent && header_count > count)
            }
        };
        if better {
            best = Some((delim, header_count, consistent));
        }
    }

    best.map(|(delim, _, _)| delim).unwrap_or(b',')
}

fn count_unquoted(line: &str, delim: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delim && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Reads a whole CSV export into memory.
///
/// Rows may be ragged; missing trailing cells read as blank. A UTF-8 BOM
/// on the first header is dropped.
pub fn load_table<R: Read>(mut reader: R) -> Result<RawTable> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_table(&text)
}

/// Parses CSV text already held in memory.
pub fn parse_table(text: &str) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = sniff_delimiter(text);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(PlannerError::Schema("the file has no header row".into()));
    }

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| {
            PlannerError::Schema(format!("CSV parse error at line {}: {}", line_num + 2, e))
        })?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(delimiter = %(delimiter as char).escape_default(), "delimiter detected");
    Ok(RawTable::new(headers, rows, delimiter))
}

/// Loads a CSV export from disk. The file handle is released before returning.
pub fn load_table_file(path: &Path) -> Result<RawTable> {
    let table = {
        let file = File::open(path)?;
        load_table(file)?
    };
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "sales file loaded"
    );
    Ok(table)
}
