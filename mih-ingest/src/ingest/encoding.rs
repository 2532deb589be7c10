//! Encoding resolution for uploaded CSV bytes
//!
//! Vendor exports arrive as UTF-8 (with or without BOM) or as one of the
//! single-byte Western encodings. Candidates are tried in a fixed order and
//! the first one that decodes the *whole* byte stream and parses as CSV wins.
//! There is no content scoring: a successful full decode is the only signal.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use super::columns::HeaderRow;

/// Longest field the CSV reader accepts, in characters
pub const MAX_FIELD_CHARS: usize = 131_072;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Candidate text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8 with a leading byte-order mark stripped (the mark is optional)
    Utf8Sig,
    Utf8,
    Latin1,
    Windows1252,
    Iso8859_1,
}

impl Encoding {
    /// Fixed attempt order
    pub const PRIORITY: [Encoding; 5] = [
        Encoding::Utf8Sig,
        Encoding::Utf8,
        Encoding::Latin1,
        Encoding::Windows1252,
        Encoding::Iso8859_1,
    ];

    /// Label reported back to clients as `encoding_detected`
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8Sig => "utf-8-sig",
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
            Encoding::Windows1252 => "cp1252",
            Encoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decode the entire byte stream or fail; never returns partial text
    pub fn decode(self, bytes: &[u8]) -> Result<String, String> {
        match self {
            Encoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                decode_utf8(body)
            }
            Encoding::Utf8 => decode_utf8(bytes),
            Encoding::Latin1 | Encoding::Iso8859_1 => {
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
            Encoding::Windows1252 => decode_windows_1252(bytes),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| format!("invalid utf-8 at byte {}", e.valid_up_to()))
}

/// Code points for 0x80..=0x9F; `None` marks the five undefined bytes
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

fn decode_windows_1252(bytes: &[u8]) -> Result<String, String> {
    let mut text = String::with_capacity(bytes.len());
    for (pos, &b) in bytes.iter().enumerate() {
        let ch = match b {
            0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(b - 0x80)]
                .ok_or_else(|| format!("undefined byte 0x{:02X} at position {}", b, pos))?,
            _ => char::from(b),
        };
        text.push(ch);
    }
    Ok(text)
}

/// Why one candidate encoding was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingAttempt {
    pub encoding: Encoding,
    pub reason: String,
}

/// No candidate encoding decoded and parsed the whole file
#[derive(Debug, Clone, Error)]
#[error("could not decode file with any of the encodings [{}]", attempted_labels(.attempts))]
pub struct DecodeFailure {
    /// One entry per candidate, in attempt order
    pub attempts: Vec<EncodingAttempt>,
}

fn attempted_labels(attempts: &[EncodingAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.encoding.label(), a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parsed content plus the encoding that produced it
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub encoding: Encoding,
}

/// Try each encoding in priority order, running `parse` on the decoded text
fn resolve_with<T, F>(bytes: &[u8], parse: F) -> Result<Decoded<T>, DecodeFailure>
where
    F: Fn(&str) -> Result<T, String>,
{
    let mut attempts = Vec::with_capacity(Encoding::PRIORITY.len());

    for encoding in Encoding::PRIORITY {
        let outcome = encoding.decode(bytes).and_then(|text| parse(&text));
        match outcome {
            Ok(value) => return Ok(Decoded { value, encoding }),
            Err(reason) => {
                debug!(encoding = encoding.label(), %reason, "Encoding attempt rejected");
                attempts.push(EncodingAttempt { encoding, reason });
            }
        }
    }

    Err(DecodeFailure { attempts })
}

fn csv_reader(text: &str, has_headers: bool) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(text.as_bytes())
}

fn check_field_sizes(record: &csv::StringRecord) -> Result<(), String> {
    match record.iter().find(|f| f.chars().count() > MAX_FIELD_CHARS) {
        Some(_) => Err(format!("field larger than field limit ({})", MAX_FIELD_CHARS)),
        None => Ok(()),
    }
}

/// Header-mapped rows: the first row names the columns
///
/// Short rows simply lack the trailing headers; surplus cells are ignored.
/// A repeated header keeps the value of its last column.
pub fn resolve_records(bytes: &[u8]) -> Result<Decoded<Vec<HeaderRow>>, DecodeFailure> {
    resolve_with(bytes, |text| {
        let mut reader = csv_reader(text, true);
        let headers = reader.headers().map_err(|e| e.to_string())?.clone();
        check_field_sizes(&headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            check_field_sizes(&record)?;

            let cells: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();
            rows.push(HeaderRow::new(cells));
        }
        Ok(rows)
    })
}

/// Raw rows, header included, as lists of cells
pub fn resolve_rows(bytes: &[u8]) -> Result<Decoded<Vec<Vec<String>>>, DecodeFailure> {
    resolve_with(bytes, |text| {
        let mut reader = csv_reader(text, false);
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            check_field_sizes(&record)?;
            rows.push(record.iter().map(str::to_owned).collect());
        }
        Ok(rows)
    })
}
