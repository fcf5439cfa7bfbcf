//! Label description file parser.
//!
//! A label description file starts with a free-form preamble bracketed by two
//! delimiter lines, followed by a single header line and then one record per
//! label:
//!
//! ```text
//! ################################################
//! # Label Description File
//! # IDX   -R-  -G-  -B-  -A--  VIS MSH  LABEL
//! ################################################
//!     0     0    0    0        0  0  0    "Clear Label"
//!     7   255    0    0        1  1  1    "Tumor"
//! ```
//!
//! Only the id, the three color channels and the trailing name are used. The
//! name starts at the eighth token. A record with extra numeric columns
//! before a quoted name keeps the whole quoted name.
//!
//! The line right after the second delimiter is always skipped; the
//! background label is inserted by the parser instead.

use std::path::Path;

use super::error::ColormapError;
use super::table::{Choice, LabelTable, Rgba};
use crate::constants::{DEFAULT_LABEL_ALPHA, LABEL_FILE_DELIMITER};

/// Minimum number of tokens in a record (id + RGB).
const MIN_RECORD_TOKENS: usize = 4;

/// Index of the first token of an unquoted label name.
const NAME_TOKEN_INDEX: usize = 7;

/// A single parsed label record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    /// Label id
    pub id: u32,
    /// 8-bit RGB color
    pub rgb: [u8; 3],
    /// Display name with quotes removed
    pub name: String,
}

impl LabelRecord {
    /// Normalized RGBA color with the given alpha.
    pub fn color(&self, alpha: f32) -> Rgba {
        [
            f32::from(self.rgb[0]) / 255.0,
            f32::from(self.rgb[1]) / 255.0,
            f32::from(self.rgb[2]) / 255.0,
            alpha,
        ]
    }
}

/// Parser for label description files.
#[derive(Debug, Clone, Copy)]
pub struct LabelFileParser {
    alpha: f32,
}

impl LabelFileParser {
    /// Create a parser that assigns `alpha` to every parsed label.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Alpha assigned to parsed labels.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Read and parse a label description file.
    pub fn parse_file(&self, path: &Path) -> Result<LabelTable, ColormapError> {
        let content = std::fs::read_to_string(path).map_err(|source| ColormapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&content, &path.display().to_string())
    }

    /// Parse label description text. `origin` names the input in errors.
    pub fn parse_str(&self, content: &str, origin: &str) -> Result<LabelTable, ColormapError> {
        let lines: Vec<&str> = content.lines().collect();

        let delimiters: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_delimiter(line))
            .map(|(idx, _)| idx)
            .take(2)
            .collect();
        let [_, second] = delimiters[..] else {
            return Err(ColormapError::MissingDelimiter {
                file: origin.to_string(),
                found: delimiters.len(),
            });
        };

        let mut table = LabelTable::background_only();

        // Skip the delimiter itself and the header line after it
        for (idx, line) in lines.iter().enumerate().skip(second + 2) {
            let line_num = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_record(line, line_num, origin)?;
            if table.colormap.contains(record.id) {
                return Err(ColormapError::DuplicateLabel {
                    file: origin.to_string(),
                    line: line_num,
                    id: record.id,
                });
            }

            log::trace!("{}:{}: label {} '{}'", origin, line_num, record.id, record.name);
            table.colormap.insert(record.id, record.color(self.alpha));
            table.choices.push(Choice::new(record.id, &record.name));
        }

        log::debug!(
            "Parsed {} labels from {} (alpha {})",
            table.len() - 1,
            origin,
            self.alpha
        );
        Ok(table)
    }
}

impl Default for LabelFileParser {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_ALPHA)
    }
}

/// Parse one whitespace-separated label record.
pub fn parse_record(line: &str, line_num: usize, origin: &str) -> Result<LabelRecord, ColormapError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_RECORD_TOKENS {
        return Err(ColormapError::malformed(
            origin,
            line_num,
            format!(
                "expected at least {} fields (id r g b), found {}",
                MIN_RECORD_TOKENS,
                tokens.len()
            ),
        ));
    }

    let id: u32 = tokens[0]
        .parse()
        .map_err(|_| ColormapError::invalid_token(origin, line_num, "label id", tokens[0]))?;

    let mut rgb = [0u8; 3];
    for (channel, (slot, token)) in ["red", "green", "blue"]
        .into_iter()
        .zip(rgb.iter_mut().zip(&tokens[1..MIN_RECORD_TOKENS]))
    {
        *slot = token
            .parse()
            .map_err(|_| ColormapError::invalid_token(origin, line_num, channel, *token))?;
    }

    // Extra numeric columns push a quoted name past its usual position
    let name_start = (NAME_TOKEN_INDEX + 1..tokens.len())
        .find(|&idx| tokens[idx].starts_with('"'))
        .filter(|&idx| {
            tokens[MIN_RECORD_TOKENS..idx]
                .iter()
                .all(|token| token.parse::<f64>().is_ok())
        })
        .unwrap_or(NAME_TOKEN_INDEX);
    let name = tokens
        .get(name_start..)
        .unwrap_or_default()
        .join(" ")
        .replace('"', "");

    Ok(LabelRecord { id, rgb, name })
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == LABEL_FILE_DELIMITER
}
