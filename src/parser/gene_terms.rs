//! Parser for delimited gene-to-term tables
//!
//! Any table with one gene and one term column can be imported, e.g. a
//! GO annotation export:
//!
//! ```text
//! gene_id	go_id	evidence
//! GRMZM2G000014	GO:0005634	IEA
//! GRMZM2G000014	GO:0003677	IEA
//! ```
//!
//! Both columns are checked against a regular expression, see [`GeneTermFormat`].

use std::io::BufRead;

use regex::Regex;
use tracing::{info, trace};

use crate::parser;
use crate::store::GeneTerm;
use crate::{OntologyError, OntologyResult};

/// Describes the layout of a delimited gene/term table
///
/// # Filters
///
/// `gene_filter` and `term_filter` are regular expressions that must match
/// at the start of the respective column, otherwise the line is skipped.
/// If the expression contains a capture group, the first group becomes the
/// imported value. Otherwise the complete column value is imported.
///
/// # Examples
///
/// ```
/// use ontogene::parser::GeneTermFormat;
///
/// // genes in column 2, terms in column 5, only GO terms, strip the `GO:` prefix
/// let format = GeneTermFormat::default()
///     .gene_col(2)
///     .term_col(5)
///     .term_filter(r"GO:(\d+)")
///     .skip(1)
///     .sep(',');
/// ```
#[derive(Debug, Clone)]
pub struct GeneTermFormat {
    gene_col: usize,
    term_col: usize,
    gene_filter: String,
    term_filter: String,
    skip: usize,
    sep: char,
}

impl Default for GeneTermFormat {
    fn default() -> Self {
        Self {
            gene_col: 1,
            term_col: 2,
            gene_filter: ".*".to_string(),
            term_filter: ".*".to_string(),
            skip: 0,
            sep: '\t',
        }
    }
}

impl GeneTermFormat {
    /// The 1-based column of the gene ID (default `1`)
    #[must_use]
    pub fn gene_col(mut self, col: usize) -> Self {
        self.gene_col = col;
        self
    }

    /// The 1-based column of the term ID (default `2`)
    #[must_use]
    pub fn term_col(mut self, col: usize) -> Self {
        self.term_col = col;
        self
    }

    /// The regular expression for the gene column (default `.*`)
    #[must_use]
    pub fn gene_filter(mut self, pattern: &str) -> Self {
        self.gene_filter = pattern.to_string();
        self
    }

    /// The regular expression for the term column (default `.*`)
    #[must_use]
    pub fn term_filter(mut self, pattern: &str) -> Self {
        self.term_filter = pattern.to_string();
        self
    }

    /// The number of header lines to skip (default `0`)
    #[must_use]
    pub fn skip(mut self, lines: usize) -> Self {
        self.skip = lines;
        self
    }

    /// The column separator (default `\t`)
    #[must_use]
    pub fn sep(mut self, sep: char) -> Self {
        self.sep = sep;
        self
    }
}

/// A compiled column filter
struct ColumnFilter {
    regex: Regex,
}

impl ColumnFilter {
    fn new(pattern: &str) -> OntologyResult<Self> {
        Ok(Self {
            regex: Regex::new(&format!("^(?:{pattern})"))?,
        })
    }

    /// Returns the value to import, `None` if the column does not match
    fn extract<'a>(&self, value: &'a str) -> Option<&'a str> {
        let captures = self.regex.captures(value)?;
        if self.regex.captures_len() > 1 {
            captures.get(1).map(|group| group.as_str())
        } else {
            Some(value)
        }
    }
}

/// Reads all gene/term pairs from a delimited table
///
/// # Errors
///
/// - [`OntologyError::InvalidInput`] if a column index is `0`
/// - [`OntologyError::InvalidPattern`] if a filter is not a valid regular expression
/// - [`OntologyError::Io`] if the reader fails
pub fn parse<R: BufRead>(reader: R, format: &GeneTermFormat) -> OntologyResult<Vec<GeneTerm>> {
    if format.gene_col == 0 || format.term_col == 0 {
        return Err(OntologyError::InvalidInput(
            "gene and term columns are 1-based".to_string(),
        ));
    }
    let gene_filter = ColumnFilter::new(&format.gene_filter)?;
    let term_filter = ColumnFilter::new(&format.term_filter)?;

    let mut gene_terms = Vec::new();
    for line in parser::lines(reader).skip(format.skip) {
        let Some(line) = line? else {
            continue;
        };
        let cols: Vec<&str> = line.split(format.sep).map(str::trim).collect();

        let (Some(gene), Some(term)) = (cols.get(format.gene_col - 1), cols.get(format.term_col - 1))
        else {
            trace!("Missing columns: {}", line);
            continue;
        };

        let Some(term) = term_filter.extract(term) else {
            trace!("Term filter does not match: {}", line);
            continue;
        };
        let Some(gene) = gene_filter.extract(gene) else {
            trace!("Gene filter does not match: {}", line);
            continue;
        };
        if gene.is_empty() || term.is_empty() {
            trace!("Empty gene or term: {}", line);
            continue;
        }
        gene_terms.push(GeneTerm::new(gene, term));
    }
    info!("Parsed {} gene-term pairs", gene_terms.len());
    Ok(gene_terms)
}

#[cfg(test)]
mod test {
    use super::*;

    const TABLE: &str = "gene\tterm\tevidence
G1\tGO:0001\tIEA
G2\tGO:0002\tIDA
G3\tPO:0003\tIEA
G4
G5\tGO:0001\tIEA
";

    #[test]
    fn default_format() {
        let pairs = parse(TABLE.as_bytes(), &GeneTermFormat::default().skip(1)).unwrap();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], GeneTerm::new("G1", "GO:0001"));
        assert_eq!(pairs[3], GeneTerm::new("G5", "GO:0001"));
    }

    #[test]
    fn header_is_imported_without_skip() {
        let pairs = parse(TABLE.as_bytes(), &GeneTermFormat::default()).unwrap();
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0], GeneTerm::new("gene", "term"));
    }

    #[test]
    fn filter_without_group_keeps_value() {
        let format = GeneTermFormat::default().skip(1).term_filter("GO:");
        let pairs = parse(TABLE.as_bytes(), &format).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], GeneTerm::new("G2", "GO:0002"));
    }

    #[test]
    fn filter_with_group_rewrites_value() {
        let format = GeneTermFormat::default()
            .skip(1)
            .term_filter(r"GO:(\d+)")
            .gene_filter("G([1-2])");
        let pairs = parse(TABLE.as_bytes(), &format).unwrap();
        assert_eq!(
            pairs,
            vec![GeneTerm::new("1", "0001"), GeneTerm::new("2", "0002")]
        );
    }

    #[test]
    fn filter_matches_at_start() {
        let format = GeneTermFormat::default().skip(1).term_filter("0001");
        assert!(parse(TABLE.as_bytes(), &format).unwrap().is_empty());
    }

    #[test]
    fn swapped_columns_and_separator() {
        let table = "GO:1,G1\nGO:2,G2\n";
        let format = GeneTermFormat::default().gene_col(2).term_col(1).sep(',');
        let pairs = parse(table.as_bytes(), &format).unwrap();
        assert_eq!(pairs[1], GeneTerm::new("G2", "GO:2"));
    }

    #[test]
    fn invalid_utf8_lines_are_skipped() {
        let table: &[u8] = b"G1\tGO:1\nG2\tGO:\xff\xfe\nG3\tGO:3\n";
        let pairs = parse(table, &GeneTermFormat::default()).unwrap();
        assert_eq!(
            pairs,
            vec![GeneTerm::new("G1", "GO:1"), GeneTerm::new("G3", "GO:3")]
        );
    }

    #[test]
    fn empty_leading_column_keeps_positions() {
        let table = "\tG1\tGO:1\tIEA\r\n";
        let format = GeneTermFormat::default().gene_col(2).term_col(3);
        let pairs = parse(table.as_bytes(), &format).unwrap();
        assert_eq!(pairs, vec![GeneTerm::new("G1", "GO:1")]);

        // the gene column is empty, not `G1`
        let pairs = parse(table.as_bytes(), &GeneTermFormat::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn invalid_options() {
        let format = GeneTermFormat::default().gene_col(0);
        assert!(matches!(
            parse(TABLE.as_bytes(), &format),
            Err(OntologyError::InvalidInput(_))
        ));

        let format = GeneTermFormat::default().gene_filter("G(");
        assert!(matches!(
            parse(TABLE.as_bytes(), &format),
            Err(OntologyError::InvalidPattern(_))
        ));
    }
}
