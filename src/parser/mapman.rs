//! Parser for MapMan mapping exports
//!
//! ```text
//! 'BINCODE'	'NAME'	'IDENTIFIER'	'DESCRIPTION'	'TYPE'
//! '1.1'	'PS.lightreaction'	'grmzm2g001234_t01'	'photosystem II'	'T'
//! '1.1.2'	'PS.lightreaction.photosystem I'	'grmzm2g005678_t02'	'PSI subunit'	'T'
//! ```
//!
//! - The first line is a header and is skipped.
//! - Values may be wrapped in single quotes.
//! - Gene identifiers are upper-cased and the transcript suffix `_T<digits>` is removed,
//!   so that transcripts of the same gene collapse to one gene ID.
//! - The hierarchy is encoded in the bin code: `1.1.2` is a child of `1.1`.

use std::collections::HashMap;
use std::io::BufRead;

use regex::Regex;
use tracing::{info, trace};

use crate::parser;
use crate::store::{GeneTerm, ImportBatch, Relationship, TermRecord};
use crate::OntologyResult;

/// A single row of a MapMan export
///
/// A row has at least four columns, `code`, `name`, `gene` and `desc`.
/// All further columns are collected in `types`, in order.
#[derive(Debug, PartialEq)]
struct MapManRecord<'a> {
    code: &'a str,
    name: &'a str,
    gene: &'a str,
    desc: &'a str,
    types: Vec<&'a str>,
}

impl<'a> MapManRecord<'a> {
    const MIN_COLUMNS: usize = 4;

    fn parse(line: &'a str) -> Option<Self> {
        let cols: Vec<&str> = line
            .split('\t')
            .map(|col| col.trim().trim_matches('\''))
            .collect();
        if cols.len() < Self::MIN_COLUMNS || cols[0].is_empty() {
            return None;
        }
        Some(Self {
            code: cols[0],
            name: cols[1],
            gene: cols[2],
            desc: cols[3],
            types: cols[Self::MIN_COLUMNS..].to_vec(),
        })
    }
}

/// Normalizes MapMan identifiers
struct Normalizer {
    transcript: Regex,
    child_code: Regex,
}

impl Normalizer {
    fn new() -> OntologyResult<Self> {
        Ok(Self {
            transcript: Regex::new(r"_T\d+$")?,
            child_code: Regex::new(r"\.\d+$")?,
        })
    }

    /// `grmzm2g001234_t01` => `GRMZM2G001234`
    fn gene(&self, gene: &str) -> String {
        self.transcript
            .replace(&gene.to_uppercase(), "")
            .into_owned()
    }

    /// `1.1.2` => `Some("1.1")`, `1` => `None`
    fn parent<'a>(&self, code: &'a str) -> Option<&'a str> {
        self.child_code
            .find(code)
            .map(|suffix| &code[..suffix.start()])
            .filter(|parent| !parent.is_empty())
    }
}

/// Reads all bins, their hierarchy and the binned genes from a MapMan export
///
/// # Errors
///
/// Returns [`crate::OntologyError::Io`] if the reader fails
pub fn parse<R: BufRead>(reader: R) -> OntologyResult<ImportBatch> {
    let normalize = Normalizer::new()?;

    let mut terms: Vec<TermRecord> = Vec::new();
    let mut term_index: HashMap<String, usize> = HashMap::new();
    let mut parents: Vec<Relationship> = Vec::new();
    let mut gene_terms: Vec<GeneTerm> = Vec::new();

    for line in parser::lines(reader).skip(1) {
        let Some(line) = line? else {
            continue;
        };
        let Some(record) = MapManRecord::parse(&line) else {
            trace!("Skipping line: {}", line);
            continue;
        };
        trace!(
            "Bin {} gene {} ({}) {:?}",
            record.code,
            record.gene,
            record.desc,
            record.types
        );

        // The bin name is repeated for every gene, the last one wins
        match term_index.get(record.code) {
            Some(idx) => terms[*idx].name = record.name.to_string(),
            None => {
                term_index.insert(record.code.to_string(), terms.len());
                terms.push(TermRecord::new(record.code, record.name, "", ""));
                if let Some(parent) = normalize.parent(record.code) {
                    parents.push(Relationship::new(record.code, parent));
                }
            }
        }

        let gene = normalize.gene(record.gene);
        if gene.is_empty() {
            continue;
        }
        gene_terms.push(GeneTerm::new(gene, record.code));
    }

    info!(
        "Parsed {} terms, {} relationships and {} gene-terms",
        terms.len(),
        parents.len(),
        gene_terms.len()
    );

    Ok(ImportBatch {
        terms,
        relationships: parents,
        gene_terms,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::GeneId;

    const MAPMAN: &str = "'BINCODE'\t'NAME'\t'IDENTIFIER'\t'DESCRIPTION'\t'TYPE'
'1'\t'PS'\t''\t''\t
'1.1'\t'PS.lightreaction'\t'zm001_t01'\t'photosystem II'\t'T'
'1.1'\t'PS.lightreaction'\t'ZM001_T02'\t'photosystem II'\t'T'
'1.1.2'\t'PS.lightreaction.photosystem I'\t'zm002_T3'\t'PSI'\t'T'\t'extra'
broken line
";

    #[test]
    fn record_minimum_columns() {
        assert!(MapManRecord::parse("'1'\t'PS'\t'G1'").is_none());
        let record = MapManRecord::parse("'1'\t'PS'\t'G1'\t'desc'").unwrap();
        assert_eq!(record.code, "1");
        assert_eq!(record.gene, "G1");
        assert!(record.types.is_empty());

        let record = MapManRecord::parse("'1'\t'PS'\t'G1'\t'desc'\t'T'\t'M'").unwrap();
        assert_eq!(record.types, vec!["T", "M"]);
    }

    #[test]
    fn transcripts_are_gene_ids() {
        let normalize = Normalizer::new().unwrap();
        assert_eq!(normalize.gene("ZM001_T01"), "ZM001");
        assert_eq!(normalize.gene("zm001_t01"), "ZM001");
        assert_eq!(normalize.gene("AT1G01010.1"), "AT1G01010.1");
        assert_eq!(normalize.gene("ZM_T01X"), "ZM_T01X");
    }

    #[test]
    fn parent_from_code() {
        let normalize = Normalizer::new().unwrap();
        assert_eq!(normalize.parent("1.1.2"), Some("1.1"));
        assert_eq!(normalize.parent("1.1"), Some("1"));
        assert_eq!(normalize.parent("1"), None);
        assert_eq!(normalize.parent("35.2"), Some("35"));
    }

    #[test]
    fn record_without_code() {
        assert!(MapManRecord::parse("\t'1'\t'PS'\t'G1'\t'desc'").is_none());
        let record = MapManRecord::parse("'1'\t\t'G1'\t'desc'").unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.gene, "G1");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let export: &[u8] = b"'BINCODE'\t'NAME'\t'IDENTIFIER'\t'DESCRIPTION'\t'TYPE'
'1'\t'PS'\t'zm001'\t'd\xe9sc'\t'T'
\t'2'\t'CHO'\t'zm002'\t'x'
'3'\t'TCA'\t'zm003'\t'x'\t'T'
";
        let batch = parse(export).unwrap();
        let codes: Vec<&str> = batch.terms.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(codes, vec!["3"]);
        assert_eq!(batch.gene_terms, vec![GeneTerm::new("ZM003", "3")]);
    }

    #[test]
    fn parse_export() {
        let batch = parse(MAPMAN.as_bytes()).unwrap();

        let codes: Vec<&str> = batch.terms.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(codes, vec!["1", "1.1", "1.1.2"]);
        assert_eq!(batch.terms[2].name, "PS.lightreaction.photosystem I");

        assert_eq!(
            batch.relationships,
            vec![Relationship::new("1.1", "1"), Relationship::new("1.1.2", "1.1")]
        );

        assert_eq!(batch.gene_terms.len(), 3);
        assert_eq!(batch.gene_terms[0].gene, GeneId::from("ZM001"));
        assert_eq!(batch.gene_terms[1].gene, GeneId::from("ZM001"));
        assert_eq!(batch.gene_terms[2], GeneTerm::new("ZM002", "1.1.2"));
    }
}
