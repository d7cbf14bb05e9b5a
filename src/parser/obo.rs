//! Parser for OBO flat files, e.g. `go-basic.obo`
//!
//! ```text
//! [Term]
//! id: GO:0000002
//! name: mitochondrial genome maintenance
//! namespace: biological_process
//! def: "The maintenance of the structure and integrity of the mitochondrial genome." [GOC:ai]
//! is_a: GO:0007005 ! mitochondrion organization
//! ```
//!
//! Only `[Term]` stanzas are imported. `def:` and `comment:` lines are
//! concatenated into the description in file order.

use std::collections::HashMap;
use std::io::BufRead;

use tracing::{info, trace};

use crate::parser;
use crate::store::{ImportBatch, Relationship, TermRecord};
use crate::OntologyResult;

/// Splits an OBO line into key and value
fn parse_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

/// Returns the parent ID of an `is_a` value, e.g. `GO:0007005 ! mitochondrion organization`
fn is_a_id(value: &str) -> Option<&str> {
    let id = match value.split_once('!') {
        Some((id, _)) => id,
        None => value,
    }
    .trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Collects terms in file order, merging repeated IDs
#[derive(Default)]
struct Terms {
    records: Vec<TermRecord>,
    index: HashMap<String, usize>,
}

impl Terms {
    fn get_or_insert(&mut self, id: &str) -> usize {
        if let Some(idx) = self.index.get(id) {
            return *idx;
        }
        let idx = self.records.len();
        self.records.push(TermRecord::new(id, "", "", ""));
        self.index.insert(id.to_string(), idx);
        idx
    }
}

/// Reads all terms and `is_a` relationships from an OBO source
///
/// # Errors
///
/// Returns [`crate::OntologyError::Io`] if the reader fails
pub fn parse<R: BufRead>(reader: R) -> OntologyResult<ImportBatch> {
    let mut terms = Terms::default();
    let mut relationships = Vec::new();

    // files without stanza headers only contain terms
    let mut in_term_stanza = true;
    let mut current: Option<usize> = None;

    for line in parser::lines(reader) {
        let Some(line) = line? else {
            continue;
        };
        let line = line.trim();

        if line.starts_with('[') {
            in_term_stanza = line == "[Term]";
            current = None;
            continue;
        }
        if !in_term_stanza {
            continue;
        }

        let Some((key, value)) = parse_line(line) else {
            continue;
        };

        if key == "id" {
            current = Some(terms.get_or_insert(value));
            continue;
        }

        let Some(idx) = current else {
            trace!("Ignoring header line: {}", line);
            continue;
        };
        let term = &mut terms.records[idx];

        match key {
            "name" => term.name = value.to_string(),
            "namespace" => term.term_type = value.to_string(),
            "def" | "comment" => term.desc.push_str(value),
            "is_a" => match is_a_id(value) {
                Some(parent) => relationships.push(Relationship::new(&term.id, parent)),
                None => trace!("Unable to parse is_a: {}", line),
            },
            _ => (),
        }
    }

    info!(
        "Parsed {} terms and {} relationships",
        terms.records.len(),
        relationships.len()
    );

    Ok(ImportBatch {
        terms: terms.records,
        relationships,
        gene_terms: Vec::new(),
    })
}
