//! Parsers for external ontology and annotation files
//!
//! Each parser reads a text source line by line and collects the
//! normalized rows into an [`ImportBatch`](crate::store::ImportBatch).
//! Nothing is written to storage here, that is done by the
//! [`Ontology`](crate::Ontology) import methods in a single transaction.
//!
//! All parsers are lenient: lines that cannot be parsed are skipped
//! (and logged at `trace` level) instead of aborting the import.
//!
//! | Format | Module | Rows |
//! | --- | --- | --- |
//! | OBO | [`obo`] | terms, relationships |
//! | MapMan export | [`mapman`] | terms, relationships, gene-terms |
//! | delimited gene/term table | [`gene_terms`] | gene-terms |

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::trace;

use crate::{OntologyError, OntologyResult};

pub mod gene_terms;
pub mod mapman;
pub mod obo;

pub use gene_terms::GeneTermFormat;

/// Opens a file for buffered line-by-line reading
pub(crate) fn open<P: AsRef<Path>>(file: P) -> OntologyResult<BufReader<File>> {
    let filename = file.as_ref().display().to_string();
    let file = File::open(file).map_err(|_| OntologyError::CannotOpenFile(filename))?;
    Ok(BufReader::new(file))
}

/// Iterates the lines of a source without the trailing `\n` or `\r\n`
///
/// Unlike [`BufRead::lines`], a line that is not valid UTF-8 does not end the
/// iteration. It is yielded as `None` so that parsers can skip it, while
/// reading errors of the source are still returned.
pub(crate) struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    lineno: usize,
}

/// Returns the lines of `reader`, see [`Lines`]
pub(crate) fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        reader,
        buf: Vec::new(),
        lineno: 0,
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = std::io::Result<Option<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.lineno += 1;
                let mut line = &self.buf[..];
                if let Some(rest) = line.strip_suffix(b"\n") {
                    line = rest;
                }
                if let Some(rest) = line.strip_suffix(b"\r") {
                    line = rest;
                }
                match std::str::from_utf8(line) {
                    Ok(line) => Some(Ok(Some(line.to_string()))),
                    Err(err) => {
                        trace!("Skipping line {}: {}", self.lineno, err);
                        Some(Ok(None))
                    }
                }
            }
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file() {
        match open("does/not/exist.obo") {
            Err(OntologyError::CannotOpenFile(name)) => assert_eq!(name, "does/not/exist.obo"),
            _ => panic!("file must not exist"),
        }
    }

    #[test]
    fn lines_skip_invalid_utf8() {
        let source: &[u8] = b"first\r\nse\xffcond\nthird";
        let lines: Vec<Option<String>> = lines(source).map(Result::unwrap).collect();
        assert_eq!(
            lines,
            vec![Some("first".to_string()), None, Some("third".to_string())]
        );
    }

    #[test]
    fn lines_keep_empty_fields() {
        let source: &[u8] = b"\tG1\tGO:1\n\n";
        let lines: Vec<Option<String>> = lines(source).map(Result::unwrap).collect();
        assert_eq!(lines, vec![Some("\tG1\tGO:1".to_string()), Some(String::new())]);
    }
}
