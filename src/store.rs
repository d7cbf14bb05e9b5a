//! Persistent storage of terms, relationships and gene/SNP memberships
//!
//! The [`TermStore`] is a thin layer over a SQLite database with four tables:
//!
//! | Table | Columns |
//! | --- | --- |
//! | `terms` | `id` (unique), `name`, `type`, `desc` |
//! | `relationships` | `term`, `is_a` |
//! | `gene_terms` | `gene`, `term` |
//! | `snp_terms` | `chrom`, `pos`, `term` |
//!
//! plus a `globals` key-value table for dataset metadata.
//!
//! Every write that touches more than one row runs inside a single transaction.
//! If any statement fails, the transaction is rolled back and the store keeps
//! its previous state.
//!
//! Indices are not created together with the tables. Bulk imports are much
//! faster without them, so they are built afterwards with [`TermStore::build_indices`].

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::annotations::{GeneId, Locus};
use crate::term::Term;
use crate::OntologyResult;

mod schema;

/// The metadata of a single term, as stored in the `terms` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermRecord {
    /// Unique term ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Category or namespace
    pub term_type: String,
    /// Free-text description
    pub desc: String,
}

impl TermRecord {
    /// Constructs a new [`TermRecord`]
    pub fn new(id: &str, name: &str, term_type: &str, desc: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            term_type: term_type.to_string(),
            desc: desc.to_string(),
        }
    }
}

/// A directed `is_a` edge: `term` is a child of `is_a`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    /// The child term
    pub term: String,
    /// The parent term
    pub is_a: String,
}

impl Relationship {
    /// Constructs a new [`Relationship`] from child to parent
    pub fn new(term: &str, is_a: &str) -> Self {
        Self {
            term: term.to_string(),
            is_a: is_a.to_string(),
        }
    }
}

/// The association of a gene to a term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneTerm {
    /// The gene
    pub gene: GeneId,
    /// The term ID
    pub term: String,
}

impl GeneTerm {
    /// Constructs a new [`GeneTerm`]
    pub fn new<G: Into<GeneId>>(gene: G, term: &str) -> Self {
        Self {
            gene: gene.into(),
            term: term.to_string(),
        }
    }
}

/// Rows collected by an importer, written by [`TermStore::import`]
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    /// Term metadata
    pub terms: Vec<TermRecord>,
    /// `is_a` relationships
    pub relationships: Vec<Relationship>,
    /// Gene memberships
    pub gene_terms: Vec<GeneTerm>,
}

impl ImportBatch {
    /// Returns `true` if the batch contains no rows at all
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.relationships.is_empty() && self.gene_terms.is_empty()
    }
}

/// The SQLite-backed store of an ontology
#[derive(Debug)]
pub struct TermStore {
    conn: Connection,
}

impl TermStore {
    /// Opens (or creates) the database file at `path`
    ///
    /// This does not create any tables, use [`TermStore::create_tables`]
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the database cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> OntologyResult<Self> {
        debug!("Opening term store {}", path.as_ref().display());
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Opens the existing database file at `path`
    ///
    /// Unlike [`TermStore::open`], a missing file is an error and is not created.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the database does not exist
    /// or cannot be opened
    pub fn open_existing<P: AsRef<Path>>(path: P) -> OntologyResult<Self> {
        debug!("Opening existing term store {}", path.as_ref().display());
        Ok(Self {
            conn: Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?,
        })
    }

    /// Creates a new empty store in memory
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if SQLite cannot allocate the database
    pub fn in_memory() -> OntologyResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Creates all tables, if they don't exist yet
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the database rejects the schema
    pub fn create_tables(&self) -> OntologyResult<()> {
        self.conn.execute_batch(schema::PRAGMAS)?;
        self.conn.execute_batch(schema::CREATE_TABLES)?;
        Ok(())
    }

    /// Builds the lookup indices on `terms`, `relationships` and `gene_terms`
    ///
    /// Building is idempotent, existing indices are kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn build_indices(&self) -> OntologyResult<()> {
        debug!("Building term store indices");
        self.conn.execute_batch(schema::CREATE_INDICES)?;
        Ok(())
    }

    /// Returns `true` if all lookup indices are present
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn has_indices(&self) -> OntologyResult<bool> {
        for name in schema::INDEX_NAMES {
            if self.count(schema::COUNT_INDEX, [name])? == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Stores a global metadata value, replacing a previous value
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn set_global(&self, key: &str, val: &str) -> OntologyResult<()> {
        self.conn.execute(schema::SET_GLOBAL, params![key, val])?;
        Ok(())
    }

    /// Returns a global metadata value, `None` if it was never set
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn global(&self, key: &str) -> OntologyResult<Option<String>> {
        Ok(self
            .conn
            .query_row(schema::GET_GLOBAL, [key], |row| row.get(0))
            .optional()?)
    }

    /// Returns the metadata of the term, `None` if the term does not exist
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_record(&self, id: &str) -> OntologyResult<Option<TermRecord>> {
        let mut stmt = self.conn.prepare_cached(schema::SELECT_TERM)?;
        Ok(stmt
            .query_row([id], |row| {
                Ok(TermRecord {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    term_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    desc: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })
            .optional()?)
    }

    /// Returns the IDs of all genes associated to the term
    ///
    /// Duplicated rows are returned as often as they are stored
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_gene_ids(&self, id: &str) -> OntologyResult<Vec<GeneId>> {
        let mut stmt = self.conn.prepare_cached(schema::SELECT_TERM_GENES)?;
        let rows = stmt.query_map([id], |row| row.get::<_, String>(0))?;
        let mut genes = Vec::new();
        for gene in rows {
            genes.push(GeneId::from(gene?));
        }
        Ok(genes)
    }

    /// Returns all loci associated to the term
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_snps(&self, id: &str) -> OntologyResult<Vec<Locus>> {
        let mut stmt = self.conn.prepare_cached(schema::SELECT_TERM_SNPS)?;
        let rows = stmt.query_map([id], |row| {
            let chrom: String = row.get(0)?;
            let pos: i64 = row.get(1)?;
            let pos = u64::try_from(pos).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, pos))?;
            Ok(Locus::new(&chrom, pos))
        })?;
        let mut snps = Vec::new();
        for snp in rows {
            snps.push(snp?);
        }
        Ok(snps)
    }

    /// Returns the IDs of all terms in storage order
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids(&self) -> OntologyResult<Vec<String>> {
        self.strings(schema::SELECT_TERM_IDS, [])
    }

    /// Returns the IDs of all terms with an ID matching the SQL `LIKE` pattern
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids_like(&self, pattern: &str) -> OntologyResult<Vec<String>> {
        self.strings(schema::SELECT_TERM_IDS_LIKE, [pattern])
    }

    /// Returns the IDs of all terms with a name matching the SQL `LIKE` pattern
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids_with_name_like(&self, pattern: &str) -> OntologyResult<Vec<String>> {
        self.strings(schema::SELECT_TERM_NAMES_LIKE, [pattern])
    }

    /// Returns the IDs of all terms of the given type
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids_by_type(&self, term_type: &str) -> OntologyResult<Vec<String>> {
        self.strings(schema::SELECT_TERM_IDS_BY_TYPE, [term_type])
    }

    /// Returns the distinct IDs of all terms that contain any of the `genes`
    ///
    /// Terms are ordered by the first gene that contains them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids_for_genes(&self, genes: &[GeneId]) -> OntologyResult<Vec<String>> {
        let mut seen = std::collections::HashSet::new();
        let mut terms = Vec::new();
        for gene in genes {
            for term in self.strings(schema::SELECT_GENE_TERMS, [gene.as_str()])? {
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }
        }
        Ok(terms)
    }

    /// Returns the IDs of the direct parents of a term
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn parent_ids(&self, id: &str) -> OntologyResult<Vec<String>> {
        self.strings(schema::SELECT_PARENTS, [id])
    }

    /// Returns the IDs of the direct children of a term
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn child_ids(&self, id: &str) -> OntologyResult<Vec<String>> {
        self.strings(schema::SELECT_CHILDREN, [id])
    }

    /// The number of rows in `terms`
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn num_terms(&self) -> OntologyResult<u64> {
        self.count(schema::COUNT_TERMS, [])
    }

    /// The number of rows in `relationships`
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn num_relationships(&self) -> OntologyResult<u64> {
        self.count(schema::COUNT_RELATIONSHIPS, [])
    }

    /// The number of rows in `gene_terms`
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn num_gene_terms(&self) -> OntologyResult<u64> {
        self.count(schema::COUNT_GENE_TERMS, [])
    }

    /// The number of rows in `snp_terms`
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn num_snp_terms(&self) -> OntologyResult<u64> {
        self.count(schema::COUNT_SNP_TERMS, [])
    }

    /// The number of distinct genes associated to any term
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn num_genes(&self) -> OntologyResult<u64> {
        self.count(schema::COUNT_DISTINCT_GENES, [])
    }

    /// Stores a [`Term`] with all its genes and loci in one transaction
    ///
    /// If `overwrite` is `true`, all rows of a term with the same ID are deleted
    /// first. Otherwise the metadata is replaced and the memberships are appended.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures. No changes
    /// are persisted in this case.
    pub fn write_term(&mut self, term: &Term, overwrite: bool) -> OntologyResult<()> {
        let tx = self.conn.transaction()?;
        {
            if overwrite {
                tx.execute(schema::DELETE_TERM, [term.id()])?;
                tx.execute(schema::DELETE_GENE_TERMS, [term.id()])?;
                tx.execute(schema::DELETE_SNP_TERMS, [term.id()])?;
            }
            tx.execute(
                schema::REPLACE_TERM,
                params![term.id(), term.name(), term.term_type(), term.desc()],
            )?;
            let mut genes = tx.prepare_cached(schema::INSERT_GENE_TERM)?;
            for gene in term.genes() {
                genes.execute(params![gene.id().as_str(), term.id()])?;
            }
            let mut snps = tx.prepare_cached(schema::INSERT_SNP_TERM)?;
            for snp in term.snps() {
                snps.execute(params![snp.chrom(), pos_to_sql(snp.pos())?, term.id()])?;
            }
        }
        tx.commit()?;
        debug!("Stored {}", term);
        Ok(())
    }

    /// Deletes all rows of a term from `terms`, `gene_terms` and `snp_terms`
    ///
    /// Relationships of the term are kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures. No changes
    /// are persisted in this case.
    pub fn delete_term(&mut self, id: &str) -> OntologyResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(schema::DELETE_TERM, [id])?;
        tx.execute(schema::DELETE_GENE_TERMS, [id])?;
        tx.execute(schema::DELETE_SNP_TERMS, [id])?;
        tx.commit()?;
        debug!("Deleted term {}", id);
        Ok(())
    }

    /// Appends all rows of an [`ImportBatch`] in one transaction
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures, e.g.
    /// if a term ID already exists. Nothing of the batch is persisted in this case.
    pub fn import(&mut self, batch: &ImportBatch) -> OntologyResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut terms = tx.prepare_cached(schema::INSERT_TERM)?;
            for term in &batch.terms {
                terms.execute(params![term.id, term.name, term.term_type, term.desc])?;
            }
            let mut relationships = tx.prepare_cached(schema::INSERT_RELATIONSHIP)?;
            for rel in &batch.relationships {
                relationships.execute(params![rel.term, rel.is_a])?;
            }
            let mut gene_terms = tx.prepare_cached(schema::INSERT_GENE_TERM)?;
            for gene_term in &batch.gene_terms {
                gene_terms.execute(params![gene_term.gene.as_str(), gene_term.term])?;
            }
        }
        tx.commit()?;
        info!(
            "Inserted {} terms, {} relationships and {} gene-term pairs",
            batch.terms.len(),
            batch.relationships.len(),
            batch.gene_terms.len()
        );
        Ok(())
    }

    fn strings<P: rusqlite::Params>(&self, sql: &str, params: P) -> OntologyResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let mut res = Vec::new();
        for value in rows {
            res.push(value?);
        }
        Ok(res)
    }

    fn count<P: rusqlite::Params>(&self, sql: &str, params: P) -> OntologyResult<u64> {
        let n: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(u64::try_from(n).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, n))?)
    }
}

fn pos_to_sql(pos: u64) -> rusqlite::Result<i64> {
    i64::try_from(pos).map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::Gene;

    fn store() -> TermStore {
        let store = TermStore::in_memory().unwrap();
        store.create_tables().unwrap();
        store
    }

    fn term(id: &str) -> Term {
        Term::with_members(
            id,
            "Name",
            "Type",
            "Desc",
            vec![Gene::new("G1", "1", 1, 2), Gene::new("G2", "1", 3, 4)],
            vec![Locus::new("1", 10)],
        )
    }

    #[test]
    fn create_tables_is_idempotent() {
        let store = store();
        store.create_tables().unwrap();
        assert_eq!(store.num_terms().unwrap(), 0);
    }

    #[test]
    fn indices_are_built_on_demand() {
        let store = store();
        assert!(!store.has_indices().unwrap());
        store.build_indices().unwrap();
        store.build_indices().unwrap();
        assert!(store.has_indices().unwrap());
    }

    #[test]
    fn open_existing_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terms.db");
        assert!(TermStore::open_existing(&path).is_err());
        assert!(!path.exists());

        TermStore::open(&path).unwrap().create_tables().unwrap();
        let store = TermStore::open_existing(&path).unwrap();
        assert_eq!(store.num_terms().unwrap(), 0);
    }

    #[test]
    fn globals() {
        let store = store();
        assert!(store.global("refgen").unwrap().is_none());
        store.set_global("refgen", "Zm5b").unwrap();
        store.set_global("refgen", "Zm5bFGS").unwrap();
        assert_eq!(store.global("refgen").unwrap().unwrap(), "Zm5bFGS");
    }

    #[test]
    fn missing_term_is_none() {
        let store = store();
        assert!(store.term_record("foo").unwrap().is_none());
        assert!(store.term_gene_ids("foo").unwrap().is_empty());
    }

    #[test]
    fn overwrite_does_not_duplicate_rows() {
        let mut store = store();
        store.write_term(&term("T1"), true).unwrap();
        store.write_term(&term("T1"), true).unwrap();
        assert_eq!(store.num_terms().unwrap(), 1);
        assert_eq!(store.num_gene_terms().unwrap(), 2);
        assert_eq!(store.num_snp_terms().unwrap(), 1);
    }

    #[test]
    fn write_without_overwrite_appends_members() {
        let mut store = store();
        store.write_term(&term("T1"), false).unwrap();
        store.write_term(&term("T1"), false).unwrap();
        assert_eq!(store.num_terms().unwrap(), 1);
        assert_eq!(store.num_gene_terms().unwrap(), 4);
        assert_eq!(store.num_genes().unwrap(), 2);
    }

    #[test]
    fn delete_keeps_relationships() {
        let mut store = store();
        store.write_term(&term("T1"), true).unwrap();
        store.write_term(&term("T2"), true).unwrap();
        store
            .import(&ImportBatch {
                relationships: vec![Relationship::new("T1", "T2")],
                ..Default::default()
            })
            .unwrap();

        store.delete_term("T1").unwrap();
        assert!(store.term_record("T1").unwrap().is_none());
        assert!(store.term_gene_ids("T1").unwrap().is_empty());
        assert!(store.term_snps("T1").unwrap().is_empty());
        assert!(store.term_record("T2").is_ok_and(|t| t.is_some()));
        assert_eq!(store.term_gene_ids("T2").unwrap().len(), 2);
        assert_eq!(store.num_relationships().unwrap(), 1);
        assert_eq!(store.parent_ids("T1").unwrap(), vec!["T2".to_string()]);
    }

    #[test]
    fn failed_import_is_rolled_back() {
        let mut store = store();
        let batch = ImportBatch {
            terms: vec![
                TermRecord::new("T1", "a", "", ""),
                TermRecord::new("T1", "b", "", ""),
            ],
            relationships: vec![Relationship::new("T1", "T0")],
            gene_terms: vec![GeneTerm::new("G1", "T1")],
        };
        assert!(store.import(&batch).is_err());
        assert_eq!(store.num_terms().unwrap(), 0);
        assert_eq!(store.num_relationships().unwrap(), 0);
        assert_eq!(store.num_gene_terms().unwrap(), 0);
    }

    #[test]
    fn terms_for_genes_are_distinct() {
        let mut store = store();
        store
            .import(&ImportBatch {
                gene_terms: vec![
                    GeneTerm::new("G1", "T1"),
                    GeneTerm::new("G1", "T2"),
                    GeneTerm::new("G2", "T1"),
                    GeneTerm::new("G3", "T3"),
                ],
                ..Default::default()
            })
            .unwrap();
        let terms = store
            .term_ids_for_genes(&["G2".into(), "G1".into()])
            .unwrap();
        assert_eq!(terms, vec!["T1".to_string(), "T2".to_string()]);
        assert_eq!(store.num_genes().unwrap(), 3);
    }

    #[test]
    fn like_patterns() {
        let mut store = store();
        store
            .import(&ImportBatch {
                terms: vec![
                    TermRecord::new("GO:0001", "cell growth", "biological_process", ""),
                    TermRecord::new("GO:0002", "cell death", "biological_process", ""),
                    TermRecord::new("PO:0001", "leaf", "plant_anatomy", ""),
                ],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.term_ids_like("GO:%").unwrap().len(), 2);
        assert_eq!(
            store.term_ids_with_name_like("%death").unwrap(),
            vec!["GO:0002".to_string()]
        );
        assert_eq!(
            store.term_ids_by_type("plant_anatomy").unwrap(),
            vec!["PO:0001".to_string()]
        );
    }
}
