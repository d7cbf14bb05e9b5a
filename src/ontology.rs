//! The [`Ontology`] ties the term storage, the importers and the enrichment together
//!
//! Terms are read from the [`TermStore`] and rebuilt with the genes of the
//! ontology's [`RefGen`].

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::annotations::Gene;
use crate::parser::{self, GeneTermFormat};
use crate::refgen::RefGen;
use crate::stats::hypergeom::term_enrichment;
use crate::stats::{EnrichmentOptions, EnrichmentTable};
use crate::store::{ImportBatch, TermRecord, TermStore};
use crate::term::Term;
use crate::OntologyResult;

/// The global key under which the name of the reference genome is stored
const REFGEN_KEY: &str = "refgen";

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` is the main interface of the `ontogene` crate
///
/// An [`Ontology`] is a collection of [`Term`]s. Each term is a collection of
/// genes and loci. Terms can be nested within each other, but don't have to be.
///
/// The terms are persisted in a [`TermStore`] and reconstructed on demand.
/// Gene IDs found in storage are turned into full [`Gene`]s by the
/// reference genome ([`RefGen`]) of the ontology.
///
/// # Examples
///
/// ```
/// use ontogene::{Gene, Locus, MemoryRefGen, Ontology, Term};
///
/// let mut refgen = MemoryRefGen::new("Zm5b");
/// refgen.add_gene(Gene::new("G1", "1", 1_000, 2_000));
/// refgen.add_gene(Gene::new("G2", "1", 5_000, 6_000));
///
/// let mut ontology = Ontology::in_memory(refgen).unwrap();
///
/// let mut term = Term::new("GO:0008150", "biological_process", "biological_process", "");
/// term.add_gene(Gene::new("G1", "1", 1_000, 2_000));
/// term.add_snp(Locus::new("1", 1_500));
/// ontology.add_term(&term, true).unwrap();
///
/// let stored = ontology.term("GO:0008150").unwrap().unwrap();
/// assert_eq!(stored.len(), 1);
/// assert_eq!(stored.snps().len(), 1);
///
/// // missing terms are not an error
/// assert!(ontology.term("GO:9999999").unwrap().is_none());
///
/// for term in ontology.iter_terms().unwrap() {
///     println!("{}", term.unwrap());
/// }
/// ```
///
/// # Construction
///
/// 1. Create a new database with [`Ontology::create`] (or [`Ontology::in_memory`]),
///    which records the name of the reference genome.
/// 2. Import terms from external files
///     - [`Ontology::import_obo`] for OBO files, e.g. the Gene Ontology.
///       This also builds the lookup indices.
///     - [`Ontology::import_mapman`] for MapMan exports
///     - [`Ontology::import_gene_terms`] to connect genes to existing terms
/// 3. Or add single terms with [`Ontology::add_term`]
///
/// Existing databases are opened with [`Ontology::open`].
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     TERMS ||--o{ RELATIONSHIPS : is_a
///     TERMS ||--o{ GENE_TERMS : contains
///     TERMS ||--o{ SNP_TERMS : contains
///     TERMS {
///         str id
///         str name
///         str type
///         str desc
///     }
///     RELATIONSHIPS {
///         str term
///         str is_a
///     }
///     GENE_TERMS {
///         str gene
///         str term
///     }
///     SNP_TERMS {
///         str chrom
///         int pos
///         str term
///     }
/// ```
#[derive(Debug)]
pub struct Ontology<R> {
    store: TermStore,
    refgen: R,
}

impl<R: RefGen> Ontology<R> {
    /// Creates a new ontology database at `path` for the reference genome `refgen`
    ///
    /// Existing tables are kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the database cannot be created
    pub fn create<P: AsRef<Path>>(path: P, refgen: R) -> OntologyResult<Self> {
        Self::initialize(TermStore::open(path)?, refgen)
    }

    /// Creates a new ontology that lives in memory only
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the database cannot be created
    pub fn in_memory(refgen: R) -> OntologyResult<Self> {
        Self::initialize(TermStore::in_memory()?, refgen)
    }

    fn initialize(store: TermStore, refgen: R) -> OntologyResult<Self> {
        store.create_tables()?;
        store.set_global(REFGEN_KEY, refgen.name())?;
        Ok(Self { store, refgen })
    }

    /// Opens an existing ontology database
    ///
    /// A warning is logged if the database was created for a different
    /// reference genome.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the database cannot be
    /// opened or was never created
    pub fn open<P: AsRef<Path>>(path: P, refgen: R) -> OntologyResult<Self> {
        let store = TermStore::open_existing(path)?;
        match store.global(REFGEN_KEY)? {
            None => warn!("RefGen not assigned"),
            Some(name) if name != refgen.name() => warn!(
                "Ontology was created for RefGen {}, not {}",
                name,
                refgen.name()
            ),
            Some(_) => (),
        }
        Ok(Self { store, refgen })
    }

    /// The reference genome used to resolve genes
    pub fn refgen(&self) -> &R {
        &self.refgen
    }

    /// The underlying [`TermStore`]
    pub fn store(&self) -> &TermStore {
        &self.store
    }

    /// Returns the number of terms
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn len(&self) -> OntologyResult<u64> {
        self.store.num_terms()
    }

    /// Returns `true` if the ontology contains no terms
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn is_empty(&self) -> OntologyResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a one-line overview of the ontology
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn summary(&self) -> OntologyResult<String> {
        Ok(format!(
            "Ontology: contains {} terms and {} relationships for {}",
            self.len()?,
            self.store.num_relationships()?,
            self.refgen.name()
        ))
    }

    /// Returns the [`Term`] with the given ID, `None` if it does not exist
    ///
    /// The term contains all genes and loci. Genes that are unknown
    /// to the reference genome are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term(&self, id: &str) -> OntologyResult<Option<Term>> {
        match self.store.term_record(id)? {
            Some(record) => Ok(Some(self.hydrate(record)?)),
            None => Ok(None),
        }
    }

    /// Returns all terms with an ID matching the SQL `LIKE` pattern
    ///
    /// Every matching term is fully reconstructed, so broad patterns are expensive.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids(&self, pattern: &str) -> OntologyResult<Vec<Term>> {
        self.terms_from_ids(self.store.term_ids_like(pattern)?)
    }

    /// Returns all terms with a name matching the SQL `LIKE` pattern
    ///
    /// Every matching term is fully reconstructed, so broad patterns are expensive.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_names(&self, pattern: &str) -> OntologyResult<Vec<Term>> {
        self.terms_from_ids(self.store.term_ids_with_name_like(pattern)?)
    }

    /// Returns all terms of the given type, e.g. `biological_process`
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn terms_by_type(&self, term_type: &str) -> OntologyResult<Vec<Term>> {
        self.terms_from_ids(self.store.term_ids_by_type(term_type)?)
    }

    /// Returns the IDs of all terms of the given type, without hydrating them
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn term_ids_by_type(&self, term_type: &str) -> OntologyResult<Vec<String>> {
        self.store.term_ids_by_type(term_type)
    }

    /// Returns an iterator of all terms, in storage order
    ///
    /// Terms are reconstructed one at a time while iterating.
    /// Every call starts a new iteration from the current state of the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] if the term IDs cannot be queried
    pub fn iter_terms(&self) -> OntologyResult<Terms<'_, R>> {
        Ok(Terms {
            ids: self.store.term_ids()?.into_iter(),
            ontology: self,
        })
    }

    /// Returns all terms
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn terms(&self) -> OntologyResult<Vec<Term>> {
        self.iter_terms()?.collect()
    }

    /// Returns the IDs of the direct parents (`is_a`) of a term
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn parent_ids(&self, id: &str) -> OntologyResult<Vec<String>> {
        self.store.parent_ids(id)
    }

    /// Returns the IDs of the direct children of a term
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn child_ids(&self, id: &str) -> OntologyResult<Vec<String>> {
        self.store.child_ids(id)
    }

    /// Adds a single term with all its genes and loci
    ///
    /// If `overwrite` is `true`, a term with the same ID is replaced completely.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures.
    /// The ontology is not modified in this case.
    pub fn add_term(&mut self, term: &Term, overwrite: bool) -> OntologyResult<()> {
        self.store.write_term(term, overwrite)
    }

    /// Removes a term with all its genes and loci
    ///
    /// # Note
    ///
    /// The `is_a` relationships of the term are **not** removed, other terms
    /// may still point to the deleted term.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures.
    /// The ontology is not modified in this case.
    pub fn del_term(&mut self, term: &Term) -> OntologyResult<()> {
        self.store.delete_term(term.id())
    }

    /// Calculates which terms are enriched in `genes`
    ///
    /// See [`crate::stats::hypergeom`] for details.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn enrichment(
        &self,
        genes: &[Gene],
        options: &EnrichmentOptions,
    ) -> OntologyResult<EnrichmentTable> {
        term_enrichment(&self.store, genes, options)
    }

    /// Builds the lookup indices of the store
    ///
    /// # Errors
    ///
    /// Returns [`crate::OntologyError::Storage`] on database failures
    pub fn build_indices(&self) -> OntologyResult<()> {
        self.store.build_indices()
    }

    /// Imports gene/term pairs from a delimited file
    ///
    /// The terms themselves are not created, they must be imported separately.
    ///
    /// # Errors
    ///
    /// - [`crate::OntologyError::CannotOpenFile`] if the file is missing
    /// - [`crate::OntologyError::InvalidInput`] or [`crate::OntologyError::InvalidPattern`]
    ///   if the `format` is invalid
    /// - [`crate::OntologyError::Storage`] on database failures. Nothing is imported in this case.
    pub fn import_gene_terms<P: AsRef<Path>>(
        &mut self,
        file: P,
        format: &GeneTermFormat,
    ) -> OntologyResult<()> {
        info!("Reading in term file {}", file.as_ref().display());
        self.import_gene_terms_from(parser::open(file)?, format)
    }

    /// Imports gene/term pairs from a delimited source, see [`Ontology::import_gene_terms`]
    ///
    /// # Errors
    ///
    /// See [`Ontology::import_gene_terms`]
    pub fn import_gene_terms_from<B: BufRead>(
        &mut self,
        reader: B,
        format: &GeneTermFormat,
    ) -> OntologyResult<()> {
        let batch = ImportBatch {
            gene_terms: parser::gene_terms::parse(reader, format)?,
            ..Default::default()
        };
        self.store.import(&batch)
    }

    /// Imports terms and relationships from an OBO file and builds the indices
    ///
    /// # Errors
    ///
    /// - [`crate::OntologyError::CannotOpenFile`] if the file is missing
    /// - [`crate::OntologyError::Storage`] on database failures, e.g. if a term
    ///   already exists. Nothing is imported in this case.
    pub fn import_obo<P: AsRef<Path>>(&mut self, file: P) -> OntologyResult<()> {
        info!("Importing OBO: {}", file.as_ref().display());
        self.import_obo_from(parser::open(file)?)
    }

    /// Imports an OBO source, see [`Ontology::import_obo`]
    ///
    /// # Errors
    ///
    /// See [`Ontology::import_obo`]
    pub fn import_obo_from<B: BufRead>(&mut self, reader: B) -> OntologyResult<()> {
        let batch = parser::obo::parse(reader)?;
        self.store.import(&batch)?;
        self.store.build_indices()
    }

    /// Imports bins, their hierarchy and genes from a MapMan export
    ///
    /// The indices are not built, use [`Ontology::build_indices`] afterwards.
    ///
    /// # Errors
    ///
    /// - [`crate::OntologyError::CannotOpenFile`] if the file is missing
    /// - [`crate::OntologyError::Storage`] on database failures, e.g. if a term
    ///   already exists. Nothing is imported in this case.
    pub fn import_mapman<P: AsRef<Path>>(&mut self, file: P) -> OntologyResult<()> {
        info!("Importing MapMan text file: {}", file.as_ref().display());
        self.import_mapman_from(parser::open(file)?)
    }

    /// Imports a MapMan source, see [`Ontology::import_mapman`]
    ///
    /// # Errors
    ///
    /// See [`Ontology::import_mapman`]
    pub fn import_mapman_from<B: BufRead>(&mut self, reader: B) -> OntologyResult<()> {
        let batch = parser::mapman::parse(reader)?;
        self.store.import(&batch)
    }

    fn hydrate(&self, record: TermRecord) -> OntologyResult<Term> {
        let gene_ids = self.store.term_gene_ids(&record.id)?;
        let genes = self.refgen.from_ids(&gene_ids);
        if genes.len() < gene_ids.len() {
            debug!(
                "{} of {} genes of {} are not in {}",
                gene_ids.len() - genes.len(),
                gene_ids.len(),
                record.id,
                self.refgen.name()
            );
        }
        let snps = self.store.term_snps(&record.id)?;
        Ok(Term::with_members(
            &record.id,
            &record.name,
            &record.term_type,
            &record.desc,
            genes,
            snps,
        ))
    }

    fn terms_from_ids(&self, ids: Vec<String>) -> OntologyResult<Vec<Term>> {
        let mut terms = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(term) = self.term(&id)? {
                terms.push(term);
            }
        }
        Ok(terms)
    }
}

/// An iterator of [`Term`]s
///
/// Created by [`Ontology::iter_terms`]
pub struct Terms<'a, R> {
    ids: std::vec::IntoIter<String>,
    ontology: &'a Ontology<R>,
}

impl<R: RefGen> Iterator for Terms<'_, R> {
    type Item = OntologyResult<Term>;
    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            match self.ontology.term(&id) {
                Ok(Some(term)) => return Some(Ok(term)),
                // deleted since the iteration started
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}
