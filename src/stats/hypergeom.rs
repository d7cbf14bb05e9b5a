//! Hypergeometric enrichment of ontology terms in a gene list
//!
//! For every term that contains at least one gene of the list:
//!
//! | | |
//! | --- | --- |
//! | population (`N`, `LenTotal`) | distinct genes associated to any term |
//! | successes (`K`, `LenTerm`) | distinct genes of the term, after the gene filter |
//! | draws (`n`, `LenList`) | distinct genes in the gene list |
//! | observed (`k`, `LenOverlap`) | genes of the list that belong to the term |
//!
//! The p-value is the probability of observing `k` **or more** term genes,
//! i.e. the survival function at `k - 1`.
//!
//! The gene filter restricts the term genes only, the population is always
//! the unfiltered set of all annotated genes.
//!
//! # Examples
//!
//! ```
//! use ontogene::{EnrichmentOptions, Gene, MemoryRefGen, Ontology, Term};
//!
//! let mut refgen = MemoryRefGen::new("test");
//! for i in 0..10 {
//!     refgen.add_gene(Gene::new(format!("G{i}"), "1", i * 1_000, i * 1_000 + 500));
//! }
//! let genes: Vec<Gene> = refgen.iter().cloned().collect();
//!
//! let mut ontology = Ontology::in_memory(refgen).unwrap();
//! ontology.add_term(&Term::with_members("T1", "first", "", "", genes[0..4].to_vec(), vec![]), true).unwrap();
//! ontology.add_term(&Term::with_members("T2", "second", "", "", genes[4..10].to_vec(), vec![]), true).unwrap();
//!
//! let enrichment = ontology
//!     .enrichment(&genes[0..3], &EnrichmentOptions::default())
//!     .unwrap();
//!
//! assert_eq!(enrichment.len(), 1);
//! let row = enrichment.iter().next().unwrap();
//! assert_eq!(row.term_id(), "T1");
//! assert_eq!(row.len_overlap(), 3);
//! assert!(row.pvalue() < 0.05);
//! ```

use std::collections::HashSet;

use statrs::distribution::{DiscreteCDF, Hypergeometric};
use tracing::{debug, info, warn};

use crate::annotations::{Gene, GeneId, GeneIds};
use crate::stats::{EnrichmentOptions, EnrichmentTable, TermEnrichment};
use crate::store::TermStore;
use crate::OntologyResult;

/// Calculates the hypergeometric enrichment of all terms containing any of `genes`
///
/// Only terms with a p-value less than or equal to the cutoff of `options`
/// are returned, sorted by ascending p-value. Terms with equal p-values keep
/// the order in which they were found.
///
/// A term that is associated to genes but has no metadata is skipped.
///
/// # Errors
///
/// Returns [`crate::OntologyError::Storage`] on database failures
pub fn term_enrichment(
    store: &TermStore,
    genes: &[Gene],
    options: &EnrichmentOptions,
) -> OntologyResult<EnrichmentTable> {
    let mut seen = HashSet::new();
    let gene_ids: Vec<GeneId> = genes
        .iter()
        .map(|gene| gene.id().clone())
        .filter(|id| seen.insert(id.clone()))
        .collect();
    let gene_list: GeneIds = seen;

    let terms = store.term_ids_for_genes(&gene_ids)?;
    if terms.is_empty() {
        info!("No enrichment for {} genes", gene_ids.len());
        return Ok(EnrichmentTable::default());
    }

    let population = store.num_genes()?;
    let draws = gene_list.len() as u64;

    let mut rows = Vec::with_capacity(terms.len());
    for term_id in terms {
        let Some(record) = store.term_record(&term_id)? else {
            warn!("No information for ontology term {}", term_id);
            continue;
        };

        let term_genes: GeneIds = store
            .term_gene_ids(&term_id)?
            .into_iter()
            .filter(|gene| options.filter().map_or(true, |filter| filter.contains(gene)))
            .collect();
        let successes = term_genes.len() as u64;

        let mut overlap: Vec<GeneId> = term_genes.intersection(&gene_list).cloned().collect();
        overlap.sort();
        let observed = overlap.len() as u64;

        let Some(pvalue) = survival(population, successes, draws, observed) else {
            warn!(
                "Invalid parameters for term {}: Population: {}, Successes: {}, Draws: {}",
                term_id, population, successes, draws
            );
            continue;
        };
        debug!(
            "Term:{}\tPopulation: {}, Successes: {}, Draws: {}, Observed: {}",
            term_id, population, successes, draws, observed
        );

        rows.push(TermEnrichment {
            term_id: record.id,
            name: record.name,
            pvalue,
            len_term: successes,
            len_overlap: observed,
            len_list: draws,
            len_total: population,
            term_type: record.term_type,
            term_genes: overlap,
            desc: record.desc,
            label: options.get_label().map(str::to_string),
        });
    }

    // stable sort keeps the discovery order for equal p-values
    rows.sort_by(|a, b| a.pvalue.total_cmp(&b.pvalue));
    rows.retain(|row| row.pvalue <= options.cutoff());

    Ok(EnrichmentTable { rows })
}

/// Returns the probability of observing `observed` or more successes
///
/// Returns `None` if the term or the gene list is larger than the population
fn survival(population: u64, successes: u64, draws: u64, observed: u64) -> Option<f64> {
    let hyper = Hypergeometric::new(population, successes, draws).ok()?;
    if observed == 0 {
        return Some(1.0);
    }
    // subtracting 1, because we want to test including observed
    // e.g. "7 or more", but sf by default calculates "more than 7"
    Some(hyper.sf(observed - 1))
}
