//! Genes and genomic loci are the members of ontology terms
//!
//! This module contains the value types that terms are built from:
//! - [`Gene`]s, identified by a [`GeneId`] and placed on the genome by
//!   their chromosome and start/end coordinates
//! - [`Locus`]es (SNPs), identified only by chromosome and position
//!
//! Both are hashed and compared by their identity only, so that a [`Genes`]
//! set or a [`Loci`] set never contains the same gene or locus twice, even when
//! the source data repeats it.

mod gene;
mod locus;

pub use gene::{Gene, GeneId, GeneIds, Genes};
pub use locus::{Locus, Loci};
