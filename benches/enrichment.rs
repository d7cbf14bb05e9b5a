use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ontogene::{EnrichmentOptions, Gene, MemoryRefGen, Ontology, Term};

const NUM_GENES: u64 = 5_000;
const NUM_TERMS: u64 = 500;

/// Builds an ontology where every term contains every 7th gene,
/// starting at a term-specific offset
fn ontology() -> (Ontology<MemoryRefGen>, Vec<Gene>) {
    let mut refgen = MemoryRefGen::new("bench");
    for i in 0..NUM_GENES {
        refgen.add_gene(Gene::new(format!("G{i}"), "1", i * 2_000, i * 2_000 + 1_000));
    }
    let genes: Vec<Gene> = refgen.iter().cloned().collect();

    let mut ontology = Ontology::in_memory(refgen).expect("in-memory database");
    for t in 0..NUM_TERMS {
        let members = genes
            .iter()
            .skip((t * 3 % 7) as usize)
            .step_by(7)
            .take(20 + (t % 50) as usize)
            .cloned();
        let term = Term::with_members(&format!("T{t}"), "bench", "bench", "", members, vec![]);
        ontology.add_term(&term, false).expect("term is added");
    }
    ontology.build_indices().expect("indices are built");
    (ontology, genes)
}

fn enrichment_benchmark(c: &mut Criterion) {
    let (ontology, genes) = ontology();
    let candidates: Vec<Gene> = genes.iter().step_by(11).take(200).cloned().collect();
    let options = EnrichmentOptions::default();

    c.bench_function("term enrichment", |b| {
        b.iter(|| {
            ontology
                .enrichment(black_box(&candidates), &options)
                .expect("enrichment succeeds")
                .len()
        })
    });

    c.bench_function("iterate terms", |b| {
        b.iter(|| ontology.iter_terms().expect("term ids are queried").count())
    });
}

criterion_group! {
    name = enrichment;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = enrichment_benchmark
}
criterion_main!(enrichment);
