//! Benchmarks for per-line feature extraction, keyword extraction and
//! threshold computation at varying document sizes.
//!
//! Run with: `cargo bench --bench scoring_bench`

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pagelight::highlight::{
    compute_features, compute_thresholds, extract_topic_keywords, KeywordConfig, ThresholdConfig,
};

const SENTENCES: &[&str] = &[
    "The French Revolution began in 1789 with the storming of the Bastille.",
    "The Revolution abolished the monarchy and declared a republic in France.",
    "Maximilien Robespierre led the Committee of Public Safety during the Terror.",
    "Economic crisis and social inequality fuelled the political movement.",
    "The Revolution ended when Napoleon Bonaparte seized power in 1799.",
    "I really like pizza on Fridays with my friends.",
];

/// A document of `n` lines cycling through the sample sentences.
fn generate_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| SENTENCES[i % SENTENCES.len()].to_string())
        .collect()
}

fn bench_features(c: &mut Criterion) {
    let keywords: Vec<String> = ["revolution", "monarchy", "republic", "political"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let nouns: BTreeSet<String> = ["Napoleon Bonaparte", "Robespierre", "France", "Bastille"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

    let mut group = c.benchmark_group("compute_features");
    for &n in &[10usize, 100, 500] {
        let lines = generate_lines(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &lines, |b, lines| {
            b.iter(|| {
                for line in lines {
                    black_box(compute_features(black_box(line), &keywords, &nouns));
                }
            });
        });
    }
    group.finish();
}

fn bench_keywords(c: &mut Criterion) {
    let config = KeywordConfig::default();
    let mut group = c.benchmark_group("extract_topic_keywords");
    for &n in &[10usize, 100, 500] {
        let text = generate_lines(n).join(" ");
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| black_box(extract_topic_keywords(black_box(text), &config)));
        });
    }
    group.finish();
}

fn bench_thresholds(c: &mut Criterion) {
    let config = ThresholdConfig::default();
    let mut group = c.benchmark_group("compute_thresholds");
    for &n in &[100usize, 1_000, 10_000] {
        let scores: Vec<f64> = (0..n).map(|i| (i * 7919 % 1000) as f64 / 1000.0).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &scores, |b, scores| {
            b.iter(|| black_box(compute_thresholds(black_box(scores), &config)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_features, bench_keywords, bench_thresholds);
criterion_main!(benches);
