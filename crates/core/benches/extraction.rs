use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gleaner_core::{Document, extract_by_selector, extract_heuristic, keyword_frequency, parse_keywords};

fn bench_parse(c: &mut Criterion) {
    let small = std::fs::read_to_string("../../tests/fixtures/unicode_heavy.html").unwrap();
    let medium = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("small", "unicode"), &small, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("medium", "article"), &medium, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_heuristic(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let doc = Document::parse(&html);

    c.bench_function("heuristic_extraction", |b| b.iter(|| extract_heuristic(black_box(&doc))));
}

fn bench_selector(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let doc = Document::parse(&html);

    c.bench_function("selector_extraction", |b| {
        b.iter(|| extract_by_selector(black_box(&doc), black_box("a.story")))
    });
}

fn bench_keyword_frequency(c: &mut Criterion) {
    let texts: Vec<String> = (0..5_000)
        .map(|i| format!("row {} mentions rust, ownership and borrowing in passing", i))
        .collect();
    let keywords = parse_keywords("rust, ownership, borrow, missing");

    c.bench_function("keyword_frequency", |b| {
        b.iter(|| keyword_frequency(texts.iter().map(String::as_str), black_box(&keywords)))
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_heuristic,
    bench_selector,
    bench_keyword_frequency
);
criterion_main!(benches);
