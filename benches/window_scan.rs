//! Window Scan Benchmarks
//!
//! Measures the brute-force fingerprint scan and the normalizer over
//! book-sized inputs.
//!
//! Run with: `cargo bench --bench window_scan`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use marginalia::anchor::{extract_context, find_by_fingerprint, fingerprint, normalize};

const PARAGRAPH: &str = "It was a bright cold day in April, and the clocks were striking \
thirteen. Winston Smith, his chin nuzzled into his breast in an effort to escape the \
vile wind, slipped quickly through the glass doors of Victory Mansions.\n\n";

fn document(paragraphs: usize) -> String {
    let mut text = String::with_capacity(PARAGRAPH.len() * paragraphs + 64);
    for _ in 0..paragraphs {
        text.push_str(PARAGRAPH);
    }
    text.push_str("The last line of the book, found only at the very end.");
    text
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_by_fingerprint");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for paragraphs in [10usize, 100, 1_000] {
        let text = document(paragraphs);
        let chars = text.chars().count();

        // Worst case: the only match is the final window
        let ctx = extract_context(&text, chars - 30, chars, 0).unwrap();
        let fp = fingerprint(&ctx.selected_text, &ctx.context_before, &ctx.context_after);

        group.bench_with_input(
            BenchmarkId::new("match_at_end", paragraphs),
            &text,
            |b, text| b.iter(|| find_by_fingerprint(black_box(&fp), black_box(text), 10)),
        );

        let absent = fingerprint("never appears in this document", "", "");
        group.bench_with_input(BenchmarkId::new("absent", paragraphs), &text, |b, text| {
            b.iter(|| find_by_fingerprint(black_box(&absent), black_box(text), 10))
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let text = document(1_000);
    c.bench_function("normalize_book", |b| b.iter(|| normalize(black_box(&text))));
}

criterion_group!(benches, bench_scan, bench_normalize);
criterion_main!(benches);
