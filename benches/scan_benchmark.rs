//! Benchmarks for block scanning and document assembly.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic Markdown documents mixing every block kind.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docbridge::parser::{BlockScanner, ParseOptions, ParserRegistry, ScanOptions};
use docbridge::ResourceRegistry;

/// Creates a synthetic document with the given number of sections.
fn create_test_markdown(sections: usize) -> String {
    let mut content = String::from("---\ntitle: Benchmark\ntags: [bench, synthetic]\n---\n");

    for i in 0..sections {
        content.push_str(&format!("## Section {}\n\n", i + 1));
        content.push_str("Paragraph text with **bold**, `code` and a [link](https://example.com).\n");
        content.push_str("It continues on a second line.\n\n");
        content.push_str("- first item\n  - nested item\n- second item\n\n");
        content.push_str("| key | value |\n|-----|------:|\n| a | 1 |\n| b | 2 |\n\n");
        content.push_str(&format!("```rust\nfn section_{}() {{}}\n```\n\n", i));
        content.push_str("```mermaid\ngraph TD\nA-->B\n```\n\n");
        content.push_str(&format!("![figure](img/fig_{}.png)\n\n", i % 4));
    }

    content
}

/// Benchmark the scanner alone.
fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for sections in [10, 100, 500].iter() {
        let text = create_test_markdown(*sections);
        let scanner = BlockScanner::new(ScanOptions::default());

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| scanner.scan(black_box(&text), 0));
        });
    }

    group.finish();
}

/// Benchmark the full pipeline including asset registration.
fn bench_pipeline(c: &mut Criterion) {
    let parsers = ParserRegistry::with_defaults();
    let options = ParseOptions::default();
    let text = create_test_markdown(100);

    c.bench_function("parse_markdown_100_sections", |b| {
        b.iter(|| {
            let mut registry = ResourceRegistry::in_memory();
            parsers
                .parse("md", black_box(text.as_bytes()), &options, &mut registry)
                .unwrap()
        });
    });
}

/// Benchmark prose diagram heuristics on plain text.
fn bench_prose_diagrams(c: &mut Criterion) {
    let parsers = ParserRegistry::with_defaults();
    let options = ParseOptions::default();
    let mut text = String::from("Design notes\n\n");
    for i in 0..200 {
        text.push_str(&format!("Step {} describes the flow.\n\nDiagram:\ngraph LR\nA{}-->B{}\n\n", i, i, i));
    }

    c.bench_function("parse_text_prose_diagrams", |b| {
        b.iter(|| {
            let mut registry = ResourceRegistry::in_memory();
            parsers
                .parse("txt", black_box(text.as_bytes()), &options, &mut registry)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_scanner, bench_pipeline, bench_prose_diagrams);
criterion_main!(benches);
