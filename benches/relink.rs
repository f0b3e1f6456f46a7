//! Benchmarks for the relinking passes.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use footcite::Document;
use footcite::notes::{AppendixOptions, build_appendix, relabel_markers, rewrite_hrefs};

const NOTE: &str = include_str!("../tests/fixtures/mixed_note.html");

/// A long note: `n` paragraphs with alternating footnote and citation
/// markers and one mixed list at the end.
fn long_note(n: usize) -> String {
    let mut body = String::new();
    let mut items = String::new();
    for i in 1..=n {
        let (class, li_class) = if i % 3 == 0 {
            ("citation", r#" class="citation""#)
        } else {
            ("footnote", "")
        };
        body.push_str(&format!(
            r##"<p>Paragraph {i}<a class="{class}" id="ref:{i}" href="#fn:{i}">{i}</a></p>"##
        ));
        items.push_str(&format!(
            r##"<li id="fn:{i}"{li_class}>Note {i} <a class="reversefootnote" href="#ref:{i}">↩</a></li>"##
        ));
    }
    format!(r#"<html><body>{body}<div class="footnotes"><ol>{items}</ol></div></body></html>"#)
}

fn relink(html: &str, sort_citations: bool) -> String {
    let mut doc = Document::parse(html);
    rewrite_hrefs(&mut doc.tree);
    build_appendix(&mut doc.tree, &AppendixOptions { sort_citations });
    relabel_markers(&mut doc.tree);
    doc.to_html()
}

// ============================================================================
// Parse and serialize
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_note", |b| {
        b.iter(|| Document::parse(NOTE));
    });
}

fn bench_roundtrip(c: &mut Criterion) {
    c.bench_function("parse_serialize_note", |b| {
        b.iter(|| Document::parse(NOTE).to_html());
    });
}

// ============================================================================
// Relinking passes
// ============================================================================

fn bench_relink_note(c: &mut Criterion) {
    c.bench_function("relink_note", |b| {
        b.iter(|| relink(NOTE, false));
    });
}

fn bench_relink_long(c: &mut Criterion) {
    let html = long_note(500);

    c.bench_function("relink_500_notes", |b| {
        b.iter(|| relink(&html, false));
    });
    c.bench_function("relink_500_notes_sorted", |b| {
        b.iter(|| relink(&html, true));
    });
}

criterion_group!(
    benches,
    // Parse and serialize
    bench_parse,
    bench_roundtrip,
    // Relinking
    bench_relink_note,
    bench_relink_long,
);
criterion_main!(benches);
