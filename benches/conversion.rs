//! Benchmarks for the guide conversion pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use steamguide::dom::{parse_html, to_pretty_html};
use steamguide::{ImageMapping, PruneList, clean_html, convert_guide, prune};

const GUIDE_HTML: &str = include_str!("../tests/fixtures/guide.html");

/// The fixture with its guide body repeated to a realistic length.
fn large_guide() -> String {
    let start = GUIDE_HTML
        .find(r#"<div class="subSection detailBox""#)
        .expect("fixture has sections");
    let end = GUIDE_HTML
        .find(r#"<div class="workshopItemControlCtn">"#)
        .expect("fixture has controls");
    let sections = &GUIDE_HTML[start..end];
    let mut html = String::with_capacity(GUIDE_HTML.len() * 40);
    html.push_str(&GUIDE_HTML[..start]);
    for _ in 0..40 {
        html.push_str(sections);
    }
    html.push_str(&GUIDE_HTML[end..]);
    html
}

// ============================================================================
// Pipeline Stages
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let html = large_guide();
    c.bench_function("parse_html", |b| {
        b.iter(|| parse_html(&html));
    });
}

fn bench_prune(c: &mut Criterion) {
    let html = large_guide();
    let list = PruneList::chrome();
    c.bench_function("prune_chrome", |b| {
        b.iter(|| {
            let mut dom = parse_html(&html);
            prune(&mut dom, &list)
        });
    });
}

fn bench_pretty_print(c: &mut Criterion) {
    let dom = parse_html(&large_guide());
    c.bench_function("to_pretty_html", |b| {
        b.iter(|| to_pretty_html(&dom));
    });
}

// ============================================================================
// End to End
// ============================================================================

fn bench_clean(c: &mut Criterion) {
    let html = large_guide();
    let list = PruneList::new(["global_header", "-1"], ["sidebar"]);
    c.bench_function("clean_html", |b| {
        b.iter(|| clean_html(&html, &list));
    });
}

fn bench_markdown(c: &mut Criterion) {
    let html = large_guide();
    let mapping = ImageMapping::new();
    c.bench_function("convert_guide", |b| {
        b.iter(|| {
            let mut dom = parse_html(&html);
            convert_guide(&mut dom, &mapping).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_prune,
    bench_pretty_print,
    bench_clean,
    bench_markdown
);
criterion_main!(benches);
