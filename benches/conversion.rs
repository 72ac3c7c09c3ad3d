//! Benchmarks for the note rendering pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use enorg::enex::parse_enml;
use enorg::org::{RenderContext, render, resolve};
use enorg::ResourceTable;

/// Build a synthetic ENML body with the constructs that dominate real
/// notes: paragraphs, nested lists, a table, and inline emphasis.
fn sample_enml() -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd">
<en-note>"#,
    );
    for i in 0..50 {
        body.push_str(&format!(
            "<div>paragraph {i} with <b>bold</b> and <i>italic</i> text</div>"
        ));
        body.push_str("<ol>");
        for j in 0..5 {
            body.push_str(&format!(
                "<li>item {j}<ul><li>nested alpha</li><li>nested beta</li></ul></li>"
            ));
        }
        body.push_str("</ol>");
        body.push_str("<table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>b</td></tr></table>");
    }
    body.push_str("</en-note>");
    body
}

fn bench_parse_enml(c: &mut Criterion) {
    let enml = sample_enml();
    c.bench_function("parse_enml", |b| {
        b.iter(|| parse_enml(&enml).unwrap());
    });
}

fn bench_render(c: &mut Criterion) {
    let tree = parse_enml(&sample_enml()).unwrap();
    let resources = ResourceTable::new();
    let ctx = RenderContext::new(&resources, "data/ab/cd");
    c.bench_function("render", |b| {
        b.iter(|| render(&tree, &ctx).unwrap());
    });
}

fn bench_resolve(c: &mut Criterion) {
    let tree = parse_enml(&sample_enml()).unwrap();
    let resources = ResourceTable::new();
    let ctx = RenderContext::new(&resources, "data/ab/cd");
    let tokens = render(&tree, &ctx).unwrap();
    c.bench_function("resolve", |b| {
        b.iter(|| resolve(&tokens).unwrap());
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let enml = sample_enml();
    let resources = ResourceTable::new();
    c.bench_function("enml_to_org", |b| {
        b.iter(|| {
            let tree = parse_enml(&enml).unwrap();
            let ctx = RenderContext::new(&resources, "data/ab/cd");
            resolve(&render(&tree, &ctx).unwrap()).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_parse_enml,
    bench_render,
    bench_resolve,
    bench_full_pipeline
);
criterion_main!(benches);
