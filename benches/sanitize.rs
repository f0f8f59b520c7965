//! Benchmarks for paste sanitizing.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use prompter::sanitize;

fn web_paste(paragraphs: usize) -> String {
    let mut html = String::from(r#"<b style="font-weight:normal;" id="docs-internal-guid-42">"#);
    for i in 0..paragraphs {
        html.push_str(&format!(
            r#"<p style="background-color:#ffffff; margin:0"><span style="font-size:11pt; color:#000000; background-color:#ffff00">Paragraph {i}</span></p>"#
        ));
    }
    html.push_str("</b>");
    html
}

fn bench_sanitize_small(c: &mut Criterion) {
    let html = r#"<p style="color:rgb(0,0,0); font-size:12pt;">Hello</p>"#;
    c.bench_function("sanitize_small", |b| {
        b.iter(|| sanitize::sanitize(black_box(html), true))
    });
}

fn bench_sanitize_pasted(c: &mut Criterion) {
    let html = web_paste(200);
    c.bench_function("sanitize_pasted_200", |b| {
        b.iter(|| sanitize::sanitize_pasted(black_box(&html), true))
    });
}

criterion_group!(benches, bench_sanitize_small, bench_sanitize_pasted);
criterion_main!(benches);
