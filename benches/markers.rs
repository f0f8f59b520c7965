//! Benchmarks for marker index rebuilds and navigation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use prompter::document::RichTextDocument;
use prompter::markers::MarkerIndex;

fn script_with_cues(paragraphs: usize) -> String {
    let mut html = String::new();
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<p>Line {i} of the script <a name=\"cue{i}\">cue</a> and more words.</p>"
        ));
    }
    html
}

fn bench_rebuild(c: &mut Criterion) {
    let mut doc = RichTextDocument::from_html(&script_with_cues(500));
    let mut index = MarkerIndex::attach(&mut doc);
    c.bench_function("rebuild_500_cues", |b| {
        b.iter(|| index.rebuild(black_box(&doc)))
    });
}

fn bench_navigation(c: &mut Criterion) {
    let mut doc = RichTextDocument::from_html(&script_with_cues(500));
    let mut index = MarkerIndex::attach(&mut doc);
    index.rebuild(&doc);
    c.bench_function("next_marker_clean", |b| {
        b.iter(|| index.next_marker(&doc, black_box(10_000)))
    });
}

criterion_group!(benches, bench_rebuild, bench_navigation);
criterion_main!(benches);
