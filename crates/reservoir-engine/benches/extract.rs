use criterion::{Criterion, criterion_group, criterion_main};
use reservoir_engine::classify::{Rules, classify_blocks};
use reservoir_engine::render::MemoryMedia;
use reservoir_engine::segment::segment;
use reservoir_engine::{ExtractRequest, Extractor, ExtractorSettings};
mod common;

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.sample_size(10);

    let blocks = common::generate_exam_paper(5, 40);
    let rules = Rules::default();
    group.bench_function("200_questions", |b| {
        b.iter(|| {
            let events = classify_blocks(std::hint::black_box(blocks.clone()), &rules);
            std::hint::black_box(events);
        });
    });

    group.finish();
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    let question = common::generate_question(12);
    let rules = Rules::default();
    group.bench_function("single_question", |b| {
        b.iter(|| {
            let zones = segment(std::hint::black_box(question.clone()), &rules.patterns);
            std::hint::black_box(zones);
        });
    });

    group.finish();
}

fn bench_scan_only_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    group.sample_size(10);

    let dir = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(ExtractorSettings {
        media_root: dir.path().to_path_buf(),
        ..ExtractorSettings::default()
    });
    let blocks = common::generate_exam_paper(5, 40);
    let request = ExtractRequest::scan_only();

    group.bench_function("scan_only_200_questions", |b| {
        b.iter(|| {
            let records = extractor
                .extract_blocks(
                    blocks.iter().cloned().map(Ok),
                    &mut MemoryMedia::new(),
                    &request,
                )
                .unwrap();
            std::hint::black_box(records);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_segment, bench_scan_only_extraction);
criterion_main!(benches);
