use criterion::{black_box, criterion_group, criterion_main, Criterion};
use symbology::pdf417::{assemble, Pdf417Options};
use symbology::{encode, Content, Input, Options, Symbology};

fn text_content(text: &str) -> Content {
    Content::resolve(&Input::Text(text.to_string()), None, None).unwrap()
}

fn bench_pdf417_text(c: &mut Criterion) {
    let content = text_content(&"The quick brown fox jumps over the lazy dog. ".repeat(10));
    let options = Options::new(Symbology::Pdf417);
    c.bench_function("pdf417_text_450", |b| b.iter(|| encode(black_box(&content), black_box(&options))));
}

fn bench_pdf417_numeric(c: &mut Criterion) {
    let content = text_content(&"0123456789".repeat(50));
    let options = Options::new(Symbology::Pdf417);
    c.bench_function("pdf417_numeric_500", |b| b.iter(|| encode(black_box(&content), black_box(&options))));
}

fn bench_pdf417_bytes(c: &mut Criterion) {
    let bytes: Vec<u8> = (0..1024u32).map(|i| (i * 31 % 256) as u8).collect();
    let content = Content::resolve(&Input::Bytes(bytes), None, None).unwrap();
    let options = Options::new(Symbology::Pdf417);
    c.bench_function("pdf417_bytes_1024", |b| b.iter(|| encode(black_box(&content), black_box(&options))));
}

fn bench_pdf417_assemble_only(c: &mut Criterion) {
    let content = text_content("Mixed content: ABC abc 1234567890123456789012345 !?#");
    let options = Pdf417Options::default();
    c.bench_function("pdf417_assemble_mixed", |b| {
        b.iter(|| assemble(black_box(&content), black_box(&options), &mut Vec::new()))
    });
}

fn bench_code128(c: &mut Criterion) {
    let content = text_content("CODE128 ABC 123456789012 xyz");
    let options = Options::new(Symbology::Code128);
    c.bench_function("code128_mixed", |b| b.iter(|| encode(black_box(&content), black_box(&options))));
}

criterion_group!(
    benches,
    bench_pdf417_text,
    bench_pdf417_numeric,
    bench_pdf417_bytes,
    bench_pdf417_assemble_only,
    bench_code128
);
criterion_main!(benches);
