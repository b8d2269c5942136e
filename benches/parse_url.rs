use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weburl::URL;

fn simple(c: &mut Criterion) {
    let url = "https://example.com/foobar";

    c.bench_function(url, |b| b.iter(|| black_box(url).parse::<URL>()));
}

fn with_query_and_fragment(c: &mut Criterion) {
    let url = "https://example.com/foo/bar?a=1&b=2#section";

    c.bench_function(url, |b| b.iter(|| black_box(url).parse::<URL>()));
}

fn relative_against_base(c: &mut Criterion) {
    let base: URL = "https://example.com/a/b/c".parse().unwrap();
    let relative = "../d/e?f=1";

    c.bench_function("relative against base", |b| {
        b.iter(|| URL::parse(black_box(relative), Some(&base)))
    });
}

criterion_group!(benches, simple, with_query_and_fragment, relative_against_base);
criterion_main!(benches);
