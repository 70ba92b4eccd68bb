use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spelltrie::{ExportOptions, SuggestOptions, Trie};

struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

/// Pronounceable pseudo-words built from a small syllable table.
fn generate_words(n: usize, seed: u64) -> Vec<String> {
    const SYLLABLES: &[&str] = &[
        "ka", "ter", "in", "o", "mon", "ly", "re", "sta", "ing", "ed", "pro", "tion", "al", "ca",
        "de", "ble", "ment", "un", "per", "sion",
    ];
    let mut rng = Lcg(seed);
    let mut set = std::collections::BTreeSet::new();
    while set.len() < n {
        let len = rng.next() % 4 + 1;
        let word: String = (0..len)
            .map(|_| SYLLABLES[(rng.next() % SYLLABLES.len() as u64) as usize])
            .collect();
        set.insert(word);
    }
    set.into_iter().collect()
}

fn bench_build(c: &mut Criterion) {
    let words = generate_words(20_000, 42);
    c.bench_function("build_20k", |b| {
        b.iter(|| Trie::from_words(black_box(&words)));
    });
}

fn bench_lookup(c: &mut Criterion) {
    let words = generate_words(20_000, 42);
    let trie = Trie::from_words(&words);
    c.bench_function("has_word_20k", |b| {
        b.iter(|| {
            for w in words.iter().take(1_000) {
                black_box(trie.has_word(w, true));
            }
        });
    });
}

fn bench_suggest(c: &mut Criterion) {
    let words = generate_words(20_000, 42);
    let trie = Trie::from_words(&words);
    let options = SuggestOptions::default();
    c.bench_function("suggest_misspelled", |b| {
        b.iter(|| {
            for w in ["katerin", "prostaing", "monlyy", "unpertion"] {
                black_box(trie.suggest(w, &options));
            }
        });
    });
}

fn bench_serialize(c: &mut Criterion) {
    let trie = Trie::from_words(generate_words(20_000, 42));
    let options = ExportOptions::default();
    let text = trie.export(&options);
    c.bench_function("export_20k", |b| b.iter(|| trie.export(black_box(&options))));
    c.bench_function("import_20k", |b| b.iter(|| Trie::import(black_box(&text))));
}

criterion_group!(benches, bench_build, bench_lookup, bench_suggest, bench_serialize);
criterion_main!(benches);
