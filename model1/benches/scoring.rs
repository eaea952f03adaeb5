//! 語彙翻訳素性のベンチマーク
//!
//! 合成した語彙と語彙翻訳表を使い、テキスト形式とバイナリモデルの読み込み速度、
//! および入力文と目的言語句の組に対するスコア計算の速度を計測します。

use std::fmt::Write as _;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use model1_rkyv::word::NonTerminalMode;
use model1_rkyv::{CompiledModel, LexicalTable, Model1, Phrase, Sentence, SymbolPool, Vocabulary};

const VOCAB_SIZE: u32 = 5000;
const ENTRIES_PER_WORD: u32 = 20;
const NUM_PAIRS: u32 = 200;

struct Corpus {
    src_vcb: String,
    trg_vcb: String,
    s2t: String,
    pairs: Vec<(String, String)>,
}

/// 再現性のある疑似乱数列 (xorshift)
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 32) as u32
    }
}

impl Corpus {
    fn new() -> Self {
        let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
        let mut src_vcb = String::new();
        let mut trg_vcb = String::new();
        for id in 1..=VOCAB_SIZE {
            writeln!(src_vcb, "{id} s{id} 1").unwrap();
            writeln!(trg_vcb, "{id} t{id} 1").unwrap();
        }
        let mut s2t = String::new();
        for id_s in 0..=VOCAB_SIZE {
            for _ in 0..ENTRIES_PER_WORD {
                let id_t = rng.next() % VOCAB_SIZE + 1;
                let prob = f64::from(rng.next() % 1000 + 1) / 1000.0;
                writeln!(s2t, "{id_s} {id_t} {prob}").unwrap();
            }
        }
        let pairs = (0..NUM_PAIRS)
            .map(|_| {
                let len_s = rng.next() % 30 + 5;
                let len_t = rng.next() % 5 + 1;
                let source: Vec<_> = (0..len_s)
                    .map(|_| format!("s{}", rng.next() % VOCAB_SIZE + 1))
                    .collect();
                let target: Vec<_> = (0..len_t)
                    .map(|i| match i % 3 {
                        2 => "[X]".to_string(),
                        _ => format!("t{}", rng.next() % VOCAB_SIZE + 1),
                    })
                    .collect();
                (source.join(" "), target.join(" "))
            })
            .collect();
        Self {
            src_vcb,
            trg_vcb,
            s2t,
            pairs,
        }
    }

    fn load(&self, pool: &SymbolPool) -> (Vocabulary, Vocabulary, LexicalTable) {
        let mut vcb_s = Vocabulary::new(pool);
        vcb_s
            .load_from_reader(pool, self.src_vcb.as_bytes(), "src.vcb")
            .unwrap();
        let mut vcb_t = Vocabulary::new(pool);
        vcb_t
            .load_from_reader(pool, self.trg_vcb.as_bytes(), "trg.vcb")
            .unwrap();
        let mut table = LexicalTable::default();
        table
            .load_from_reader(self.s2t.as_bytes(), "s2t.t1", &vcb_s, &vcb_t)
            .unwrap();
        (vcb_s, vcb_t, table)
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let corpus = Corpus::new();

    let pool = SymbolPool::new();
    let (vcb_s, vcb_t, table) = corpus.load(&pool);
    let mut compiled = vec![];
    CompiledModel::from_tables(&pool, &vcb_s, &vcb_t, &table)
        .unwrap()
        .write(&mut compiled)
        .unwrap();

    let mut group = c.benchmark_group("Model1 Loading");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    group.bench_function(BenchmarkId::new("Text", VOCAB_SIZE), |b| {
        b.iter(|| corpus.load(&SymbolPool::new()));
    });
    group.bench_function(BenchmarkId::new("Compiled", VOCAB_SIZE), |b| {
        b.iter(|| {
            CompiledModel::read(compiled.as_slice())
                .unwrap()
                .into_tables(&SymbolPool::new())
                .unwrap()
        });
    });
    group.finish();

    let model = Model1::new("Model10", &pool, vcb_s, vcb_t, table).unwrap();
    let pairs: Vec<_> = corpus
        .pairs
        .iter()
        .map(|(source, target)| {
            (
                Sentence::from_str(&pool, source).unwrap(),
                Phrase::from_str(&pool, target, NonTerminalMode::SingleLabel).unwrap(),
            )
        })
        .collect();

    let mut group = c.benchmark_group("Model1 Scoring");
    group.throughput(Throughput::Elements(pairs.len() as u64));
    group.bench_function("Pairs", |b| {
        b.iter(|| {
            pairs
                .iter()
                .map(|(source, target)| model.score(source, target))
                .sum::<f32>()
        });
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
