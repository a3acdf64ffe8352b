use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_tagger::dict::connection::ConnectionMatrix;
use lattice_tagger::dict::TrieDictionary;
use lattice_tagger::{Model, RequestKind};

const LEXICON: &str = "\
すもも,1,1,3000,名詞,一般,*,*,*,*,すもも,スモモ,スモモ
もも,1,1,2500,名詞,一般,*,*,*,*,もも,モモ,モモ
も,2,2,1000,助詞,係助詞,*,*,*,*,も,モ,モ
も,1,1,4000,名詞,一般,*,*,*,*,も,モ,モ
の,2,2,800,助詞,連体化,*,*,*,*,の,ノ,ノ
うち,1,1,2000,名詞,非自立,*,*,*,*,うち,ウチ,ウチ
きょう,1,1,3000,名詞,副詞可能,*,*,*,*,きょう,キョウ,キョー
は,2,2,2000,助詞,係助詞,*,*,*,*,は,ハ,ワ
いい,3,3,3500,形容詞,自立,*,*,*,*,いい,イイ,イイ
てんき,1,1,4000,名詞,一般,*,*,*,*,てんき,テンキ,テンキ
です,4,4,2500,助動詞,*,*,*,*,*,です,デス,デス
ね,2,2,2000,助詞,終助詞,*,*,*,*,ね,ネ,ネ
";

fn bench_model() -> Model {
    let dict = TrieDictionary::from_csv(LEXICON).unwrap();
    #[rustfmt::skip]
    let costs = vec![
        0,   100, 800, 300, 900,
        50,  400, -200, 600, 200,
        50, -100, 900, 100, 700,
        50,  300, -100, 800, 100,
        50,  500, -300, 700, 900,
    ];
    Model::new(dict, ConnectionMatrix::new(5, costs).unwrap()).unwrap()
}

static INPUTS: &[(&str, &str)] = &[
    ("short", "すもも"),
    ("medium", "すもももももももものうち"),
    ("long", "きょうはいいてんきですねすもももももももものうちきょうはいいてんきですね"),
];

fn bench_one_best(c: &mut Criterion) {
    let model = bench_model();
    let tagger = model.create_tagger();
    let mut group = c.benchmark_group("parse/one_best");
    for &(label, text) in INPUTS {
        group.bench_with_input(BenchmarkId::new(label, text.len()), &text, |b, &text| {
            let mut lattice = tagger.create_lattice();
            b.iter(|| {
                lattice.set_sentence(text);
                tagger.parse(&mut lattice).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_marginal(c: &mut Criterion) {
    let model = bench_model();
    let tagger = model.create_tagger();
    let mut group = c.benchmark_group("parse/marginal");
    for &(label, text) in INPUTS {
        group.bench_with_input(BenchmarkId::new(label, text.len()), &text, |b, &text| {
            let mut lattice = tagger.create_lattice();
            lattice.add_request_type(RequestKind::MarginalProb);
            b.iter(|| {
                lattice.set_sentence(text);
                tagger.parse(&mut lattice).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_nbest(c: &mut Criterion) {
    let model = bench_model();
    let tagger = model.create_tagger();
    let mut group = c.benchmark_group("parse/nbest10");
    for &(label, text) in INPUTS {
        group.bench_with_input(BenchmarkId::new(label, text.len()), &text, |b, &text| {
            b.iter(|| tagger.parse_nbest(10, text).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_one_best, bench_marginal, bench_nbest);
criterion_main!(benches);
