#![cfg(test)]

use crate::dict::connection::ConnectionMatrix;
use crate::dict::{DictEntry, TrieDictionary};
use crate::model::Model;

/// `{"a": 5, "ab": 3, "b": 4}` over a single attribute with zero
/// connection costs.
pub fn ab_dict() -> TrieDictionary {
    TrieDictionary::from_entries(vec![
        ("a".to_string(), vec![DictEntry::new("A", 5, 0, 0)]),
        ("ab".to_string(), vec![DictEntry::new("AB", 3, 0, 0)]),
        ("b".to_string(), vec![DictEntry::new("B", 4, 0, 0)]),
    ])
    .unwrap()
}

pub fn ab_model() -> Model {
    Model::new(ab_dict(), ConnectionMatrix::zeros(1)).unwrap()
}

/// A small Japanese lexicon with three attribute classes:
/// 0 = BOS/EOS and unknown, 1 = noun, 2 = particle.
pub fn ja_dict() -> TrieDictionary {
    TrieDictionary::from_csv(
        "\
すもも,1,1,3000,名詞,一般,*,*,*,*,すもも,スモモ,スモモ
もも,1,1,2500,名詞,一般,*,*,*,*,もも,モモ,モモ
も,2,2,1000,助詞,係助詞,*,*,*,*,も,モ,モ
も,1,1,4000,名詞,一般,*,*,*,*,も,モ,モ
の,2,2,800,助詞,連体化,*,*,*,*,の,ノ,ノ
うち,1,1,2000,名詞,非自立,*,*,*,*,うち,ウチ,ウチ
う,1,1,6000,名詞,一般,*,*,*,*,う,ウ,ウ
ち,1,1,6000,名詞,一般,*,*,*,*,ち,チ,チ
す,1,1,6000,名詞,一般,*,*,*,*,す,ス,ス
",
    )
    .unwrap()
}

/// Particles are cheap after nouns, nouns are cheap after particles.
pub fn ja_matrix() -> ConnectionMatrix {
    #[rustfmt::skip]
    let costs = vec![
        // left:  0     1     2
        /* r0 */  0,  100,  800,
        /* r1 */ 50,  400, -200,
        /* r2 */ 50, -100,  900,
    ];
    ConnectionMatrix::new(3, costs).unwrap()
}

pub fn ja_model() -> Model {
    Model::new(ja_dict(), ja_matrix()).unwrap()
}
