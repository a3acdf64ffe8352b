use crate::dict::{DictEntry, DictError, Dictionary, TrieDictionary};

fn sample_dict() -> TrieDictionary {
    let entries = vec![
        (
            "すもも".to_string(),
            vec![DictEntry::new("名詞,一般", 3000, 1, 1)],
        ),
        (
            "もも".to_string(),
            vec![
                DictEntry::new("名詞,一般", 2500, 1, 1),
                DictEntry::new("名詞,固有名詞", 4000, 2, 2),
            ],
        ),
        ("も".to_string(), vec![DictEntry::new("助詞,係助詞", 1000, 3, 3)]),
        ("す".to_string(), vec![DictEntry::new("動詞,自立", 6000, 4, 4)]),
    ];
    TrieDictionary::from_entries(entries).unwrap()
}

#[test]
fn test_lookup_exact() {
    let dict = sample_dict();
    let entries = dict.lookup("もも");
    assert_eq!(entries.len(), 2);
    // insertion order is kept
    assert_eq!(entries[0].feature, "名詞,一般");
    assert_eq!(entries[1].feature, "名詞,固有名詞");
}

#[test]
fn test_lookup_not_found() {
    let dict = sample_dict();
    assert!(dict.lookup("すもう").is_empty());
}

#[test]
fn test_common_prefix_search() {
    let dict = sample_dict();
    let results = dict.common_prefix_search("ももも");
    let lens: Vec<usize> = results.iter().map(|r| r.len).collect();
    assert_eq!(lens, vec!["も".len(), "もも".len()]);
    assert_eq!(results[1].entries.len(), 2);
}

#[test]
fn test_common_prefix_search_no_match() {
    let dict = sample_dict();
    assert!(dict.common_prefix_search("うち").is_empty());
    assert!(dict.common_prefix_search("").is_empty());
}

#[test]
fn test_merge_duplicate_surfaces() {
    let dict = TrieDictionary::from_entries(vec![
        ("a".to_string(), vec![DictEntry::new("X", 1, 0, 0)]),
        ("a".to_string(), vec![DictEntry::new("Y", 2, 0, 0)]),
    ])
    .unwrap();
    let features: Vec<String> = dict.lookup("a").into_iter().map(|e| e.feature).collect();
    assert_eq!(features, vec!["X", "Y"]);
    assert_eq!(dict.stats(), (1, 2));
}

#[test]
fn test_empty_surface_rejected() {
    let result = TrieDictionary::from_entries(vec![(
        String::new(),
        vec![DictEntry::new("X", 1, 0, 0)],
    )]);
    assert!(matches!(result, Err(DictError::EmptySurface)));
}

#[test]
fn test_empty_dictionary() {
    let dict = TrieDictionary::from_entries(Vec::new()).unwrap();
    assert!(dict.is_empty());
    assert!(dict.lookup("a").is_empty());
    assert!(dict.common_prefix_search("abc").is_empty());
}

#[test]
fn test_entries_iterates_everything() {
    let dict = sample_dict();
    assert_eq!(dict.len(), 5);
    let surfaces: Vec<&str> = dict.entries().map(|(s, _)| s).collect();
    assert!(surfaces.contains(&"すもも"));
    assert_eq!(surfaces.iter().filter(|s| **s == "もも").count(), 2);
}

#[test]
fn test_from_csv() {
    let csv = "\
東京,1,2,3000,名詞,固有名詞,地域,*
\"1,2\",0,0,100,名詞,数
";
    let dict = TrieDictionary::from_csv(csv).unwrap();
    let tokyo = dict.lookup("東京");
    assert_eq!(tokyo.len(), 1);
    assert_eq!(tokyo[0].left_id, 1);
    assert_eq!(tokyo[0].right_id, 2);
    assert_eq!(tokyo[0].cost, 3000);
    assert_eq!(tokyo[0].feature, "名詞,固有名詞,地域,*");
    assert_eq!(dict.lookup("1,2")[0].feature, "名詞,数");
}

#[test]
fn test_from_csv_errors() {
    let err = TrieDictionary::from_csv("東京,1,2\n").unwrap_err();
    assert!(err.to_string().contains("line 1"), "got {err}");
    let err = TrieDictionary::from_csv("東京,x,2,3,名詞\n").unwrap_err();
    assert!(err.to_string().contains("left_id"), "got {err}");
}

#[test]
fn test_from_csv_keeps_quoted_feature_fields() {
    use crate::dict::connection::ConnectionMatrix;
    use crate::model::Model;

    let dict = TrieDictionary::from_csv("x,0,0,1,名詞,\"1,2-ジクロロエタン\",読み\n").unwrap();
    assert_eq!(dict.lookup("x")[0].feature, "名詞,\"1,2-ジクロロエタン\",読み");

    let model = Model::new(dict, ConnectionMatrix::zeros(1)).unwrap();
    let tagger = model.create_tagger();
    let mut lattice = tagger.create_lattice();
    lattice.set_sentence("x");
    tagger.parse(&mut lattice).unwrap();
    let node = lattice.iter_nodes().nth(1).unwrap();
    assert_eq!(node.surface(), "x");
    assert_eq!(
        node.feature_fields(),
        vec!["名詞", "1,2-ジクロロエタン", "読み"]
    );
}
