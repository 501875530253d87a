use locator_core::{ConfigError, KeywordLexicon};

fn shop_contact() -> KeywordLexicon {
    KeywordLexicon::new([(1, "shop"), (2, "contact")]).unwrap()
}

#[test]
fn match_is_case_insensitive() {
    let lexicon = shop_contact();
    assert_eq!(lexicon.match_text("OUR SHOPS"), Some(1));
    assert_eq!(lexicon.match_text("Contact Us"), Some(2));
}

#[test]
fn empty_text_never_matches() {
    assert_eq!(shop_contact().match_text(""), None);
}

#[test]
fn unmatched_text_returns_none() {
    assert_eq!(shop_contact().match_text("About the company"), None);
}

#[test]
fn lowest_rank_wins_when_several_keywords_match() {
    // Insertion order is irrelevant; only the rank counts.
    let lexicon = KeywordLexicon::new([(7, "contact"), (3, "shop")]).unwrap();
    assert_eq!(lexicon.match_text("shop contacts"), Some(3));
}

#[test]
fn ranks_need_not_be_contiguous() {
    let lexicon = KeywordLexicon::new([(10, "lojas"), (40, "loj")]).unwrap();
    assert_eq!(lexicon.match_text("As nossas lojas"), Some(10));
    assert_eq!(lexicon.match_text("Loja online"), Some(40));
}

#[test]
fn matching_is_deterministic() {
    let lexicon = KeywordLexicon::new([(2, "contact"), (1, "shop"), (5, "store")]).unwrap();
    let texts = ["Store & shop contact", "CONTACT", "nothing", ""];
    let first: Vec<_> = texts.iter().map(|t| lexicon.match_text(t)).collect();
    for _ in 0..10 {
        let again: Vec<_> = texts.iter().map(|t| lexicon.match_text(t)).collect();
        assert_eq!(again, first);
    }
}

#[test]
fn portuguese_table_matches_store_words() {
    let lexicon = KeywordLexicon::portuguese();
    assert_eq!(lexicon.match_text("Lojas"), Some(1));
    assert_eq!(lexicon.match_text("Contactos"), Some(2));
}

#[test]
fn invalid_lexicons_are_configuration_errors() {
    let empty: [(u32, &str); 0] = [];
    assert!(matches!(
        KeywordLexicon::new(empty),
        Err(ConfigError::InvalidLexicon(_))
    ));
    assert!(matches!(
        KeywordLexicon::new([(1, "shop"), (2, "")]),
        Err(ConfigError::InvalidLexicon(_))
    ));
    assert!(matches!(
        KeywordLexicon::new([(1, "shop"), (1, "store")]),
        Err(ConfigError::InvalidLexicon(_))
    ));
}
