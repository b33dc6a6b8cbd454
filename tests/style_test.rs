//! Integration tests for the style table and configuration loading.

use gongwen::{
    Error, Genre, GenreClassifier, Gongwen, NormalizeOptions, Role, StyleKey, StyleTable,
    Vocabulary,
};

#[test]
fn test_every_genre_and_role_resolves() {
    let table = StyleTable::global();
    for genre in Genre::ALL {
        for role in Role::ALL {
            let rule = table.resolve(genre, StyleKey::for_role(role));
            assert!(rule.size_pt() > 0.0, "{:?}/{:?}", genre, role);
            assert!(rule.line_spacing_pt > 0.0);
        }
        for key in StyleKey::ALL {
            assert!(!table.resolve(genre, key).font.primary.is_empty());
        }
    }
}

#[test]
fn test_genre_overrides() {
    let table = StyleTable::global();
    assert_eq!(
        table.resolve(Genre::RedHeader, StyleKey::Title).color.as_deref(),
        Some("C00000")
    );
    assert_eq!(table.resolve(Genre::Standard, StyleKey::Title).color, None);
    assert_eq!(
        table
            .resolve(Genre::MeetingMinutes, StyleKey::Body)
            .line_spacing_pt,
        24.0
    );
    // Genres without overrides fall back to the base rules
    assert_eq!(
        table.resolve(Genre::Reply, StyleKey::Body),
        table.resolve(Genre::Standard, StyleKey::Body)
    );
}

#[test]
fn test_overrides_json() {
    let table = StyleTable::standard()
        .with_overrides_json(
            r#"{
                "standard": { "body": { "line_spacing_pt": 30, "size": "xiao_san" } },
                "reply": { "date_line": { "alignment": "center", "bold": true } }
            }"#,
        )
        .unwrap();

    let body = table.resolve(Genre::Notice, StyleKey::Body);
    assert_eq!(body.line_spacing_pt, 30.0);
    assert_eq!(body.size_pt(), 15.0);

    let date = table.resolve(Genre::Reply, StyleKey::DateLine);
    assert!(date.bold);
    assert!(!table.resolve(Genre::Request, StyleKey::DateLine).bold);
}

#[test]
fn test_invalid_overrides() {
    let cases = [
        r#"{"memo": {"body": {"bold": true}}}"#,
        r#"{"standard": {"footer": {"bold": true}}}"#,
        r#"{"standard": {"body": {"weight": 700}}}"#,
        r#"{"standard": {"body": {"space_after_pt": -4}}}"#,
        r#"{"standard": {"body": {"line_spacing_pt": 0}}}"#,
        r#"{"standard": {"title": {"color": "red;}body{display:none"}}}"#,
        "not json",
    ];
    for json in cases {
        let err = StyleTable::standard().with_overrides_json(json).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{}: {:?}", json, err);
        assert!(!err.is_render_failure());
    }
}

#[test]
fn test_style_table_serializes() {
    let json = serde_json::to_string(StyleTable::global()).unwrap();
    assert!(json.contains("仿宋_GB2312"));
    assert!(json.contains("red_header"));
}

#[test]
fn test_vocabulary_from_json() {
    let vocabulary = Vocabulary::from_json(r#"{"notice_title": ["通报"]}"#).unwrap();
    assert_eq!(vocabulary.notice_title, vec!["通报".to_string()]);
    // Unlisted fields keep their defaults
    assert_eq!(vocabulary.reply, Vocabulary::default().reply);

    let classifier = GenreClassifier::new(vocabulary.clone());
    assert_eq!(classifier.classify(Some("关于表彰的通报"), "正文"), Genre::Notice);
    assert_eq!(classifier.classify(Some("关于检查的通知"), "正文"), Genre::Standard);

    let doc = Gongwen::new()
        .with_vocabulary(vocabulary)
        .analyze("正文", Some("关于表彰的通报"));
    assert_eq!(doc.genre, Genre::Notice);

    assert!(matches!(
        Vocabulary::from_json(r#"{"meeting": ""}"#),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_normalize_options() {
    let raw = "<!-- 签发人：张三 -->\n\n正文";
    let plain = Gongwen::new().analyze(raw, None);
    assert_eq!(plain.blocks.len(), 1);

    let keep = Gongwen::new()
        .with_normalize_options(NormalizeOptions::new().with_preserved_keywords(["签发人"]))
        .analyze(raw, None);
    assert_eq!(keep.blocks.len(), 2);
    assert!(keep.blocks[0].is_annotation());
}
