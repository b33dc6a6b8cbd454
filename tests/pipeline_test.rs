//! Integration tests for the analysis pipeline.

use gongwen::normalize::normalize;
use gongwen::segment::segment;
use gongwen::{analyze, render, Block, BlockKind, Genre, RenderTarget, Role};

const REPORT: &str = "\
# 关于2024年防汛工作的情况报告

市政府：

今年以来，我局**高度重视**防汛工作，现将有关情况报告如下。

一、基本情况

（一）主要做法

全市共排查隐患点 *126* 处。

- 加强值班值守
- 完善应急预案

二、下一步工作

1.继续开展排查

深圳市水务局

2024年3月15日
";

fn rebuild(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Heading { level, text } => format!("{} {}", "#".repeat(*level as usize), text),
            Block::List { items } => items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.text().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[test]
fn test_render_is_deterministic() {
    for target in RenderTarget::ALL {
        let a = render(REPORT, Some("关于防汛工作的情况报告"), target).unwrap();
        let b = render(REPORT, Some("关于防汛工作的情况报告"), target).unwrap();
        if target == RenderTarget::PageDescription {
            // Packaging may stamp entries; the analysed content is still identical
            assert_eq!(a.stats, b.stats);
        } else {
            assert_eq!(a.bytes, b.bytes, "{} output differs", target);
        }
    }
}

#[test]
fn test_normalization_is_idempotent() {
    let samples = [
        REPORT,
        "",
        "***粗斜体*** 与 `代码`\n\n> > 引用\n\n[链接](http://a) ![图](b.png)",
        "<!-- 发文机关：市政府 -->\n<!-- 临时备注 -->\n#### 四级标题",
        "  \r\n\r\n  ",
        "#### > 引用内容\n\n#### ## 二级",
        "[[[[[a](1)](2)](3)](4)](5)",
        "<!--\n发文机关：市政府\n-->\n正文",
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
    }
}

#[test]
fn test_segmentation_preserves_boundaries() {
    let blocks = segment(&normalize(REPORT));
    let kinds: Vec<BlockKind> = blocks.iter().map(Block::kind).collect();

    let rebuilt = segment(&normalize(&rebuild(&blocks)));
    assert_eq!(rebuilt, blocks);
    assert_eq!(rebuilt.iter().map(Block::kind).collect::<Vec<_>>(), kinds);

    assert_eq!(kinds[0], BlockKind::Heading1);
    assert!(blocks
        .iter()
        .any(|b| b.items() == ["加强值班值守".to_string(), "完善应急预案".to_string()]));
    // Decoration is dropped, text kept
    assert!(blocks.iter().any(|b| b.text() == "全市共排查隐患点 126 处。"));
}

#[test]
fn test_classification_is_stable_under_trailing_whitespace() {
    let inputs = [
        ("市政府：\n\n正文", Some("关于防汛工作的情况报告")),
        ("本次会议纪要如下", None),
        ("正文", Some("关于开展检查的通知")),
        ("特此请示，妥否，请批示：\n\n正文", None),
        ("普通正文", None),
    ];
    for (raw, title) in inputs {
        let base = analyze(raw, title).genre;
        let padded = format!("{}   \n\n\n  \n", raw);
        assert_eq!(analyze(&padded, title).genre, base, "unstable for {:?}", raw);
    }
}

#[test]
fn test_date_detection() {
    let doc = analyze("正文内容。\n\n深圳市发展改革委 2024年3月15日", None);
    assert_eq!(doc.blocks.last().unwrap().role(), Some(Role::DateLine));

    let doc = analyze("正文内容。\n\n深圳市发展改革委", None);
    assert_eq!(doc.blocks.last().unwrap().role(), Some(Role::SenderLine));
}

#[test]
fn test_enumeration_promotion_in_every_genre() {
    let titles = [None, Some("关于防汛工作的情况报告"), Some("关于开展检查的通知")];
    for title in titles {
        let doc = analyze("开头段落。\n\n一、工作背景\n\n（一）主要做法\n\n正文。\n\n结尾段落。", title);
        assert_eq!(doc.blocks[1].role(), Some(Role::SectionHeading));
        assert_eq!(doc.blocks[2].role(), Some(Role::SubHeading));
    }
}

#[test]
fn test_recipient_detection() {
    let report = analyze("市政府：\n\n正文内容。\n\n一些说明。", Some("情况报告"));
    assert_eq!(report.genre, Genre::SituationalReport);
    assert_eq!(report.blocks[0].role(), Some(Role::RecipientLine));

    let standard = analyze("市政府：\n\n正文内容。\n\n一些说明。", None);
    assert_eq!(standard.genre, Genre::Standard);
    assert_eq!(standard.blocks[0].role(), Some(Role::Body));
}

#[test]
fn test_full_report_roles() {
    let doc = analyze(REPORT, Some("关于2024年防汛工作的情况报告"));
    assert_eq!(doc.genre, Genre::SituationalReport);
    assert_eq!(doc.recipient(), Some("市政府："));
    assert_eq!(doc.sender(), Some("深圳市水务局"));
    assert_eq!(
        doc.issue_date(),
        chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
    );
    // The title repeats the leading heading, so no separate title unit
    assert_eq!(doc.title_unit(true), None);
}

#[test]
fn test_plain_text_degrades_to_standard_body() {
    let doc = analyze("第一段话。\n\n第二段话：说明。\n\n第三段话：补充。", None);
    assert_eq!(doc.genre, Genre::Standard);
    assert!(doc.blocks.iter().all(|b| b.role() == Some(Role::Body)));
}

#[test]
fn test_annotations_survive_analysis() {
    let doc = analyze("<!-- 发文机关：市政府 -->\n\n正文内容：说明。\n\n2024年3月15日", None);
    assert!(doc.blocks[0].is_annotation());
    assert_eq!(doc.blocks[0].role(), Some(Role::Body));
    assert_eq!(doc.blocks[2].role(), Some(Role::DateLine));
}

#[test]
fn test_multiline_annotation_is_invisible() {
    let raw = "<!--\n发文机关：市政府\n-->\n\n正文内容：说明。\n\n2024年3月15日";
    let doc = analyze(raw, None);
    assert_eq!(doc.blocks.len(), 3);
    assert!(doc.blocks[0].is_annotation());
    assert_eq!(doc.blocks[2].role(), Some(Role::DateLine));

    let html = render(raw, None, RenderTarget::PreviewHtml).unwrap();
    let html = html.as_str().unwrap();
    assert!(html.contains("<!-- 发文机关：市政府 -->"));
    assert!(!html.contains("&lt;!--"));
    assert!(!html.contains("<p class=\"document-paragraph\">发文机关"));

    let pdf = render(raw, None, RenderTarget::PrintDocument).unwrap();
    assert_eq!(pdf.stats.unit_count, 2);
}
