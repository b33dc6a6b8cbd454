//! Block segmentation of normalized text.

use crate::model::Block;
use crate::normalize::parse_heading_marker;
use once_cell::sync::Lazy;
use regex::Regex;

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*+]|\d+\.)\s+(.*)$").expect("Invalid list item regex"));

/// Split normalized text into an ordered block sequence.
///
/// Single left-to-right pass over lines. Blank lines close an open list;
/// heading markers become headings; bullet and `N.` lines accumulate into
/// a list; everything else becomes a trimmed paragraph.
pub fn segment(normalized: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut list: Vec<String> = Vec::new();

    for raw_line in normalized.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            flush_list(&mut blocks, &mut list);
            continue;
        }

        if let Some((level, text)) = parse_heading_marker(line) {
            flush_list(&mut blocks, &mut list);
            let text = text.trim();
            if !text.is_empty() {
                blocks.push(Block::heading(level, text));
            }
            continue;
        }

        if let Some(caps) = LIST_ITEM.captures(line) {
            list.push(caps[1].trim().to_string());
            continue;
        }

        flush_list(&mut blocks, &mut list);
        blocks.push(Block::paragraph(line));
    }

    flush_list(&mut blocks, &mut list);
    log::debug!("Segmented into {} blocks", blocks.len());
    blocks
}

fn flush_list(blocks: &mut Vec<Block>, list: &mut Vec<String>) {
    if !list.is_empty() {
        blocks.push(Block::list(std::mem::take(list)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;
    use crate::normalize::normalize;

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = segment(&normalize("# 总标题\n\n## 一般要求\n正文第一段\n\n正文第二段"));
        let kinds: Vec<_> = blocks.iter().map(Block::kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading1,
                BlockKind::Heading2,
                BlockKind::Paragraph,
                BlockKind::Paragraph
            ]
        );
        assert_eq!(blocks[0].text(), "总标题");
        assert_eq!(blocks[2].text(), "正文第一段");
    }

    #[test]
    fn test_list_accumulation() {
        let blocks = segment("- 第一项\n* 第二项\n3. 第三项\n说明文字");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].items(), ["第一项", "第二项", "第三项"]);
        assert_eq!(blocks[1].text(), "说明文字");
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let blocks = segment("- 甲\n\n- 乙");
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.kind() == BlockKind::ListItemGroup));
    }

    #[test]
    fn test_list_flushed_at_end() {
        let blocks = segment("前言\n+ 末项");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].items(), ["末项"]);
    }

    #[test]
    fn test_chinese_numbering_is_not_a_list() {
        let blocks = segment("1.加强组织领导\n一、总体要求");
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(Block::is_paragraph));
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n   \n").is_empty());
    }

    #[test]
    fn test_multiline_comment_is_one_annotation() {
        let blocks = segment(&normalize("<!--\n发文机关：市政府\n-->\n\n正文"));
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_annotation());
        assert_eq!(blocks[0].text(), "<!-- 发文机关：市政府 -->");
        assert_eq!(blocks[1].text(), "正文");
    }

    #[test]
    fn test_paragraphs_are_trimmed() {
        let blocks = segment("   缩进的段落   ");
        assert_eq!(blocks[0].text(), "缩进的段落");
    }
}
