//! Genre classification.
//!
//! A first-match cascade of `(predicate, genre)` rules over the title and the
//! normalized body. Earlier rules win even when a later one would also match.
//! Keyword lists live in [`Vocabulary`] so they can be tuned without code
//! changes.

use crate::error::{Error, Result};
use crate::model::Genre;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// First paragraphs at or above this many characters never count as a
/// request or reply opener.
const OPENER_MAX_CHARS: usize = 100;

/// Keyword lists consulted by the classifier and the positional tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Title terms marking a report (报告)
    pub report_title: Vec<String>,
    /// Body terms marking a report, required together with a situation term
    pub report: Vec<String>,
    /// Body terms for situation or findings (情况)
    pub situation: Vec<String>,
    /// Title terms for notices, decisions, orders and announcements
    pub notice_title: Vec<String>,
    /// Title terms for meeting minutes
    pub minutes_title: Vec<String>,
    /// Meeting term used in the body phrase pattern
    pub meeting: String,
    /// Minutes term used in the body phrase pattern
    pub minutes: String,
    /// Explicit red-header markers in the body
    pub red_header_markers: Vec<String>,
    /// Province abbreviations that open a dispatch number (京, 粤, ...)
    pub province_abbreviations: String,
    /// Request vocabulary (请示)
    pub request: Vec<String>,
    /// Reply vocabulary (批复)
    pub reply: Vec<String>,
    /// Governmental addressee vocabulary for recipient lines
    pub addressees: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            report_title: list(&["报告", "情况"]),
            report: list(&["报告"]),
            situation: list(&["情况", "调研", "调查"]),
            notice_title: list(&["通知", "决定", "命令", "公告", "通告"]),
            minutes_title: list(&["会议", "纪要"]),
            meeting: "会议".to_string(),
            minutes: "纪要".to_string(),
            red_header_markers: list(&["红头文件", "文号"]),
            province_abbreviations: "京津沪渝冀豫云辽黑湘皖鲁新苏浙赣鄂桂甘晋蒙陕吉闽贵粤川青藏宁琼"
                .to_string(),
            request: list(&["上报", "呈报", "请示", "申请", "表示", "建议"]),
            reply: list(&["批复", "答复", "复函"]),
            addressees: list(&["市政府", "省政府", "政府", "办公厅", "党委", "领导小组", "委员会"]),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let vocabulary: Vocabulary =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("vocabulary: {}", e)))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    fn validate(&self) -> Result<()> {
        if self.meeting.trim().is_empty() || self.minutes.trim().is_empty() {
            return Err(Error::Config(
                "vocabulary: meeting and minutes terms must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a rule gets to look at.
struct Evidence<'a> {
    title: &'a str,
    body: &'a str,
    first_paragraph: &'a str,
}

type Predicate = fn(&GenreClassifier, &Evidence<'_>) -> bool;

/// A single classification rule.
struct Rule {
    name: &'static str,
    genre: Genre,
    predicate: Predicate,
}

/// Priority-ordered genre classifier.
pub struct GenreClassifier {
    vocabulary: Vocabulary,
    meeting_minutes: Regex,
    dispatch_number: Option<Regex>,
    rules: Vec<Rule>,
}

impl Default for GenreClassifier {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}

impl GenreClassifier {
    /// Create a classifier over the given vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        let meeting_minutes = Regex::new(&format!(
            "{}.*{}",
            regex::escape(&vocabulary.meeting),
            regex::escape(&vocabulary.minutes)
        ))
        .unwrap_or_else(|_| Regex::new("$^").expect("Invalid empty regex"));

        let dispatch_number = if vocabulary.province_abbreviations.is_empty() {
            None
        } else {
            let provinces: String = vocabulary
                .province_abbreviations
                .chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect();
            Regex::new(&format!(
                r"[{}].*?[〔［\[【].*?[〕］\]】].*?号",
                provinces
            ))
            .ok()
        };

        Self {
            vocabulary,
            meeting_minutes,
            dispatch_number,
            rules: default_rules(),
        }
    }

    /// Get the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Assign a genre to a document.
    ///
    /// Deterministic and pure. An empty body is always `Standard`.
    pub fn classify(&self, title: Option<&str>, body: &str) -> Genre {
        let body = body.trim();
        if body.is_empty() {
            return Genre::Standard;
        }

        let evidence = Evidence {
            title: title.map(str::trim).unwrap_or(""),
            body,
            first_paragraph: first_paragraph(body),
        };

        for rule in &self.rules {
            if (rule.predicate)(self, &evidence) {
                log::debug!("Genre {:?} assigned by rule '{}'", rule.genre, rule.name);
                return rule.genre;
            }
        }

        log::debug!("No genre rule matched, using Standard");
        Genre::Standard
    }

    fn is_report(&self, ev: &Evidence<'_>) -> bool {
        contains_any(ev.title, &self.vocabulary.report_title)
            || (contains_any(ev.body, &self.vocabulary.report)
                && contains_any(ev.body, &self.vocabulary.situation))
    }

    fn is_notice(&self, ev: &Evidence<'_>) -> bool {
        contains_any(ev.title, &self.vocabulary.notice_title)
    }

    fn is_minutes(&self, ev: &Evidence<'_>) -> bool {
        contains_any(ev.title, &self.vocabulary.minutes_title)
            || self.meeting_minutes.is_match(ev.body)
    }

    fn is_red_header(&self, ev: &Evidence<'_>) -> bool {
        contains_any(ev.body, &self.vocabulary.red_header_markers)
            || self
                .dispatch_number
                .as_ref()
                .is_some_and(|re| re.is_match(ev.body))
    }

    fn is_request(&self, ev: &Evidence<'_>) -> bool {
        is_opener(ev.first_paragraph) && contains_any(ev.first_paragraph, &self.vocabulary.request)
    }

    fn is_reply(&self, ev: &Evidence<'_>) -> bool {
        is_opener(ev.first_paragraph) && contains_any(ev.first_paragraph, &self.vocabulary.reply)
    }
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "report",
            genre: Genre::SituationalReport,
            predicate: GenreClassifier::is_report,
        },
        Rule {
            name: "notice",
            genre: Genre::Notice,
            predicate: GenreClassifier::is_notice,
        },
        Rule {
            name: "minutes",
            genre: Genre::MeetingMinutes,
            predicate: GenreClassifier::is_minutes,
        },
        Rule {
            name: "red-header",
            genre: Genre::RedHeader,
            predicate: GenreClassifier::is_red_header,
        },
        Rule {
            name: "request",
            genre: Genre::Request,
            predicate: GenreClassifier::is_request,
        },
        Rule {
            name: "reply",
            genre: Genre::Reply,
            predicate: GenreClassifier::is_reply,
        },
    ]
}

/// Classify with the default vocabulary.
pub fn classify(title: Option<&str>, body: &str) -> Genre {
    GenreClassifier::default().classify(title, body)
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| !t.is_empty() && text.contains(t.as_str()))
}

/// First chunk of the body up to a blank line.
fn first_paragraph(body: &str) -> &str {
    let mut end = body.len();
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim().is_empty() && offset > 0 {
            end = offset;
            break;
        }
        offset += line.len();
    }
    body[..end].trim()
}

/// A short opener ending with a full-width colon (e.g. `市财政局：`).
fn is_opener(paragraph: &str) -> bool {
    paragraph.ends_with('：') && paragraph.chars().count() < OPENER_MAX_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_by_title() {
        assert_eq!(
            classify(Some("关于防汛工作的情况报告"), "正文"),
            Genre::SituationalReport
        );
    }

    #[test]
    fn test_report_by_body_cooccurrence() {
        assert_eq!(
            classify(None, "现将调研情况报告如下。"),
            Genre::SituationalReport
        );
        assert_eq!(classify(None, "现将有关工作报告如下。"), Genre::Standard);
    }

    #[test]
    fn test_notice() {
        assert_eq!(
            classify(Some("关于开展安全生产检查的通知"), "各区："),
            Genre::Notice
        );
        assert_eq!(classify(None, "通知如下"), Genre::Standard);
    }

    #[test]
    fn test_report_preempts_notice() {
        assert_eq!(
            classify(Some("关于整改情况的通知"), "正文"),
            Genre::SituationalReport
        );
    }

    #[test]
    fn test_minutes() {
        assert_eq!(classify(Some("专题会议纪要"), "正文"), Genre::MeetingMinutes);
        assert_eq!(
            classify(None, "市政府常务会议纪要\n\n出席人员"),
            Genre::MeetingMinutes
        );
    }

    #[test]
    fn test_red_header() {
        assert_eq!(classify(None, "<!-- 红头文件 -->\n\n正文"), Genre::RedHeader);
        assert_eq!(classify(None, "粤府〔2024〕12号\n\n正文"), Genre::RedHeader);
        assert_eq!(classify(None, "京政发[2023]5号"), Genre::RedHeader);
    }

    #[test]
    fn test_request_and_reply() {
        assert_eq!(
            classify(None, "关于申请专项资金的请示 市财政局：\n\n正文"),
            Genre::Request
        );
        assert_eq!(classify(None, "关于同意立项的批复：\n\n正文"), Genre::Reply);
        // No trailing colon: just a paragraph
        assert_eq!(classify(None, "我们建议如下\n\n正文"), Genre::Standard);
    }

    #[test]
    fn test_empty_body_is_standard() {
        assert_eq!(classify(Some("情况报告"), ""), Genre::Standard);
        assert_eq!(classify(None, "  \n\n "), Genre::Standard);
    }

    #[test]
    fn test_trailing_whitespace_is_stable() {
        let body = "关于同意立项的批复：\n\n正文";
        let padded = format!("{}\n\n\n   \n", body);
        assert_eq!(classify(None, body), classify(None, &padded));
    }

    #[test]
    fn test_first_paragraph() {
        assert_eq!(first_paragraph("甲\n乙\n\n丙"), "甲\n乙");
        assert_eq!(first_paragraph("单段"), "单段");
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocabulary = Vocabulary::from_json(r#"{"notice_title": ["通报"]}"#).unwrap();
        let classifier = GenreClassifier::new(vocabulary);
        assert_eq!(classifier.classify(Some("表彰通报"), "正文"), Genre::Notice);
        assert_eq!(classifier.classify(Some("表彰通知"), "正文"), Genre::Standard);
    }

    #[test]
    fn test_invalid_vocabulary() {
        assert!(Vocabulary::from_json(r#"{"meeting": ""}"#).is_err());
        assert!(Vocabulary::from_json("not json").is_err());
    }
}
