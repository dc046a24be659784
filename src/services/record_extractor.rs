//! 检索结果解析 - 业务能力层
//!
//! 把 arXiv 高级检索结果页拆成一条条候选论文。
//!
//! 解析器只认识一小组 CSS class 和 PDF 链接前缀，由标签事件驱动：
//! - 开始标签（带属性）
//! - 结束标签
//! - 文本
//!
//! 文档先由 `scraper` 解析成树，再按文档顺序展开成上述事件流。

use ego_tree::iter::Edge;
use scraper::{Html, Node};
use tracing::debug;

use crate::models::{CandidateRecord, Field};

/// PDF 链接前缀
pub const PDF_LINK_PREFIX: &str = "https://arxiv.org/pdf/";

const AUTHORS_LABEL: &str = "Authors:";

/// 摘要折叠按钮的文字（以及按 latin-1 误解码后的样子）
const LESS_TOGGLE_MARKERS: [&str; 2] = ["△ Less", "â–³ Less"];

/// 标签事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent<'a> {
    Start {
        name: &'a str,
        attrs: Vec<(&'a str, &'a str)>,
    },
    End {
        name: &'a str,
    },
    Text(&'a str),
}

/// 候选论文解析器
///
/// 状态全部属于实例本身，`reset()` 后可以安全地解析下一份文档
#[derive(Debug, Default)]
pub struct RecordExtractor {
    records: Vec<CandidateRecord>,
    /// 正在构建的记录在 `records` 中的位置
    current: Option<usize>,
    field: Option<Field>,
}

impl RecordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空解析状态和已解析的记录
    pub fn reset(&mut self) {
        self.records.clear();
        self.current = None;
        self.field = None;
    }

    /// 已解析出的记录
    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    /// 解析整份 HTML 文档并取走结果
    ///
    /// 每次调用前都会先 `reset()`
    pub fn extract(&mut self, html: &str) -> Vec<CandidateRecord> {
        self.reset();

        // Html 不是 Send，只在这个同步作用域里存在
        let document = Html::parse_document(html);
        for edge in document.tree.root().traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(element) => self.handle(MarkupEvent::Start {
                        name: element.name(),
                        attrs: element.attrs().collect(),
                    }),
                    Node::Text(text) => self.handle(MarkupEvent::Text(&**text)),
                    _ => {}
                },
                Edge::Close(node) => {
                    if let Node::Element(element) = node.value() {
                        self.handle(MarkupEvent::End {
                            name: element.name(),
                        });
                    }
                }
            }
        }

        debug!("解析出 {} 条候选论文", self.records.len());
        std::mem::take(&mut self.records)
    }

    /// 处理单个事件
    pub fn handle(&mut self, event: MarkupEvent<'_>) {
        match event {
            MarkupEvent::Start { attrs, .. } => self.start_tag(&attrs),
            MarkupEvent::End { name } => self.end_tag(name),
            MarkupEvent::Text(data) => self.text(data),
        }
    }

    fn start_tag(&mut self, attrs: &[(&str, &str)]) {
        if let Some(class) = attr(attrs, "class") {
            if class.contains("arxiv-result") {
                self.records.push(CandidateRecord::default());
                self.current = Some(self.records.len() - 1);
                self.field = None;
            } else if class.contains("title") {
                self.field = Some(Field::Title);
            } else if class.contains("authors") {
                self.field = Some(Field::Authors);
            } else if class.contains("abstract-full") {
                self.field = Some(Field::Abstract);
            } else if class.contains("tag is-small") {
                // 结果块之前出现的标签直接忽略
                if let (Some(record), Some(tooltip)) =
                    (self.current_record(), attr(attrs, "data-tooltip"))
                {
                    record.tags.push(tooltip.to_string());
                }
            }
        }

        if let Some(href) = attr(attrs, "href") {
            if href.starts_with(PDF_LINK_PREFIX) {
                if let Some(record) = self.current_record() {
                    record.link = href.to_string();
                }
            }
        }
    }

    fn end_tag(&mut self, name: &str) {
        if name == "p" || name == "div" {
            self.field = None;
        }
    }

    fn text(&mut self, data: &str) {
        let data = data.trim();
        let Some(field) = self.field else {
            return;
        };
        let Some(record) = self.current_record() else {
            return;
        };

        match field {
            Field::Authors if data == AUTHORS_LABEL => {}
            Field::Abstract if LESS_TOGGLE_MARKERS.contains(&data) => {}
            _ => record.field_mut(field).push_str(data),
        }
    }

    fn current_record(&mut self) -> Option<&mut CandidateRecord> {
        self.current.and_then(|idx| self.records.get_mut(idx))
    }
}

fn attr<'a>(attrs: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}
