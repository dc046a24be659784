//! 检索结果中的一篇候选论文

/// 候选论文记录
///
/// 字段内容由解析器按文本事件逐段拼接而成，未出现时为空字符串
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    pub title: String,
    pub authors: String,
    pub abstract_text: String,
    /// 只接受 PDF 链接
    pub link: String,
    /// 学科标签，按出现顺序保存，允许重复
    pub tags: Vec<String>,
}

impl CandidateRecord {
    /// 标签拼接为一行，用于日志展示
    pub fn tags_line(&self) -> String {
        self.tags.join(", ")
    }

    /// 当前正在写入的字段对应的可变字符串
    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Authors => &mut self.authors,
            Field::Abstract => &mut self.abstract_text,
        }
    }
}

/// 解析器当前所在的文本字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Authors,
    Abstract,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_line_keeps_order_and_duplicates() {
        let record = CandidateRecord {
            tags: vec![
                "cs.SE".to_string(),
                "cs.AI".to_string(),
                "cs.SE".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(record.tags_line(), "cs.SE, cs.AI, cs.SE");
    }

    #[test]
    fn test_field_mut() {
        let mut record = CandidateRecord::default();
        record.field_mut(Field::Abstract).push_str("abc");
        record.field_mut(Field::Abstract).push_str("def");
        assert_eq!(record.abstract_text, "abcdef");
        assert!(record.title.is_empty());
    }
}
