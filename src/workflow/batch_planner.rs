//! 分组与提示词构建 - 流程层
//!
//! 把候选论文按固定大小切分成组，每组渲染成一条提示词。
//! 组号和组内位置可以还原出论文在原序列中的位置：`group * GROUP_SIZE + local`。

use std::ops::Range;

use crate::models::{CandidateRecord, Prompt};

/// 每组论文数量
///
/// 分组和下标还原必须使用同一个值
pub const GROUP_SIZE: usize = 5;

const SYSTEM_MESSAGE: &str = "You are a helpful assistant. You are helping a busy researcher by selecting valuable papers that he may have interest in from some candidate papers.";

/// 一个分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// 组号（从 0 开始）
    pub index: usize,
    /// 组内第一篇论文在原序列中的位置
    pub start: usize,
    /// 组内论文数量（1..=GROUP_SIZE）
    pub len: usize,
    pub prompt: Prompt,
}

impl PlannedGroup {
    /// 组内下标对应的原序列下标，越界时返回 None
    pub fn global_index(&self, local: usize) -> Option<usize> {
        (local < self.len).then(|| global_index(self.index, local))
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// 组号 + 组内下标 → 原序列下标
pub fn global_index(group: usize, local: usize) -> usize {
    group * GROUP_SIZE + local
}

/// 分组数量：ceil(n / GROUP_SIZE)
pub fn group_count(record_count: usize) -> usize {
    record_count.div_ceil(GROUP_SIZE)
}

/// 切分并为每组生成提示词
///
/// 没有论文时返回空列表
pub fn plan(records: &[CandidateRecord], interests: &[String]) -> Vec<PlannedGroup> {
    let interested_topics = render_interests(interests);

    records
        .chunks(GROUP_SIZE)
        .enumerate()
        .map(|(index, group)| PlannedGroup {
            index,
            start: index * GROUP_SIZE,
            len: group.len(),
            prompt: Prompt::new(SYSTEM_MESSAGE, render_group(group, &interested_topics)),
        })
        .collect()
}

fn render_interests(interests: &[String]) -> String {
    interests
        .iter()
        .map(|interest| format!("- {}\n", interest))
        .collect()
}

fn render_record(record: &CandidateRecord) -> String {
    format!(
        "Title: {}\nAbstract:\n{}",
        record.title, record.abstract_text
    )
}

fn render_group(group: &[CandidateRecord], interested_topics: &str) -> String {
    let candidate_papers: String = group
        .iter()
        .enumerate()
        .map(|(j, record)| format!("\n## {}\n{}\n", j + 1, render_record(record)))
        .collect();

    let prompt = format!(
        r#"I have found {num_results} papers from the paper database. Please help me to choose some of them to read according to my interests by giving your response in a standard format.

# Candidate Papers
{candidate_papers}

# Intereted Topics
{interested_topics}

# Response Format
You should read through the papers' title and abstract carefully to identify whether the paper is a good choice for me.
You should FIRST give your reasons for recommending or rejecting the paper in the format of a numbered LISTING. Please state carefully about whether the selected papers have relationship to my interets. Don't be too verbose, though (at most two sentences for each paper are fine).
THEN you should conclude your recommendation in the format of an ARRAY. For example, if you want to choose the first and the third paper, you can give a "[1,3]". However, if you want to choose all of them, you can give a "[all]"; if you don't want to choose any of them, you can give a "[none]".
"#,
        num_results = group.len(),
    );

    prompt.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<CandidateRecord> {
        (0..n)
            .map(|i| CandidateRecord {
                title: format!("Paper {}", i),
                abstract_text: format!("Abstract {}", i),
                tags: vec!["cs.SE".to_string()],
                ..Default::default()
            })
            .collect()
    }

    fn interests() -> Vec<String> {
        vec!["program repair".to_string(), "LLM agents".to_string()]
    }

    #[test]
    fn test_group_sizes() {
        for n in [1usize, 4, 5, 6, 10, 12, 23] {
            let groups = plan(&records(n), &interests());
            assert_eq!(groups.len(), group_count(n), "n = {}", n);
            for group in &groups[..groups.len() - 1] {
                assert_eq!(group.len, GROUP_SIZE);
            }
            let last = groups.last().unwrap();
            assert_eq!(last.len, n - GROUP_SIZE * (groups.len() - 1));
        }
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(plan(&[], &interests()).is_empty());
        assert_eq!(group_count(0), 0);
    }

    #[test]
    fn test_global_index_covers_sequence_once() {
        let n = 12;
        let groups = plan(&records(n), &interests());
        let mut seen = Vec::new();
        for group in &groups {
            for local in 0..group.len {
                let global = group.global_index(local).unwrap();
                assert!(group.range().contains(&global));
                seen.push(global);
            }
            assert_eq!(group.global_index(group.len), None);
        }
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
        assert_eq!(global_index(2, 0), 10);
    }

    #[test]
    fn test_prompt_contents() {
        let groups = plan(&records(7), &interests());
        let second = &groups[1].prompt;

        assert!(second.system.contains("busy researcher"));
        assert!(second.user.starts_with("I have found 2 papers"));
        assert!(second.user.contains("## 1\nTitle: Paper 5\nAbstract:\nAbstract 5"));
        assert!(second.user.contains("## 2\nTitle: Paper 6"));
        assert!(!second.user.contains("Paper 4"));
        assert!(second.user.contains("- program repair\n- LLM agents\n"));
        assert!(second.user.ends_with("\"[none]\"."));
        // 标签不进入提示词
        assert!(!second.user.contains("cs.SE"));
    }

    #[test]
    fn test_interests_repeated_in_every_prompt() {
        let groups = plan(&records(11), &interests());
        assert!(groups
            .iter()
            .all(|g| g.prompt.user.contains("- program repair\n")));
    }
}
