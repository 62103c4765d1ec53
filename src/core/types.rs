//! 核心类型定义
//!
//! 包含查询引擎各层共享的基础类型：
//! - 顶点与标签标识
//! - 遍历步骤 `Step` 与步骤序列 `StepPath`
//! - 步骤序列签名 `PathSignature`（缓存键）
//! - 基数统计 `CardStat`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Range};

/// 顶点标识，取值范围 `[0, V)`
pub type VertexId = u32;

/// 边标签标识，取值范围 `[0, L)`
pub type LabelId = u32;

/// 遍历步骤
///
/// 一次沿指定标签的边遍历。`forward == false` 表示逆着边的存储方向遍历。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Step {
    pub label: LabelId,
    pub forward: bool,
}

impl Step {
    pub fn new(label: LabelId, forward: bool) -> Self {
        Self { label, forward }
    }

    /// 正向步骤 `label+`
    pub fn forward(label: LabelId) -> Self {
        Self::new(label, true)
    }

    /// 反向步骤 `label-`
    pub fn reverse(label: LabelId) -> Self {
        Self::new(label, false)
    }

    pub fn direction_char(&self) -> char {
        if self.forward {
            '+'
        } else {
            '-'
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, self.direction_char())
    }
}

/// 步骤序列
///
/// 仅含连接运算的查询树展平后的规范形式。括号结构不同但展平结果相同的
/// 两棵查询树语义等价，并共享同一个缓存条目。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StepPath(Vec<Step>);

impl StepPath {
    pub fn new(steps: Vec<Step>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    /// 取子序列 `[range.start, range.end)`
    pub fn slice(&self, range: Range<usize>) -> StepPath {
        StepPath(self.0[range].to_vec())
    }

    /// 在 `split` 之后切分：左侧为 `[0..=split]`，右侧为 `(split..n)`
    pub fn split_after(&self, split: usize) -> (StepPath, StepPath) {
        let (left, right) = self.0.split_at(split + 1);
        (StepPath(left.to_vec()), StepPath(right.to_vec()))
    }

    pub fn signature(&self) -> PathSignature {
        PathSignature::from_steps(&self.0)
    }
}

impl Deref for StepPath {
    type Target = [Step];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Step>> for StepPath {
    fn from(steps: Vec<Step>) -> Self {
        Self(steps)
    }
}

impl FromIterator<Step> for StepPath {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for StepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// 步骤序列签名
///
/// 规范编码为各步骤 `"<label><+|->"` 的直接拼接，例如 `"0+1-"`。
/// 与树形无关，只由展平后的序列决定。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSignature(String);

impl PathSignature {
    pub fn from_steps(steps: &[Step]) -> Self {
        let mut encoded = String::with_capacity(steps.len() * 3);
        for step in steps {
            encoded.push_str(&step.label.to_string());
            encoded.push(step.direction_char());
        }
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 基数统计
///
/// - `no_out`: 至少有一条结果路径的不同源点数
/// - `no_paths`: 各源点不同 (源点, 终点) 对数量之和
/// - `no_in`: 被到达的不同终点数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardStat {
    pub no_out: u64,
    pub no_paths: u64,
    pub no_in: u64,
}

impl CardStat {
    pub fn new(no_out: u64, no_paths: u64, no_in: u64) -> Self {
        Self {
            no_out,
            no_paths,
            no_in,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// 任一字段为零
    pub fn has_zero_field(&self) -> bool {
        self.no_out == 0 || self.no_paths == 0 || self.no_in == 0
    }

    /// 交换源点与终点计数，用于反向步骤
    pub fn swapped(self) -> Self {
        Self {
            no_out: self.no_in,
            no_paths: self.no_paths,
            no_in: self.no_out,
        }
    }
}

impl fmt::Display for CardStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.no_out, self.no_paths, self.no_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_encoding() {
        let path = StepPath::new(vec![Step::forward(0), Step::reverse(12), Step::forward(3)]);
        assert_eq!(path.signature().as_str(), "0+12-3+");
        assert_eq!(path.to_string(), "0+/12-/3+");
    }

    #[test]
    fn test_signature_is_unambiguous_across_label_widths() {
        let a = StepPath::new(vec![Step::forward(1), Step::forward(12)]);
        let b = StepPath::new(vec![Step::forward(11), Step::forward(2)]);
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_split_after() {
        let path: StepPath = (0..4).map(Step::forward).collect();
        let (left, right) = path.split_after(1);
        assert_eq!(left.steps(), &[Step::forward(0), Step::forward(1)]);
        assert_eq!(right.steps(), &[Step::forward(2), Step::forward(3)]);
        assert_eq!(path.slice(1..3).len(), 2);
    }

    #[test]
    fn test_card_stat_swapped() {
        let stat = CardStat::new(3, 10, 7);
        assert_eq!(stat.swapped(), CardStat::new(7, 10, 3));
        assert!(!stat.has_zero_field());
        assert!(CardStat::new(1, 0, 1).has_zero_field());
        assert_eq!(stat.to_string(), "(3, 10, 7)");
    }
}
