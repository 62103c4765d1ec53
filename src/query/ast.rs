//! 查询树
//!
//! 仅含连接运算的查询树，采用标记变体表示：
//! 叶子保存一个遍历步骤，内部节点表示先左后右的顺序连接。
//! 查询树与优化器生成的计划树使用同一类型。

use std::fmt;

use crate::core::error::QueryError;
use crate::core::types::{PathSignature, Step, StepPath};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryTree {
    Leaf(Step),
    Concat(Box<QueryTree>, Box<QueryTree>),
}

impl QueryTree {
    pub fn leaf(step: Step) -> Self {
        QueryTree::Leaf(step)
    }

    pub fn concat(left: QueryTree, right: QueryTree) -> Self {
        QueryTree::Concat(Box::new(left), Box::new(right))
    }

    /// 由步骤序列构建左深树 `((s0/s1)/s2)/...`
    pub fn from_path(steps: &[Step]) -> Result<Self, QueryError> {
        let (first, rest) = steps.split_first().ok_or(QueryError::EmptyPath)?;
        Ok(rest
            .iter()
            .fold(QueryTree::Leaf(*first), |tree, step| {
                QueryTree::concat(tree, QueryTree::Leaf(*step))
            }))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, QueryTree::Leaf(_))
    }

    /// 展平为规范步骤序列
    pub fn flatten(&self) -> StepPath {
        let mut path = StepPath::default();
        self.collect_steps(&mut path);
        path
    }

    fn collect_steps(&self, path: &mut StepPath) {
        match self {
            QueryTree::Leaf(step) => path.push(*step),
            QueryTree::Concat(left, right) => {
                left.collect_steps(path);
                right.collect_steps(path);
            }
        }
    }

    /// 展平后序列的签名
    pub fn signature(&self) -> PathSignature {
        self.flatten().signature()
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            QueryTree::Leaf(_) => 1,
            QueryTree::Concat(left, right) => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            QueryTree::Leaf(_) => 1,
            QueryTree::Concat(left, right) => 1 + left.depth().max(right.depth()),
        }
    }
}

impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTree::Leaf(step) => write!(f, "{}", step),
            QueryTree::Concat(left, right) => write!(f, "({}/{})", left, right),
        }
    }
}
