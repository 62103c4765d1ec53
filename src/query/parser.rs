//! 查询字符串解析
//!
//! 语法：
//!
//! ```text
//! expr := term ('/' term)*
//! term := '(' expr ')' | LABEL ('+' | '-')
//! ```
//!
//! 空白字符被忽略，`/` 左结合。例如 `"0+ / (1- / 2+)"`。

use crate::core::error::QueryError;
use crate::core::types::Step;
use crate::query::ast::QueryTree;

/// 将查询字符串解析为查询树
pub fn parse_query(input: &str) -> Result<QueryTree, QueryError> {
    let mut parser = QueryParser::new(input);
    let tree = parser.parse_expr()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("多余的字符 '{}'", c as char)));
    }
    Ok(tree)
}

struct QueryParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> QueryParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> QueryError {
        QueryError::Parse {
            position: self.pos,
            message: message.into(),
        }
    }

    fn parse_expr(&mut self) -> Result<QueryTree, QueryError> {
        let mut tree = self.parse_term()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'/') {
                return Ok(tree);
            }
            self.pos += 1;
            let right = self.parse_term()?;
            tree = QueryTree::concat(tree, right);
        }
    }

    fn parse_term(&mut self) -> Result<QueryTree, QueryError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.skip_whitespace();
                if self.peek() != Some(b')') {
                    return Err(self.error("缺少 ')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() => self.parse_step().map(QueryTree::Leaf),
            Some(c) => Err(self.error(format!("意外的字符 '{}'", c as char))),
            None => Err(self.error("查询意外结束")),
        }
    }

    fn parse_step(&mut self) -> Result<Step, QueryError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = std::str::from_utf8(&self.input[start..self.pos]).map_err(|_| self.error("非法标签"))?;
        let label: u32 = digits.parse().map_err(|_| QueryError::Parse {
            position: start,
            message: format!("标签超出范围: {}", digits),
        })?;

        self.skip_whitespace();
        let forward = match self.peek() {
            Some(b'+') => true,
            Some(b'-') => false,
            _ => return Err(self.error(format!("标签 {} 后缺少方向 '+' 或 '-'", label))),
        };
        self.pos += 1;
        Ok(Step::new(label, forward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_step() {
        assert_eq!(parse_query("0+"), Ok(QueryTree::leaf(Step::forward(0))));
        assert_eq!(parse_query(" 12- "), Ok(QueryTree::leaf(Step::reverse(12))));
    }

    #[test]
    fn test_parse_concatenation_is_left_associative() {
        let tree = parse_query("0+ / 1+ / 2-").expect("valid query");
        let expected = QueryTree::concat(
            QueryTree::concat(QueryTree::leaf(Step::forward(0)), QueryTree::leaf(Step::forward(1))),
            QueryTree::leaf(Step::reverse(2)),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_parse_parentheses() {
        let tree = parse_query("0+/(1-/2+)").expect("valid query");
        assert_eq!(tree.to_string(), "(0+/(1-/2+))");
        assert_eq!(parse_query(&tree.to_string()), Ok(tree));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_query(""), Err(QueryError::Parse { .. })));
        assert!(matches!(parse_query("0"), Err(QueryError::Parse { position: 1, .. })));
        assert!(matches!(parse_query("0+/"), Err(QueryError::Parse { .. })));
        assert!(matches!(parse_query("(0+"), Err(QueryError::Parse { .. })));
        assert!(matches!(parse_query("0+ 1+"), Err(QueryError::Parse { position: 3, .. })));
        assert!(matches!(parse_query("x+"), Err(QueryError::Parse { position: 0, .. })));
        assert!(matches!(parse_query("99999999999+"), Err(QueryError::Parse { .. })));
    }
}
