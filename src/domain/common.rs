//! Tools available in every domain.

use serde_json::{Map, Value};

use super::data::DomainData;
use super::tool::{required_str, round_cents, Tool};
use crate::error::ToolError;

/// Evaluates an arithmetic expression over `+ - * / ( )` and decimals.
pub struct CalculateTool;

impl Tool for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Calculate the result of a mathematical expression, rounded to 2 decimal places."
    }

    fn invoke(
        &self,
        _data: &mut DomainData,
        args: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        let expression = required_str(self.name(), args, "expression")?;
        if !expression
            .chars()
            .all(|c| c.is_ascii_digit() || "+-*/(). ".contains(c))
        {
            return Ok("Error: invalid characters in expression".to_string());
        }
        Ok(match evaluate(expression) {
            Ok(value) => format_number(round_cents(value)),
            Err(message) => format!("Error: {}", message),
        })
    }
}

/// Records a thought; has no effect on the data.
pub struct ThinkTool;

impl Tool for ThinkTool {
    fn name(&self) -> &str {
        "think"
    }

    fn description(&self) -> &str {
        "Think about something without obtaining new information or changing the data."
    }

    fn invoke(
        &self,
        _data: &mut DomainData,
        args: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        required_str(self.name(), args, "thought")?;
        Ok(String::new())
    }
}

/// Hands the conversation to a human agent.
pub struct TransferToHumanAgentsTool;

impl Tool for TransferToHumanAgentsTool {
    fn name(&self) -> &str {
        "transfer_to_human_agents"
    }

    fn description(&self) -> &str {
        "Transfer the user to a human agent, with a summary of the user's issue."
    }

    fn invoke(
        &self,
        _data: &mut DomainData,
        args: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        required_str(self.name(), args, "summary")?;
        Ok("Transfer successful".to_string())
    }
}

/// Integral results print without a fractional part (`"12"`, not `"12.0"`).
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Recursive-descent evaluator:
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := ('+' | '-') factor | number | '(' expr ')'
/// ```
fn evaluate(expression: &str) -> Result<f64, String> {
    let tokens: Vec<char> = expression.chars().filter(|c| !c.is_whitespace()).collect();
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("unexpected '{}'", parser.tokens[parser.pos]));
    }
    Ok(value)
}

/// Maximum nesting of signs and parentheses.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.tokens.get(self.pos).copied()
    }

    /// Consume one token and parse what follows it one level deeper.
    fn nested(&mut self, parse: fn(&mut Self) -> Result<f64, String>) -> Result<f64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression too deeply nested".to_string());
        }
        self.pos += 1;
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err("division by zero".to_string());
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('-') => Ok(-self.nested(Self::factor)?),
            Some('+') => self.nested(Self::factor),
            Some('(') => {
                let value = self.nested(Self::expr)?;
                if self.peek() != Some(')') {
                    return Err("unbalanced parentheses".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
                    self.pos += 1;
                }
                let literal: String = self.tokens[start..self.pos].iter().collect();
                literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))
            }
            Some(c) => Err(format!("unexpected '{}'", c)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
