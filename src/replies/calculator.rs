use once_cell::sync::Lazy;
use regex::Regex;

/// Inputs at or above this length are never treated as arithmetic.
pub const MAX_EXPRESSION_LEN: usize = 200;

static ARITHMETIC_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-*/().\s]+$").expect("arithmetic pattern is valid"));

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EvalError {
    #[error("Not an arithmetic expression: {0}")]
    NotArithmetic(String),

    #[error("Cannot evaluate '{expression}': {reason}")]
    Invalid { expression: String, reason: String },

    #[error("Result of '{0}' is not a finite number")]
    NonFinite(String),
}

/// True when the input only uses digits, `+ - * / ( ) .` and whitespace.
pub fn looks_like_arithmetic(input: &str) -> bool {
    input.len() < MAX_EXPRESSION_LEN && ARITHMETIC_CHARS.is_match(input)
}

/// Evaluate a restricted arithmetic expression.
///
/// The character set is checked before parsing, so names and functions are
/// never reachable even though the parser understands them. `**` is the only
/// spelling of exponentiation; it maps onto the parser's `^`.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    if !looks_like_arithmetic(expression) {
        return Err(EvalError::NotArithmetic(expression.to_string()));
    }

    let normalized = expression.replace("**", "^");
    let mut no_names = |_: &str, _: Vec<f64>| -> Option<f64> { None };
    let value =
        fasteval::ez_eval(&normalized, &mut no_names).map_err(|e| EvalError::Invalid {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;

    if !value.is_finite() {
        return Err(EvalError::NonFinite(expression.to_string()));
    }
    Ok(value)
}

/// Render a result without a trailing `.0` for whole numbers.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
