use evalexpr::Value;

/// Результат разбора числового ввода
pub type InputResult = Result<f64, InputError>;

/// Ошибки разбора ввода в подписи
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Пустая строка
    Empty,
    /// Ошибка вычисления выражения
    EvaluationError(String),
    /// Результат не число
    InvalidType(String),
    /// NaN или бесконечность
    NotFinite,
    /// Ноль или отрицательное значение
    NotPositive(f64),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Empty => write!(f, "Empty input"),
            InputError::EvaluationError(msg) => write!(f, "Evaluation error: {}", msg),
            InputError::InvalidType(msg) => write!(f, "Invalid type: {}", msg),
            InputError::NotFinite => write!(f, "Value is not finite"),
            InputError::NotPositive(v) => write!(f, "Value must be positive, got {}", v),
        }
    }
}

impl std::error::Error for InputError {}

/// Суффиксы единиц, которые допускаются в конце ввода
const UNIT_SUFFIXES: &[&str] = &["deg", "°", "m"];

/// Вычислить числовое значение из текста подписи.
///
/// Принимает число, число с единицей ("10m", "90°") или выражение ("2*5").
pub fn parse_numeric_input(text: &str) -> InputResult {
    let mut trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    for suffix in UNIT_SUFFIXES {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            trimmed = stripped.trim_end();
            break;
        }
    }

    // Простое число без вычислителя
    let value = match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            let value = evalexpr::eval(trimmed)
                .map_err(|e| InputError::EvaluationError(e.to_string()))?;
            match value {
                Value::Float(f) => f,
                Value::Int(i) => i as f64,
                other => {
                    return Err(InputError::InvalidType(format!(
                        "Expected number, got {:?}",
                        other
                    )))
                }
            }
        }
    };

    if !value.is_finite() {
        return Err(InputError::NotFinite);
    }
    Ok(value)
}

/// То же, что parse_numeric_input, но отвергает значения <= 0
pub fn parse_positive_input(text: &str) -> InputResult {
    let value = parse_numeric_input(text)?;
    if value <= 0.0 {
        return Err(InputError::NotPositive(value));
    }
    Ok(value)
}
