use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("round {round_index} is out of range for a sequence of {len} rounds")]
    OutOfRange { round_index: u32, len: usize },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid bet entry: {0}")]
    InvalidEntry(String),
    #[error("invalid CSV rows at lines {}", join_lines(.0))]
    InvalidRows(Vec<usize>),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn join_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<(), CalcError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::InvalidParameter(format!("{name} must be a finite number")))
    }
}

pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<(), CalcError> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::InvalidParameter(format!("{name} must be > 0")))
    }
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<(), CalcError> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(CalcError::InvalidParameter(format!("{name} must be >= 0")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_rows_message_lists_every_line() {
        let err = LedgerError::InvalidRows(vec![2, 5, 9]);
        assert_eq!(err.to_string(), "invalid CSV rows at lines 2, 5, 9");
    }

    #[test]
    fn ensure_positive_rejects_nan_and_zero() {
        assert!(ensure_positive("stake", f64::NAN).is_err());
        assert!(ensure_positive("stake", 0.0).is_err());
        assert!(ensure_positive("stake", 0.01).is_ok());
    }
}
