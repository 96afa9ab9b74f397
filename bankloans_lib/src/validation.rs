use crate::error::LoanAnalysisError;
use crate::filter::Selector;

pub const MAX_SELECTOR_LENGTH: usize = 100;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, LoanAnalysisError> {
    if input.len() > max_len {
        return Err(LoanAnalysisError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized = strip_control_chars(input);
    if sanitized.is_empty() {
        return Err(LoanAnalysisError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Validate a reporting period. The text is passed to the service as-is, so
/// the only requirement is that something is left after sanitizing.
pub fn validate_reporting_period(input: &str) -> Result<String, LoanAnalysisError> {
    let period = strip_control_chars(input);
    if period.is_empty() {
        return Err(LoanAnalysisError::InvalidInput(
            "reporting period must be non-empty (e.g. 6/30/2024)".to_string(),
        ));
    }
    Ok(period)
}

/// Validate a selector value; empty input means `All`.
pub fn validate_selector(input: Option<&str>) -> Result<Selector, LoanAnalysisError> {
    match input {
        None => Ok(Selector::All),
        Some(raw) if raw.trim().is_empty() => Ok(Selector::All),
        Some(raw) => Ok(Selector::from(sanitize_text(raw, MAX_SELECTOR_LENGTH)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_passes_through_trimmed() {
        assert_eq!(validate_reporting_period(" 6/30/2024 ").unwrap(), "6/30/2024");
        assert_eq!(validate_reporting_period("2024-06-30").unwrap(), "2024-06-30");
    }

    #[test]
    fn period_empty_rejected() {
        assert!(validate_reporting_period("").is_err());
        assert!(validate_reporting_period("   ").is_err());
        assert!(validate_reporting_period("\t\n").is_err());
    }

    #[test]
    fn long_period_passes_through() {
        let period = "quarter ending ".repeat(10) + "6/30/2024";
        assert_eq!(validate_reporting_period(&period).unwrap(), period);
    }

    #[test]
    fn sanitize_strips_control_chars() {
        assert_eq!(sanitize_text("Tra\x07vis", 100).unwrap(), "Travis");
    }

    #[test]
    fn selector_defaults_to_all() {
        assert_eq!(validate_selector(None).unwrap(), Selector::All);
        assert_eq!(validate_selector(Some("")).unwrap(), Selector::All);
        assert_eq!(validate_selector(Some("ALL")).unwrap(), Selector::All);
    }

    #[test]
    fn selector_value_kept_verbatim() {
        assert_eq!(
            validate_selector(Some(" East Baton Rouge ")).unwrap(),
            Selector::value("East Baton Rouge")
        );
    }
}
