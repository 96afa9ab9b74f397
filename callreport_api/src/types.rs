//! Wire types for the call report time series endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Report family selector passed as the `series` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    /// Consolidated Reports of Condition and Income (call report).
    Call,
    /// Uniform Bank Performance Report.
    Ubpr,
}

impl Series {
    pub fn as_str(&self) -> &'static str {
        match self {
            Series::Call => "call",
            Series::Ubpr => "ubpr",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported item from a bank's time series.
///
/// `mdrm` is the regulatory field code (e.g. `RCONF158`). Amount fields are
/// reported in thousands of dollars in `int_data`. Only one of the `*_data`
/// fields is populated, depending on `data_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub mdrm: String,
    #[serde(default)]
    pub rssd: Option<String>,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub int_data: Option<i64>,
    #[serde(default)]
    pub float_data: Option<f64>,
    #[serde(default)]
    pub bool_data: Option<bool>,
    #[serde(default)]
    pub str_data: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl MetricSample {
    /// Builds an integer sample with only the code and value set.
    pub fn int(mdrm: &str, value: i64) -> Self {
        Self {
            mdrm: mdrm.to_string(),
            rssd: None,
            quarter: None,
            int_data: Some(value),
            float_data: None,
            bool_data: None,
            str_data: None,
            data_type: Some("int".to_string()),
        }
    }
}
