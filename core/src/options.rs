//! Options shared by every operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SolrError;
use crate::params::Params;

/// Response writer requested through the `wt` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = SolrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            other => Err(SolrError::Configuration(format!(
                "unsupported response format '{other}', expected 'json' or 'xml'"
            ))),
        }
    }
}

/// How the server should render its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub format: ResponseFormat,
    pub indent: bool,
}

impl OutputOptions {
    pub fn xml() -> Self {
        Self {
            format: ResponseFormat::Xml,
            ..Self::default()
        }
    }

    pub fn indented(mut self) -> Self {
        self.indent = true;
        self
    }

    fn indent_value(&self) -> &'static str {
        if self.indent {
            "on"
        } else {
            "off"
        }
    }

    /// Appends `wt` and `indent`; they always close the query string.
    pub(crate) fn apply(&self, params: &mut Params) {
        params
            .push("wt", self.format.as_str())
            .push("indent", self.indent_value());
    }

    /// Like `apply`, but keeps a `wt` or `indent` the caller already set.
    pub(crate) fn apply_unset(&self, params: &mut Params) {
        if params.get("wt").is_none() {
            params.push("wt", self.format.as_str());
        }
        if params.get("indent").is_none() {
            params.push("indent", self.indent_value());
        }
    }

    pub(crate) fn to_params(self) -> Params {
        let mut params = Params::new();
        self.apply(&mut params);
        params
    }
}
