//! Coverage information
//!
//! Coverage is not translated; every payload carrying it replaces it.

use crate::dto::CoverageInfoData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageInfoCi {
    pub level: String,
    pub is_live: bool,
    pub includes: Vec<String>,
    pub covered_from: Option<String>,
}

impl From<&CoverageInfoData> for CoverageInfoCi {
    fn from(data: &CoverageInfoData) -> Self {
        Self {
            level: data.level.clone(),
            is_live: data.live_coverage,
            includes: data.includes.clone(),
            covered_from: data.covered_from.clone(),
        }
    }
}
