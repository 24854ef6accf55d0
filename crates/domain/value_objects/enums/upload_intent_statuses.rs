use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadIntentStatus {
    #[default]
    Pending,
    Finalized,
    Reconciled,
}

impl Display for UploadIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            UploadIntentStatus::Pending => "pending",
            UploadIntentStatus::Finalized => "finalized",
            UploadIntentStatus::Reconciled => "reconciled",
        };
        write!(f, "{}", status)
    }
}

impl UploadIntentStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "finalized" => UploadIntentStatus::Finalized,
            "reconciled" => UploadIntentStatus::Reconciled,
            _ => UploadIntentStatus::Pending,
        }
    }
}
