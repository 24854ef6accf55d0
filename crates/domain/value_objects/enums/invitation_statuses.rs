use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl InvitationStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "accepted" => InvitationStatus::Accepted,
            "rejected" => InvitationStatus::Rejected,
            _ => InvitationStatus::Pending,
        }
    }
}
