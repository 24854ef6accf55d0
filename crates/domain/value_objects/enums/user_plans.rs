use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserPlan {
    #[default]
    Free,
    Pro,
}

impl Display for UserPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan = match self {
            UserPlan::Free => "free",
            UserPlan::Pro => "pro",
        };
        write!(f, "{}", plan)
    }
}

impl UserPlan {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pro" => UserPlan::Pro,
            _ => UserPlan::Free,
        }
    }
}
