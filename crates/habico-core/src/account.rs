//! The local user profile and plan tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Monthly,
    Lifetime,
}

impl Plan {
    /// Paid plans unlock insights, suggestions and unlimited chat.
    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Free)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Monthly => "monthly",
            Plan::Lifetime => "lifetime",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "monthly" => Ok(Plan::Monthly),
            "lifetime" => Ok(Plan::Lifetime),
            other => Err(ValidationError::InvalidValue {
                field: "plan".into(),
                message: format!("expected free, monthly or lifetime, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub plan: Plan,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: "Friend".into(),
            email: "friend@habico.app".into(),
            plan: Plan::Free,
        }
    }
}

/// Partial profile update; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub plan: Option<Plan>,
}

impl User {
    /// Apply a profile edit. Blank names or emails are refused and leave
    /// the profile untouched.
    pub fn apply(&mut self, update: UserUpdate) -> Result<(), ValidationError> {
        let name = non_blank("name", update.name)?;
        let email = non_blank("email", update.email)?;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(plan) = update.plan {
            self.plan = plan;
        }
        Ok(())
    }
}

fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(ValidationError::EmptyField {
            field: field.into(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_user_is_free_friend() {
        let user = User::default();
        assert_eq!(user.name, "Friend");
        assert!(!user.plan.is_paid());
    }

    #[test]
    fn plan_parses_case_insensitively() {
        assert_eq!("Lifetime".parse::<Plan>().unwrap(), Plan::Lifetime);
        assert!("weekly".parse::<Plan>().is_err());
    }

    #[test]
    fn missing_plan_loads_as_free() {
        let user: User = serde_json::from_str(r#"{"name":"Ana","email":"a@b.c"}"#).unwrap();
        assert_eq!(user.plan, Plan::Free);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut user = User::default();
        user.apply(UserUpdate {
            plan: Some(Plan::Monthly),
            ..UserUpdate::default()
        })
        .unwrap();
        assert_eq!(user.name, "Friend");
        assert_eq!(user.plan, Plan::Monthly);
    }

    #[test]
    fn blank_name_is_refused() {
        let mut user = User::default();
        let err = user
            .apply(UserUpdate {
                name: Some("  ".into()),
                plan: Some(Plan::Lifetime),
                ..UserUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { .. }));
        assert_eq!(user.plan, Plan::Free);
    }
}
