//! Sales leads and their lifecycle.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Amount, CustomerId, LeadId, LeadSource, LeadTitle, OrganizationId, TypeConstraintError, UserId,
};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown lead status `{s}`")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    pub organization_id: OrganizationId,
    pub customer_id: Option<CustomerId>,
    pub assigned_to: Option<UserId>,
    pub title: LeadTitle,
    pub status: LeadStatus,
    pub source: Option<LeadSource>,
    pub estimated_value: Amount,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Lead {
    pub fn is_converted(&self) -> bool {
        self.status == LeadStatus::Converted
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewLead {
    pub organization_id: OrganizationId,
    pub customer_id: Option<CustomerId>,
    pub assigned_to: Option<UserId>,
    pub title: LeadTitle,
    pub status: LeadStatus,
    pub source: Option<LeadSource>,
    pub estimated_value: Amount,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateLead {
    pub customer_id: Option<CustomerId>,
    pub assigned_to: Option<UserId>,
    pub title: LeadTitle,
    pub status: LeadStatus,
    pub source: Option<LeadSource>,
    pub estimated_value: Amount,
}

/// Lead counts of one organization.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct LeadStats {
    pub total: i64,
    pub by_status: BTreeMap<LeadStatus, i64>,
}

impl LeadStats {
    /// Builds stats from `(status, count)` rows, listing every status.
    pub fn from_counts(counts: impl IntoIterator<Item = (LeadStatus, i64)>) -> Self {
        let mut by_status: BTreeMap<LeadStatus, i64> =
            LeadStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for (status, count) in counts {
            *by_status.entry(status).or_default() += count;
        }
        Self {
            total: by_status.values().sum(),
            by_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!("Qualified".parse::<LeadStatus>(), Ok(LeadStatus::Qualified));
        assert!("archived".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn stats_list_every_status() {
        let stats = LeadStats::from_counts([(LeadStatus::New, 3), (LeadStatus::Lost, 1)]);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.len(), LeadStatus::ALL.len());
        assert_eq!(stats.by_status[&LeadStatus::Contacted], 0);
    }
}
