//! Deals moving through the sales pipeline.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Amount, CustomerId, DealId, DealTitle, LeadId, OrganizationId, TypeConstraintError, UserId,
};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    #[default]
    Prospecting,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    pub const ALL: [DealStage; 4] = [
        DealStage::Prospecting,
        DealStage::Negotiation,
        DealStage::Won,
        DealStage::Lost,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DealStage::Prospecting => "prospecting",
            DealStage::Negotiation => "negotiation",
            DealStage::Won => "won",
            DealStage::Lost => "lost",
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, DealStage::Won | DealStage::Lost)
    }

    /// `closed_at` after moving a deal from its current state into `self`.
    ///
    /// Closing keeps an existing timestamp, reopening clears it.
    pub fn closed_at(
        self,
        previous: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        if self.is_closed() {
            Some(previous.unwrap_or(now))
        } else {
            None
        }
    }
}

impl Display for DealStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStage {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        DealStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown deal stage `{s}`")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    pub id: DealId,
    pub organization_id: OrganizationId,
    pub customer_id: Option<CustomerId>,
    /// Lead this deal was converted from.
    pub lead_id: Option<LeadId>,
    pub owner_id: Option<UserId>,
    pub title: DealTitle,
    pub stage: DealStage,
    pub amount: Amount,
    pub closed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDeal {
    pub organization_id: OrganizationId,
    pub customer_id: Option<CustomerId>,
    pub lead_id: Option<LeadId>,
    pub owner_id: Option<UserId>,
    pub title: DealTitle,
    pub stage: DealStage,
    pub amount: Amount,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateDeal {
    pub customer_id: Option<CustomerId>,
    pub owner_id: Option<UserId>,
    pub title: DealTitle,
    pub stage: DealStage,
    pub amount: Amount,
}

/// Pipeline figures of one organization.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct DealStats {
    pub total: i64,
    pub by_stage: BTreeMap<DealStage, i64>,
    /// Sum of amounts of deals that are still open.
    pub pipeline_amount: i64,
    pub won_amount: i64,
}

impl DealStats {
    /// Builds stats from `(stage, count, amount sum)` rows.
    pub fn from_rows(rows: impl IntoIterator<Item = (DealStage, i64, i64)>) -> Self {
        let mut stats = DealStats {
            by_stage: DealStage::ALL.into_iter().map(|s| (s, 0)).collect(),
            ..Default::default()
        };
        for (stage, count, amount) in rows {
            *stats.by_stage.entry(stage).or_default() += count;
            stats.total += count;
            match stage {
                DealStage::Won => stats.won_amount += amount,
                DealStage::Lost => {}
                _ => stats.pipeline_amount += amount,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn closing_stamps_and_reopening_clears() {
        let now = Utc::now().naive_utc();
        let earlier = now - Duration::days(2);

        assert_eq!(DealStage::Won.closed_at(None, now), Some(now));
        assert_eq!(DealStage::Lost.closed_at(Some(earlier), now), Some(earlier));
        assert_eq!(DealStage::Negotiation.closed_at(Some(earlier), now), None);
    }

    #[test]
    fn stats_split_pipeline_and_won_amounts() {
        let stats = DealStats::from_rows([
            (DealStage::Prospecting, 2, 300),
            (DealStage::Negotiation, 1, 200),
            (DealStage::Won, 1, 1_000),
            (DealStage::Lost, 3, 50),
        ]);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.pipeline_amount, 500);
        assert_eq!(stats.won_amount, 1_000);
        assert_eq!(stats.by_stage[&DealStage::Lost], 3);
    }
}
