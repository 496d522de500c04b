use chrono::{DateTime, Utc};
use ledger_db::UsageTotalsForUser;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use crate::util::time::format_timestamp;

/// Milestones re-evaluated after each accepted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    FirstDay,
    WeekLogged,
    Cost100,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::FirstDay, Badge::WeekLogged, Badge::Cost100];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstDay => "first_day",
            Self::WeekLogged => "week_logged",
            Self::Cost100 => "cost_100",
        }
    }

    pub fn is_earned(&self, totals: &UsageTotalsForUser) -> bool {
        match self {
            Self::FirstDay => totals.days >= 1,
            Self::WeekLogged => totals.days >= 7,
            Self::Cost100 => totals.cost_usd >= 100.0,
        }
    }
}

#[derive(Clone)]
pub struct BadgeService {
    config: SharedConfig,
}

impl BadgeService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Awards every earned badge the user does not hold yet and returns the new ones.
    pub fn evaluate(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Badge>> {
        let db = open_db(&self.config)?;
        let totals = db.usage_totals_for_user(user_id)?;
        let now = format_timestamp(now);
        let mut awarded = Vec::new();
        for badge in Badge::ALL {
            if badge.is_earned(&totals) && db.award_badge(user_id, badge.as_str(), &now)? {
                awarded.push(badge);
            }
        }
        Ok(awarded)
    }

    pub fn list(&self, user_id: &str) -> Result<Vec<String>> {
        let db = open_db(&self.config)?;
        Ok(db.list_badges(user_id)?)
    }
}
