//! Structured audit trail.
//!
//! Mutating operations append an [`AuditEntry`] after the change is stored.
//! A failing append is logged and never fails the operation itself.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::repository::RepositoryError;

pub const DEFAULT_AUDIT_LIMIT: usize = 50;
pub const MAX_AUDIT_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: UserId,
    pub action: String,
    pub target: String,
    pub details: BTreeMap<String, String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor: &UserId, action: &str, target: impl Into<String>) -> Self {
        Self {
            actor: actor.clone(),
            action: action.to_string(),
            target: target.into(),
            details: BTreeMap::new(),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Query parameters for reading the trail back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFilter {
    pub actor: Option<UserId>,
    pub action: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.actor.as_ref().map_or(true, |actor| &entry.actor == actor)
            && self
                .action
                .as_deref()
                .map_or(true, |action| entry.action == action)
            && self.since.map_or(true, |since| entry.recorded_at >= since)
    }

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT)
    }
}

/// Append-only audit storage. Queries return newest entries first.
pub trait AuditLog: Send + Sync {
    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError>;
    fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, RepositoryError>;
}

/// Append `entry`, logging instead of propagating a storage failure.
pub fn record<L>(log: &L, entry: AuditEntry)
where
    L: AuditLog + ?Sized,
{
    let action = entry.action.clone();
    if let Err(error) = log.append_audit(entry) {
        tracing::warn!(%action, %error, "failed to append audit entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn filter_matches_on_every_populated_field() {
        let actor = UserId::new("rec-1");
        let entry = AuditEntry::new(&actor, "job.closed", "job-1").with_detail("reason", "filled");

        assert!(AuditFilter::default().matches(&entry));
        assert!(AuditFilter {
            actor: Some(actor.clone()),
            action: Some("job.closed".to_string()),
            since: Some(entry.recorded_at - Duration::minutes(1)),
            limit: None,
        }
        .matches(&entry));
        assert!(!AuditFilter {
            action: Some("job.created".to_string()),
            ..AuditFilter::default()
        }
        .matches(&entry));
        assert!(!AuditFilter {
            since: Some(entry.recorded_at + Duration::minutes(1)),
            ..AuditFilter::default()
        }
        .matches(&entry));
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(AuditFilter::default().limit(), DEFAULT_AUDIT_LIMIT);
        let filter = AuditFilter {
            limit: Some(10_000),
            ..AuditFilter::default()
        };
        assert_eq!(filter.limit(), MAX_AUDIT_LIMIT);
    }
}
