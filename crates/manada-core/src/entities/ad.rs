//! Ad entity - an advertiser's campaign and its review/payment lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Paused,
}

impl AdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }
}

impl fmt::Display for AdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PATCH actions; each is legal from exactly one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdAction {
    Approve,
    Reject,
    ProcessPayment,
    Pause,
    Resume,
}

impl AdAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ProcessPayment => "process_payment",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "process_payment" => Some(Self::ProcessPayment),
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            _ => None,
        }
    }

    /// Status the ad must be in for this action
    pub fn required_status(&self) -> AdStatus {
        match self {
            Self::Approve | Self::Reject => AdStatus::Pending,
            Self::ProcessPayment => AdStatus::Approved,
            Self::Pause => AdStatus::Active,
            Self::Resume => AdStatus::Paused,
        }
    }

    /// Status after the action succeeds
    pub fn next_status(&self) -> AdStatus {
        match self {
            Self::Approve => AdStatus::Approved,
            Self::Reject => AdStatus::Rejected,
            Self::ProcessPayment | Self::Resume => AdStatus::Active,
            Self::Pause => AdStatus::Paused,
        }
    }

    /// Review actions are reserved for administrators
    #[inline]
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Approve | Self::Reject)
    }
}

impl fmt::Display for AdAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ad {
    pub id: DocId,
    pub advertiser_id: DocId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub target_url: Option<String>,
    pub budget_cents: i64,
    pub status: AdStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable ad fields; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub target_url: Option<String>,
    pub budget_cents: Option<i64>,
}

impl Ad {
    /// Create a new ad awaiting review
    pub fn new(advertiser_id: DocId, title: String, description: String, budget_cents: i64) -> Self {
        let now = Utc::now();
        Self {
            id: DocId::generate(),
            advertiser_id,
            title,
            description,
            image_url: None,
            target_url: None,
            budget_cents,
            status: AdStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &DocId) -> bool {
        &self.advertiser_id == user_id
    }

    /// Apply a lifecycle action. The ad is left untouched on error.
    pub fn apply(&mut self, action: AdAction, reason: Option<String>) -> Result<(), DomainError> {
        if self.status != action.required_status() {
            return Err(DomainError::InvalidStatusTransition {
                action: action.as_str().to_string(),
                status: self.status.as_str().to_string(),
            });
        }
        self.status = action.next_status();
        if action == AdAction::Reject {
            self.rejection_reason = reason;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn edit(&mut self, update: AdUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(target_url) = update.target_url {
            self.target_url = Some(target_url);
        }
        if let Some(budget) = update.budget_cents {
            self.budget_cents = budget;
        }
        self.updated_at = Utc::now();
    }
}
