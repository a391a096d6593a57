use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use wayfare_shared::Masked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisaStatus {
    Pending,
    Approved,
    Rejected,
}

impl VisaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisaStatus::Pending => "pending",
            VisaStatus::Approved => "approved",
            VisaStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(VisaStatus::Pending),
            "approved" => Some(VisaStatus::Approved),
            "rejected" => Some(VisaStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for VisaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisaError {
    #[error("cannot {action} a visa application in status {current}")]
    InvalidState {
        action: &'static str,
        current: VisaStatus,
    },
}

/// A visa application. Status moves pending -> approved or pending ->
/// rejected; both end states are terminal. Field edits are allowed only
/// while pending, and approved applications cannot be deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisaApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub visa_type: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub passport_number: Masked<String>,
    pub nationality: String,
    pub status: VisaStatus,
    pub created_at: DateTime<Utc>,
}

impl VisaApplication {
    pub fn approve(&mut self) -> Result<(), VisaError> {
        self.transition("approve", VisaStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), VisaError> {
        self.transition("reject", VisaStatus::Rejected)
    }

    fn transition(&mut self, action: &'static str, to: VisaStatus) -> Result<(), VisaError> {
        if self.status != VisaStatus::Pending {
            return Err(VisaError::InvalidState {
                action,
                current: self.status,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Field edits are only permitted while the application is pending.
    pub fn ensure_editable(&self) -> Result<(), VisaError> {
        if self.status != VisaStatus::Pending {
            return Err(VisaError::InvalidState {
                action: "update",
                current: self.status,
            });
        }
        Ok(())
    }

    /// Approved visas are permanent once granted.
    pub fn ensure_deletable(&self) -> Result<(), VisaError> {
        if self.status == VisaStatus::Approved {
            return Err(VisaError::InvalidState {
                action: "delete",
                current: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_application() -> VisaApplication {
        VisaApplication {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            visa_type: "tourist".to_string(),
            destination: "Japan".to_string(),
            travel_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            passport_number: Masked("P1234567".to_string()),
            nationality: "Dutch".to_string(),
            status: VisaStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn approve_from_pending() {
        let mut visa = pending_application();
        visa.approve().unwrap();
        assert_eq!(visa.status, VisaStatus::Approved);
    }

    #[test]
    fn reject_from_pending() {
        let mut visa = pending_application();
        visa.reject().unwrap();
        assert_eq!(visa.status, VisaStatus::Rejected);
    }

    #[test]
    fn approved_is_terminal() {
        let mut visa = pending_application();
        visa.approve().unwrap();
        assert_eq!(
            visa.reject(),
            Err(VisaError::InvalidState {
                action: "reject",
                current: VisaStatus::Approved,
            })
        );
        assert_eq!(
            visa.approve(),
            Err(VisaError::InvalidState {
                action: "approve",
                current: VisaStatus::Approved,
            })
        );
    }

    #[test]
    fn edits_locked_after_decision() {
        let mut visa = pending_application();
        assert!(visa.ensure_editable().is_ok());
        visa.reject().unwrap();
        assert!(visa.ensure_editable().is_err());
    }

    #[test]
    fn approved_cannot_be_deleted() {
        let mut visa = pending_application();
        assert!(visa.ensure_deletable().is_ok());
        visa.approve().unwrap();
        assert!(visa.ensure_deletable().is_err());

        let mut rejected = pending_application();
        rejected.reject().unwrap();
        // Rejected applications may still be removed.
        assert!(rejected.ensure_deletable().is_ok());
    }
}
