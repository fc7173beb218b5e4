use std::convert::TryFrom;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::ContractId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod actions;
pub mod api;
pub mod list;
pub use actions::ApplicantActions;
pub use list::{ApplicantList, ListParams};

pub type ApplicantId = TypedId<Applicant>;
pub type InfluencerId = TypedId<Influencer>;

/// Decoding enforces the record invariants: `accepted` and `rejected` never
/// hold together, and a contracted applicant always names its contract.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "ApplicantRecord", into = "ApplicantRecord")]
pub struct Applicant {
    pub id: ApplicantId,
    pub influencer_id: InfluencerId,
    pub name: String,
    pub category: Option<String>,
    pub followers: Option<String>,
    pub created_at: DateTime<Utc>,
    pub assigned: bool,
    pub decision: Decision,
    pub contract_id: Option<ContractId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Undecided,
    Accepted,
    Rejected { reason: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ApplicantStatus {
    Applied,
    Approved,
    Contracted { contract_id: ContractId },
    Accepted,
    Rejected { reason: Option<String> },
}

impl Applicant {
    pub fn is_contracted(&self) -> bool {
        self.contract_id.is_some()
    }

    pub fn status(&self) -> ApplicantStatus {
        match (&self.decision, &self.contract_id) {
            (Decision::Rejected { reason }, _) => ApplicantStatus::Rejected {
                reason: reason.clone(),
            },
            (Decision::Accepted, _) => ApplicantStatus::Accepted,
            (Decision::Undecided, Some(contract_id)) => ApplicantStatus::Contracted {
                contract_id: contract_id.clone(),
            },
            (Decision::Undecided, None) if self.assigned => ApplicantStatus::Approved,
            (Decision::Undecided, None) => ApplicantStatus::Applied,
        }
    }
}

impl TypedIdMarker for Applicant {
    fn tag() -> &'static str {
        "APL"
    }
}

pub struct Influencer;

impl TypedIdMarker for Influencer {
    fn tag() -> &'static str {
        "INF"
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantRecord {
    id: ApplicantId,
    influencer_id: InfluencerId,
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    followers: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    is_assigned: bool,
    #[serde(default)]
    is_accepted: bool,
    #[serde(default)]
    is_rejected: bool,
    #[serde(default)]
    rejection_reason: Option<String>,
    #[serde(default)]
    is_contracted: bool,
    #[serde(default)]
    contract_id: Option<ContractId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApplicantViolation {
    AcceptedAndRejected,
    ContractedWithoutContract,
}

impl Display for ApplicantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ApplicantViolation::AcceptedAndRejected => {
                f.write_str("applicant is both accepted and rejected")
            }
            ApplicantViolation::ContractedWithoutContract => {
                f.write_str("applicant is contracted but has no contract id")
            }
        }
    }
}

impl TryFrom<ApplicantRecord> for Applicant {
    type Error = ApplicantViolation;
    fn try_from(record: ApplicantRecord) -> Result<Applicant, ApplicantViolation> {
        let decision = match (record.is_accepted, record.is_rejected) {
            (true, true) => return Err(ApplicantViolation::AcceptedAndRejected),
            (true, false) => Decision::Accepted,
            (false, true) => Decision::Rejected {
                reason: record.rejection_reason,
            },
            (false, false) => Decision::Undecided,
        };

        let is_contracted = record.is_contracted;
        if is_contracted && record.contract_id.is_none() {
            return Err(ApplicantViolation::ContractedWithoutContract);
        }

        Ok(Applicant {
            id: record.id,
            influencer_id: record.influencer_id,
            name: record.name,
            category: record.category,
            followers: record.followers,
            created_at: record.created_at,
            assigned: record.is_assigned,
            decision,
            // a stale contract id without the contracted flag is not a contract
            contract_id: record.contract_id.filter(|_| is_contracted),
        })
    }
}

impl From<Applicant> for ApplicantRecord {
    fn from(applicant: Applicant) -> ApplicantRecord {
        let (is_accepted, is_rejected, rejection_reason) = match applicant.decision {
            Decision::Undecided => (false, false, None),
            Decision::Accepted => (true, false, None),
            Decision::Rejected { reason } => (false, true, reason),
        };

        ApplicantRecord {
            id: applicant.id,
            influencer_id: applicant.influencer_id,
            name: applicant.name,
            category: applicant.category,
            followers: applicant.followers,
            created_at: applicant.created_at,
            is_assigned: applicant.assigned,
            is_accepted,
            is_rejected,
            rejection_reason,
            is_contracted: applicant.contract_id.is_some(),
            contract_id: applicant.contract_id,
        }
    }
}
