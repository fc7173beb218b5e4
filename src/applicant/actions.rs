use std::rc::Rc;

use tracing::info;

use crate::api::Api;
use crate::campaign::CampaignId;
use crate::contract::{AcceptContractBody, Contract, ContractId};
use crate::error::Error;
use crate::notice::Notices;
use crate::refresh::{reflect, Refresh};
use crate::sequence::PendingSet;

use super::api::{ApplicantRef, RejectApplicantBody};
use super::{Applicant, ApplicantId};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Target {
    Applicant(ApplicantId),
    Contract(ContractId),
}

pub struct ApplicantActions {
    api: Rc<dyn Api>,
    notices: Notices,
    list: Rc<dyn Refresh>,
    pending: PendingSet<Target>,
}

impl ApplicantActions {
    pub fn new(api: Rc<dyn Api>, notices: Notices, list: Rc<dyn Refresh>) -> ApplicantActions {
        ApplicantActions {
            api,
            notices,
            list,
            pending: PendingSet::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.any_pending()
    }

    pub fn is_applicant_pending(&self, applicant_id: &ApplicantId) -> bool {
        self.pending.is_pending(&Target::Applicant(applicant_id.clone()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn approve(
        &self,
        campaign_id: &CampaignId,
        applicant_id: &ApplicantId,
    ) -> Result<Applicant, Error> {
        let target = ApplicantRef {
            campaign_id: campaign_id.clone(),
            applicant_id: applicant_id.clone(),
        };
        let applicant = self
            .run("approve", Target::Applicant(applicant_id.clone()), async {
                self.api.applicants().approve_applicant(&target).await
            })
            .await?;
        self.notices.success(format!("{} approved", applicant.name));

        Ok(applicant)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reject(
        &self,
        campaign_id: &CampaignId,
        applicant_id: &ApplicantId,
        reason: Option<String>,
    ) -> Result<Applicant, Error> {
        let body = RejectApplicantBody {
            campaign_id: campaign_id.clone(),
            applicant_id: applicant_id.clone(),
            reason: reason.filter(|reason| !reason.trim().is_empty()),
        };
        let applicant = self
            .run("reject", Target::Applicant(applicant_id.clone()), async {
                self.api.applicants().reject_applicant(&body).await
            })
            .await?;
        self.notices.success(format!("{} rejected", applicant.name));

        Ok(applicant)
    }

    #[tracing::instrument(skip(self))]
    pub async fn accept_contract(&self, contract_id: &ContractId) -> Result<Contract, Error> {
        let body = AcceptContractBody {
            contract_id: contract_id.clone(),
        };
        let contract = self
            .run("accept-contract", Target::Contract(contract_id.clone()), async {
                self.api.contracts().accept_contract(&body).await
            })
            .await?;
        info!(contract_id = ?contract.id, "contract accepted");
        self.notices.success("Contract accepted");

        Ok(contract)
    }

    async fn run<T, F>(&self, action: &'static str, target: Target, call: F) -> Result<T, Error>
    where
        F: std::future::Future<Output = Result<T, Error>>,
    {
        let _guard = self
            .pending
            .try_begin(target)
            .ok_or(Error::ActionPending { action })?;

        reflect(call, &*self.list).await.map_err(|err| {
            self.notices.error(&err);
            err
        })
    }
}
