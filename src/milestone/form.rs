use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::Api;
use crate::applicant::ApplicantId;
use crate::campaign::CampaignId;
use crate::error::Error;
use crate::notice::Notices;
use crate::refresh::Refresh;
use crate::sequence::{PendingFlag, RequestSequence, Ticket};
use crate::state::Failure;

use super::{CreateMilestoneBody, Milestone, MilestoneDraft};

struct Open {
    campaign_id: CampaignId,
    applicant_id: ApplicantId,
    draft: MilestoneDraft,
    idempotency_key: Uuid,
    error: Option<Failure>,
    ticket: Ticket,
}

pub struct MilestoneForm {
    api: Rc<dyn Api>,
    notices: Notices,
    list: Rc<dyn Refresh>,
    pending: PendingFlag,
    sequence: RequestSequence,
    open: RefCell<Option<Open>>,
}

impl MilestoneForm {
    pub fn new(api: Rc<dyn Api>, notices: Notices, list: Rc<dyn Refresh>) -> MilestoneForm {
        MilestoneForm {
            api,
            notices,
            list,
            pending: PendingFlag::new(),
            sequence: RequestSequence::new(),
            open: RefCell::new(None),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.borrow().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn draft(&self) -> Option<MilestoneDraft> {
        self.open.borrow().as_ref().map(|open| open.draft.clone())
    }

    pub fn last_error(&self) -> Option<Failure> {
        self.open.borrow().as_ref().and_then(|open| open.error.clone())
    }

    pub fn open(&self, campaign_id: &CampaignId, applicant_id: &ApplicantId) {
        *self.open.borrow_mut() = Some(Open {
            campaign_id: campaign_id.clone(),
            applicant_id: applicant_id.clone(),
            draft: MilestoneDraft::default(),
            idempotency_key: Uuid::new_v4(),
            error: None,
            ticket: self.sequence.issue(),
        });
        debug!(?campaign_id, ?applicant_id, "milestone form opened");
    }

    pub fn edit<F>(&self, change: F) -> Result<(), Error>
    where
        F: FnOnce(&mut MilestoneDraft),
    {
        match self.open.borrow_mut().as_mut() {
            Some(open) => {
                change(&mut open.draft);
                Ok(())
            }
            None => Err(Error::InvalidTransition {
                action: "edit",
                phase: "closed",
            }),
        }
    }

    pub fn close(&self) {
        self.sequence.invalidate();
        self.open.borrow_mut().take();
    }

    /// Creates the milestone. Success closes the form and refreshes the
    /// applicant list; failure keeps the form open with the error attached.
    /// If the form was closed or reopened meanwhile, only the refresh runs.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self) -> Result<Milestone, Error> {
        let _guard = self
            .pending
            .try_begin()
            .ok_or(Error::ActionPending { action: "add-milestone" })?;

        let (body, key, ticket) = {
            let mut open = self.open.borrow_mut();
            let open = match open.as_mut() {
                Some(open) => open,
                None => {
                    return Err(Error::InvalidTransition {
                        action: "submit",
                        phase: "closed",
                    })
                }
            };
            if let Err(err) = open.draft.check_required() {
                open.error = Some(Failure::from(&err));
                return Err(err);
            }
            open.error = None;

            let body = CreateMilestoneBody::from_draft(
                open.campaign_id.clone(),
                open.applicant_id.clone(),
                &open.draft,
            );
            (body, open.idempotency_key, open.ticket)
        };

        let result = self.api.milestones().create_milestone(&body, key).await;
        let current = self.sequence.is_current(ticket);

        match result {
            Ok(milestone) => {
                info!(milestone_id = ?milestone.id, "milestone created");
                if current {
                    self.close();
                }
                self.notices.success("Milestone added");
                if let Err(err) = self.list.refresh().await {
                    warn!(%err, "refresh after adding milestone failed");
                }
                Ok(milestone)
            }
            Err(err) => {
                if current {
                    if let Some(open) = self.open.borrow_mut().as_mut() {
                        open.error = Some(Failure::from(&err));
                    }
                }
                self.notices.error(&err);
                Err(err)
            }
        }
    }
}
