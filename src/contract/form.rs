use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::Api;
use crate::applicant::{Applicant, ApplicantId, InfluencerId};
use crate::campaign::CampaignId;
use crate::error::Error;
use crate::notice::Notices;
use crate::refresh::Refresh;
use crate::sequence::{RequestSequence, Ticket};
use crate::state::Failure;

use super::document::{DocumentHandle, DocumentRegistry};
use super::{Contract, ContractDraft, ContractRequest};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormPhase {
    Closed,
    Editing,
    PreviewPending,
    PreviewReady,
    SendPending,
}

impl FormPhase {
    pub fn name(self) -> &'static str {
        match self {
            FormPhase::Closed => "closed",
            FormPhase::Editing => "editing",
            FormPhase::PreviewPending => "preview-pending",
            FormPhase::PreviewReady => "preview-ready",
            FormPhase::SendPending => "send-pending",
        }
    }
}

struct Target {
    campaign_id: CampaignId,
    applicant_id: ApplicantId,
    influencer_id: InfluencerId,
}

struct Inner {
    phase: FormPhase,
    target: Option<Target>,
    draft: Option<ContractDraft>,
    preview: Option<DocumentHandle>,
    idempotency_key: Uuid,
    error: Option<Failure>,
    // ticket of the current open/close cycle
    ticket: Option<Ticket>,
}

impl Inner {
    fn closed() -> Inner {
        Inner {
            phase: FormPhase::Closed,
            target: None,
            draft: None,
            preview: None,
            idempotency_key: Uuid::nil(),
            error: None,
            ticket: None,
        }
    }

    fn request(&self) -> Option<ContractRequest> {
        let target = self.target.as_ref()?;
        Some(ContractRequest {
            campaign_id: target.campaign_id.clone(),
            applicant_id: target.applicant_id.clone(),
            influencer_id: target.influencer_id.clone(),
            draft: self.draft.clone()?,
        })
    }
}

pub struct ContractForm {
    api: Rc<dyn Api>,
    documents: DocumentRegistry,
    notices: Notices,
    list: Rc<dyn Refresh>,
    sequence: RequestSequence,
    inner: RefCell<Inner>,
}

impl ContractForm {
    pub fn new(
        api: Rc<dyn Api>,
        documents: DocumentRegistry,
        notices: Notices,
        list: Rc<dyn Refresh>,
    ) -> ContractForm {
        ContractForm {
            api,
            documents,
            notices,
            list,
            sequence: RequestSequence::new(),
            inner: RefCell::new(Inner::closed()),
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.inner.borrow().phase
    }

    pub fn draft(&self) -> Option<ContractDraft> {
        self.inner.borrow().draft.clone()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.inner.borrow().preview.as_ref().map(DocumentHandle::url)
    }

    pub fn last_error(&self) -> Option<Failure> {
        self.inner.borrow().error.clone()
    }

    pub fn can_preview(&self) -> bool {
        self.phase() == FormPhase::Editing
    }

    pub fn can_send(&self) -> bool {
        self.phase() == FormPhase::PreviewReady
    }

    #[tracing::instrument(skip(self, applicant), fields(applicant_id = ?applicant.id))]
    pub fn open(
        &self,
        campaign_id: &CampaignId,
        applicant: &Applicant,
        today: NaiveDate,
    ) -> Result<(), Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.phase != FormPhase::Closed {
            return Err(invalid("open", inner.phase));
        }

        *inner = Inner {
            phase: FormPhase::Editing,
            target: Some(Target {
                campaign_id: campaign_id.clone(),
                applicant_id: applicant.id.clone(),
                influencer_id: applicant.influencer_id.clone(),
            }),
            draft: Some(ContractDraft::for_applicant(applicant, today)),
            preview: None,
            idempotency_key: Uuid::new_v4(),
            error: None,
            ticket: Some(self.sequence.issue()),
        };
        debug!("contract form opened");

        Ok(())
    }

    pub fn edit<F>(&self, change: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ContractDraft),
    {
        let mut inner = self.inner.borrow_mut();
        if inner.phase != FormPhase::Editing {
            return Err(invalid("edit", inner.phase));
        }
        if let Some(draft) = inner.draft.as_mut() {
            change(draft);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn generate_preview(&self) -> Result<(), Error> {
        let (request, ticket) = {
            let mut inner = self.inner.borrow_mut();
            match inner.phase {
                FormPhase::Editing => {}
                FormPhase::PreviewPending => {
                    return Err(Error::ActionPending { action: "preview" })
                }
                phase => return Err(invalid("preview", phase)),
            }

            let request = match inner.request() {
                Some(request) => request,
                None => return Err(invalid("preview", inner.phase)),
            };
            if let Err(err) = request.draft.check_required() {
                inner.error = Some(Failure::from(&err));
                return Err(err);
            }

            inner.phase = FormPhase::PreviewPending;
            inner.error = None;
            (request, inner.ticket)
        };

        let result = self.api.contracts().generate_preview(&request).await;

        if !self.is_current(ticket) {
            // the form was closed while rendering; any document is dropped here
            return match result {
                Ok(_) => {
                    debug!("discarding preview for closed form");
                    Ok(())
                }
                Err(err) => {
                    warn!(%err, "preview for closed form failed");
                    Err(err)
                }
            };
        }

        let mut inner = self.inner.borrow_mut();
        match result {
            Ok(bytes) => {
                let handle = self.documents.acquire(bytes);
                debug!(url = %handle.url(), "preview ready");
                inner.preview = Some(handle);
                inner.phase = FormPhase::PreviewReady;
                Ok(())
            }
            Err(err) => {
                inner.phase = FormPhase::Editing;
                inner.error = Some(Failure::from(&err));
                drop(inner);
                self.notices.error(&err);
                Err(err)
            }
        }
    }

    pub fn discard_preview(&self) -> Result<(), Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.phase != FormPhase::PreviewReady {
            return Err(invalid("discard", inner.phase));
        }

        inner.preview.take();
        inner.phase = FormPhase::Editing;
        debug!("preview discarded");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn send(&self) -> Result<Contract, Error> {
        let (request, key, ticket) = {
            let mut inner = self.inner.borrow_mut();
            match inner.phase {
                FormPhase::PreviewReady => {}
                FormPhase::SendPending => return Err(Error::ActionPending { action: "send" }),
                phase => return Err(invalid("send", phase)),
            }

            let request = match inner.request() {
                Some(request) => request,
                None => return Err(invalid("send", inner.phase)),
            };
            inner.phase = FormPhase::SendPending;
            inner.error = None;
            (request, inner.idempotency_key, inner.ticket)
        };

        let result = self.api.contracts().send_contract(&request, key).await;
        let current = self.is_current(ticket);

        match result {
            Ok(contract) => {
                info!(contract_id = ?contract.id, "contract sent");
                if current {
                    self.reset();
                }
                self.notices.success("Contract sent");
                if let Err(err) = self.list.refresh().await {
                    warn!(%err, "refresh after sending contract failed");
                }
                Ok(contract)
            }
            Err(err) => {
                if current {
                    let mut inner = self.inner.borrow_mut();
                    inner.phase = FormPhase::PreviewReady;
                    inner.error = Some(Failure::from(&err));
                }
                self.notices.error(&err);
                Err(err)
            }
        }
    }

    /// Closes the form from any phase. A request still in flight is left to
    /// finish, but its outcome no longer touches this form.
    pub fn close(&self) {
        if self.phase() != FormPhase::Closed {
            debug!("contract form closed");
        }
        self.reset();
    }

    fn reset(&self) {
        self.sequence.invalidate();
        *self.inner.borrow_mut() = Inner::closed();
    }

    fn is_current(&self, ticket: Option<Ticket>) -> bool {
        ticket.map_or(false, |ticket| self.sequence.is_current(ticket))
    }
}

fn invalid(action: &'static str, phase: FormPhase) -> Error {
    Error::InvalidTransition {
        action,
        phase: phase.name(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::api::test::{respond, respond_after, MockApi};
    use crate::applicant::test::applicant;
    use crate::contract::ContractStatus;
    use crate::refresh::test::CountingRefresh;

    const PDF: &[u8] = b"%PDF-1.4 contract";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn sent(request: &ContractRequest) -> Contract {
        Contract {
            id: "k1".parse().unwrap(),
            campaign_id: request.campaign_id.clone(),
            applicant_id: request.applicant_id.clone(),
            status: ContractStatus::Sent,
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        form: ContractForm,
        documents: DocumentRegistry,
        list: Rc<CountingRefresh>,
        notices: Notices,
    }

    fn fixture(api: MockApi) -> Fixture {
        let documents = DocumentRegistry::new();
        let list = Rc::new(CountingRefresh::default());
        let notices = Notices::new();
        let form = ContractForm::new(
            Rc::new(api),
            documents.clone(),
            notices.clone(),
            list.clone(),
        );
        Fixture {
            form,
            documents,
            list,
            notices,
        }
    }

    fn open_filled(form: &ContractForm) {
        form.open(&"c1".parse().unwrap(), &applicant("a1", "Dana Reyes"), today())
            .unwrap();
        form.edit(|draft| {
            draft.brand_name = "Acme".into();
            draft.fee_amount = "1500".into();
            draft.payment_terms = "Net 30".into();
        })
        .unwrap();
    }

    #[test]
    fn open_prefills_date_and_influencer_name() {
        let f = fixture(MockApi::new());
        f.form
            .open(&"c1".parse().unwrap(), &applicant("a1", "Dana Reyes"), today())
            .unwrap();

        let draft = f.form.draft().unwrap();
        assert_eq!(draft.effective_date, today());
        assert_eq!(draft.influencer_name, "Dana Reyes");
        assert_eq!(f.form.phase(), FormPhase::Editing);
        assert!(f.form.can_preview());
    }

    #[test]
    fn open_twice_is_invalid() {
        let f = fixture(MockApi::new());
        open_filled(&f.form);
        assert_eq!(
            f.form
                .open(&"c1".parse().unwrap(), &applicant("a2", "Eli"), today())
                .unwrap_err(),
            Error::InvalidTransition {
                action: "open",
                phase: "editing"
            }
        );
    }

    #[tokio::test]
    async fn preview_requires_present_fields() {
        let f = fixture(MockApi::new());
        f.form
            .open(&"c1".parse().unwrap(), &applicant("a1", "Dana"), today())
            .unwrap();

        assert_eq!(
            f.form.generate_preview().await.unwrap_err(),
            Error::MissingField { field: "brandName" }
        );
        assert_eq!(f.form.phase(), FormPhase::Editing);
        assert_eq!(f.form.last_error().unwrap().code, "E4001002");
    }

    #[tokio::test]
    async fn discarding_preview_releases_document() {
        let mut api = MockApi::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        api.contracts.on_generate_preview = Box::new(move |request| {
            calls_clone.set(calls_clone.get() + 1);
            assert_eq!(request.draft.influencer_name, "Dana Reyes");
            respond(Ok(PDF.to_vec()))
        });
        let f = fixture(api);
        open_filled(&f.form);

        f.form.generate_preview().await.unwrap();
        let first_url = f.form.preview_url().unwrap();
        assert_eq!(f.form.phase(), FormPhase::PreviewReady);
        assert!(f.documents.is_live(&first_url));
        assert!(!f.form.can_preview());

        f.form.discard_preview().unwrap();
        assert_eq!(f.documents.live_count(), 0);
        assert_eq!(f.form.preview_url(), None);
        assert_eq!(f.form.phase(), FormPhase::Editing);

        f.form.generate_preview().await.unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(f.documents.live_count(), 1);
        assert!(!f.documents.is_live(&first_url));
    }

    #[tokio::test]
    async fn concurrent_preview_issues_one_request() {
        let mut api = MockApi::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        api.contracts.on_generate_preview = Box::new(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            respond_after(Duration::from_millis(10), Ok(PDF.to_vec()))
        });
        let f = fixture(api);
        open_filled(&f.form);

        let (first, second) = futures::join!(f.form.generate_preview(), f.form.generate_preview());

        first.unwrap();
        assert_eq!(
            second.unwrap_err(),
            Error::ActionPending { action: "preview" }
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(f.documents.live_count(), 1);
    }

    #[tokio::test]
    async fn preview_failure_returns_to_editing() {
        let mut api = MockApi::new();
        api.contracts.on_generate_preview = Box::new(|_| {
            respond(Err(Error::BackendRejected {
                status: 500,
                message: "renderer down".into(),
            }))
        });
        let f = fixture(api);
        open_filled(&f.form);

        assert!(f.form.generate_preview().await.is_err());
        assert_eq!(f.form.phase(), FormPhase::Editing);
        assert_eq!(f.form.last_error().unwrap().message, "renderer down");
        assert_eq!(f.notices.len(), 1);
        assert_eq!(f.documents.live_count(), 0);
    }

    #[tokio::test]
    async fn successful_send_closes_form_and_refreshes_once() {
        let mut api = MockApi::new();
        api.contracts.on_generate_preview = Box::new(|_| respond(Ok(PDF.to_vec())));
        api.contracts.on_send_contract = Box::new(|(request, _key)| respond(Ok(sent(&request))));
        let f = fixture(api);
        open_filled(&f.form);
        f.form.generate_preview().await.unwrap();
        assert!(f.form.can_send());

        let contract = f.form.send().await.unwrap();

        assert_eq!(contract.status, ContractStatus::Sent);
        assert_eq!(f.form.phase(), FormPhase::Closed);
        assert_eq!(f.form.draft(), None);
        assert_eq!(f.documents.live_count(), 0);
        assert_eq!(f.list.count.get(), 1);
    }

    #[tokio::test]
    async fn failed_send_keeps_preview_and_reuses_key() {
        let mut api = MockApi::new();
        let keys = Rc::new(RefCell::new(Vec::new()));
        let keys_clone = Rc::clone(&keys);
        api.contracts.on_generate_preview = Box::new(|_| respond(Ok(PDF.to_vec())));
        api.contracts.on_send_contract = Box::new(move |(request, key)| {
            keys_clone.borrow_mut().push(key);
            if keys_clone.borrow().len() == 1 {
                respond(Err(Error::BackendRejected {
                    status: 502,
                    message: "".into(),
                }))
            } else {
                respond(Ok(sent(&request)))
            }
        });
        let f = fixture(api);
        open_filled(&f.form);
        f.form.generate_preview().await.unwrap();

        assert!(f.form.send().await.is_err());
        assert_eq!(f.form.phase(), FormPhase::PreviewReady);
        assert_eq!(f.documents.live_count(), 1);
        assert_eq!(f.list.count.get(), 0);

        f.form.send().await.unwrap();
        let keys = keys.borrow();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
        assert_eq!(f.list.count.get(), 1);
    }

    #[tokio::test]
    async fn close_while_pending_releases_late_document() {
        let mut api = MockApi::new();
        api.contracts.on_generate_preview =
            Box::new(|_| respond_after(Duration::from_millis(10), Ok(PDF.to_vec())));
        let f = fixture(api);
        open_filled(&f.form);

        let preview = f.form.generate_preview();
        let close = async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            f.form.close();
        };
        let (result, ()) = futures::join!(preview, close);

        result.unwrap();
        assert_eq!(f.form.phase(), FormPhase::Closed);
        assert_eq!(f.documents.live_count(), 0);
    }

    #[tokio::test]
    async fn late_preview_failure_after_close_is_returned() {
        let mut api = MockApi::new();
        api.contracts.on_generate_preview = Box::new(|_| {
            respond_after(
                Duration::from_millis(10),
                Err(Error::BackendRejected {
                    status: 500,
                    message: "renderer down".into(),
                }),
            )
        });
        let f = fixture(api);
        open_filled(&f.form);

        let close = async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            f.form.close();
        };
        let (result, ()) = futures::join!(f.form.generate_preview(), close);

        assert_eq!(
            result.unwrap_err(),
            Error::BackendRejected {
                status: 500,
                message: "renderer down".into()
            }
        );
        assert_eq!(f.form.phase(), FormPhase::Closed);
        assert_eq!(f.form.last_error(), None);
        assert!(f.notices.is_empty());
    }

    #[tokio::test]
    async fn double_send_issues_one_request() {
        let mut api = MockApi::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        api.contracts.on_generate_preview = Box::new(|_| respond(Ok(PDF.to_vec())));
        api.contracts.on_send_contract = Box::new(move |(request, _key)| {
            calls_clone.set(calls_clone.get() + 1);
            respond_after(Duration::from_millis(10), Ok(sent(&request)))
        });
        let f = fixture(api);
        open_filled(&f.form);
        f.form.generate_preview().await.unwrap();

        let (first, second) = futures::join!(f.form.send(), f.form.send());

        first.unwrap();
        assert_eq!(second.unwrap_err(), Error::ActionPending { action: "send" });
        assert_eq!(calls.get(), 1);
        assert_eq!(f.list.count.get(), 1);
        assert_eq!(f.form.phase(), FormPhase::Closed);
    }

    #[tokio::test]
    async fn send_completing_after_close_still_refreshes() {
        let mut api = MockApi::new();
        api.contracts.on_generate_preview = Box::new(|_| respond(Ok(PDF.to_vec())));
        api.contracts.on_send_contract = Box::new(|(request, _key)| {
            respond_after(Duration::from_millis(10), Ok(sent(&request)))
        });
        let f = fixture(api);
        open_filled(&f.form);
        f.form.generate_preview().await.unwrap();

        let close = async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            assert_eq!(f.form.phase(), FormPhase::SendPending);
            f.form.close();
        };
        let (result, ()) = futures::join!(f.form.send(), close);

        assert_eq!(result.unwrap().id.as_str(), "k1");
        assert_eq!(f.form.phase(), FormPhase::Closed);
        assert_eq!(f.documents.live_count(), 0);
        assert_eq!(f.list.count.get(), 1);
    }

    #[tokio::test]
    async fn dropping_form_releases_preview() {
        let mut api = MockApi::new();
        api.contracts.on_generate_preview = Box::new(|_| respond(Ok(PDF.to_vec())));
        let f = fixture(api);
        open_filled(&f.form);
        f.form.generate_preview().await.unwrap();
        assert_eq!(f.documents.live_count(), 1);

        let documents = f.documents.clone();
        drop(f);
        assert_eq!(documents.live_count(), 0);
    }

    #[tokio::test]
    async fn actions_in_wrong_phase_are_rejected() {
        let f = fixture(MockApi::new());
        assert_eq!(
            f.form.send().await.unwrap_err(),
            Error::InvalidTransition {
                action: "send",
                phase: "closed"
            }
        );
        assert!(f.form.discard_preview().is_err());
        assert!(f.form.edit(|_| {}).is_err());
    }
}
