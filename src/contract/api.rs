use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::http::HttpClient;

use super::{AcceptContractBody, Contract, ContractRequest};

const PREVIEW_CONTRACT: &str = "/contract/preview";
const SEND_CONTRACT: &str = "/contract/send";
const ACCEPT_CONTRACT: &str = "/contract/accept";

#[async_trait(?Send)]
pub trait ContractApi {
    async fn generate_preview(&self, request: &ContractRequest) -> Result<Vec<u8>, Error>;

    async fn send_contract(
        &self,
        request: &ContractRequest,
        idempotency_key: Uuid,
    ) -> Result<Contract, Error>;

    async fn accept_contract(&self, body: &AcceptContractBody) -> Result<Contract, Error>;
}

#[async_trait(?Send)]
impl ContractApi for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn generate_preview(&self, request: &ContractRequest) -> Result<Vec<u8>, Error> {
        let document = self.post_for_document(PREVIEW_CONTRACT, request).await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self))]
    async fn send_contract(
        &self,
        request: &ContractRequest,
        idempotency_key: Uuid,
    ) -> Result<Contract, Error> {
        let contract = self
            .post_json(SEND_CONTRACT, request, Some(idempotency_key))
            .await?;

        Ok(contract)
    }

    #[tracing::instrument(skip(self))]
    async fn accept_contract(&self, body: &AcceptContractBody) -> Result<Contract, Error> {
        let contract = self.post_json(ACCEPT_CONTRACT, body, None).await?;

        Ok(contract)
    }
}
