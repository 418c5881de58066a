use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::domain::bill::Bill;
use crate::domain::types::BillId;
use crate::dto::api::BillPage;
use crate::gateway::{BillGateway, GatewayError, GatewayResult};
use crate::repository::BillListQuery;

/// Name of the REST collection holding bills.
const COLLECTION: &str = "bills";

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Status(status.as_u16())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// [`BillGateway`] talking JSON over HTTP to the bill store.
#[derive(Clone, Debug)]
pub struct HttpBillGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBillGateway {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn collection_url(&self) -> GatewayResult<Url> {
        self.base_url
            .join(COLLECTION)
            .map_err(|e| GatewayError::InvalidUrl(e.to_string()))
    }

    /// `{base}/bills/{id}` with the id percent-encoded as one path segment.
    pub fn record_url(&self, id: &BillId) -> GatewayResult<Url> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    /// `{base}/bills?_page=..&_per_page=..&_sort=..[&field=value]`.
    pub fn list_url(&self, query: &BillListQuery) -> GatewayResult<Url> {
        let mut url = self.collection_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(pagination) = &query.pagination {
                pairs.append_pair("_page", &pagination.page.to_string());
                pairs.append_pair("_per_page", &pagination.per_page.to_string());
            }
            pairs.append_pair("_sort", &query.sort.to_string());
            if let Some(filter) = &query.filter {
                pairs.append_pair(filter.field.as_str(), &filter.value);
            }
        }
        Ok(url)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
    let response = check_status(response)?;
    response.json::<T>().await.map_err(GatewayError::from)
}

fn check_status(response: reqwest::Response) -> GatewayResult<reqwest::Response> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
        status if status.is_success() => Ok(response),
        status => Err(GatewayError::Status(status.as_u16())),
    }
}

#[async_trait]
impl BillGateway for HttpBillGateway {
    async fn list_bills(&self, query: &BillListQuery) -> GatewayResult<BillPage> {
        let url = self.list_url(query)?;
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn get_bill(&self, id: &BillId) -> GatewayResult<Bill> {
        let response = self.client.get(self.record_url(id)?).send().await?;
        read_json(response).await
    }

    async fn create_bill(&self, bill: &Bill) -> GatewayResult<Bill> {
        let response = self
            .client
            .post(self.collection_url()?)
            .json(bill)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_bill(&self, id: &BillId, bill: &Bill) -> GatewayResult<Bill> {
        let response = self
            .client
            .put(self.record_url(id)?)
            .json(bill)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_bill(&self, id: &BillId) -> GatewayResult<()> {
        let response = self.client.delete(self.record_url(id)?).send().await?;
        check_status(response).map(|_| ())
    }
}
