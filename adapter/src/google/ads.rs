use std::time::Duration;

use async_trait::async_trait;
use primitives::{util::ApiUrl, Operation, ResourceKind};
use reqwest::Client;
use serde_json::{json, Value};

use super::json_response;
use crate::{AdsPlatform, Error};

/// Google Ads REST client submitting `{kind}:mutate` batches for one customer.
#[derive(Debug, Clone)]
pub struct GoogleAds {
    api_url: ApiUrl,
    client: Client,
    token: Option<String>,
    customer_id: Option<String>,
}

impl GoogleAds {
    /// Missing credentials only fail the first non-empty batch.
    pub fn new(
        api_url: ApiUrl,
        token: Option<String>,
        customer_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::request)?;

        Ok(Self {
            api_url,
            client,
            token,
            customer_id,
        })
    }
}

#[async_trait]
impl AdsPlatform for GoogleAds {
    async fn create(&self, kind: ResourceKind, operations: Vec<Operation>) -> Result<Value, Error> {
        if operations.is_empty() {
            return Ok(Value::Null);
        }

        let customer_id = self
            .customer_id
            .as_deref()
            .ok_or_else(|| Error::missing_credentials("GOOGLE_ADS_CUSTOMER_ID"))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::missing_credentials("GOOGLE_ADS_TOKEN"))?;

        let url = self
            .api_url
            .segments(["customers", customer_id, kind.endpoint()]);
        let operations: Vec<Value> = operations
            .into_iter()
            .map(|operation| json!({ "create": operation }))
            .collect();

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "operations": operations }))
            .send()
            .await
            .map_err(Error::request)?;

        json_response(response).await
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::Kind;

    fn client(server: &MockServer, token: Option<&str>, customer_id: Option<&str>) -> GoogleAds {
        let api_url = server.uri().parse().expect("Should parse the mock server url");

        GoogleAds::new(
            api_url,
            token.map(ToOwned::to_owned),
            customer_id.map(ToOwned::to_owned),
            Duration::from_secs(5),
        )
        .expect("Should build client")
    }

    fn operation(value: Value) -> Operation {
        match value {
            Value::Object(map) => map,
            _ => panic!("Operation should be a json object"),
        }
    }

    #[tokio::test]
    async fn posts_every_operation_as_create() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/customers/123-456/adGroupCriteria:mutate"))
            .and(header("authorization", "Bearer ads-token"))
            .and(body_json(json!({
                "operations": [
                    { "create": { "parentId": "G-1", "keywordText": "red shoes", "action": "create" } },
                    { "create": { "parentId": "G-1", "keywordText": "blue shoes", "action": "create" } },
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [{}, {}] })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, Some("ads-token"), Some("123-456"))
            .create(
                ResourceKind::Keyword,
                vec![
                    operation(json!({ "parentId": "G-1", "keywordText": "red shoes", "action": "create" })),
                    operation(json!({ "parentId": "G-1", "keywordText": "blue shoes", "action": "create" })),
                ],
            )
            .await
            .expect("Should submit the batch");

        assert_eq!(json!({ "results": [{}, {}] }), response);
    }

    #[tokio::test]
    async fn empty_batch_is_not_submitted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        // no credentials are needed for an empty batch either
        let response = client(&server, None, None)
            .create(ResourceKind::Campaign, vec![])
            .await
            .expect("Nothing to submit");

        assert_eq!(Value::Null, response);
    }

    #[tokio::test]
    async fn missing_credentials_and_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/customers/123-456/campaigns:mutate"))
            .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_ARGUMENT"))
            .mount(&server)
            .await;

        let batch = || vec![operation(json!({ "id": "C-1", "action": "create" }))];

        let error = client(&server, Some("ads-token"), None)
            .create(ResourceKind::Campaign, batch())
            .await
            .expect_err("Customer id is missing");
        assert_eq!(
            &Kind::MissingCredentials("GOOGLE_ADS_CUSTOMER_ID"),
            error.kind()
        );

        let error = client(&server, None, Some("123-456"))
            .create(ResourceKind::Campaign, batch())
            .await
            .expect_err("Token is missing");
        assert_eq!(&Kind::MissingCredentials("GOOGLE_ADS_TOKEN"), error.kind());

        let error = client(&server, Some("ads-token"), Some("123-456"))
            .create(ResourceKind::Campaign, batch())
            .await
            .expect_err("Platform rejects the batch");
        assert_eq!(&Kind::Api(400), error.kind());
        assert_eq!("Api responded with 400: INVALID_ARGUMENT", error.to_string());
    }
}
