//! Clients of the Google Sheets v4 & Google Ads REST APIs.
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::Error;

pub use self::{
    ads::GoogleAds,
    sheets::GoogleSheets,
};

mod ads;
mod sheets;

/// Fails with [`Kind::Api`](crate::Kind::Api) and the response text for any non-success status.
async fn ensure_success(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::api(status.as_u16(), body))
}

async fn json_response<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    ensure_success(response)
        .await?
        .json()
        .await
        .map_err(Error::request)
}
