use std::{convert::TryFrom, fmt, str::FromStr};

use parse_display::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// `url::Url::scheme()` returns lower-cased ASCII string without `:`
const SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("Invalid scheme '{0}', only 'http' & 'https' are allowed")]
    InvalidScheme(String),
    #[error("The Url has to be a base, i.e. `data:`, `mailto:` etc. are not allowed")]
    ShouldBeABase,
    #[error("Having a fragment (i.e. `#fragment`) is not allowed")]
    HasFragment,
    #[error("Having a query parameters (i.e. `?query_param=value`) is not allowed")]
    HasQuery,
    #[error("Parsing the url: {0}")]
    Parsing(#[from] url::ParseError),
}

/// The root of a REST API, always ending with `/`.
///
/// Only `http` & `https` base urls without a fragment or a query are allowed.
#[derive(Clone, Hash, Display, Ord, PartialOrd, Eq, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Url", into = "Url")]
pub struct ApiUrl(Url);

impl ApiUrl {
    pub fn parse(input: &str) -> Result<Self, Error> {
        Self::from_str(input)
    }

    /// Appends each of `segments` as a single, percent-encoded path segment.
    ///
    /// Unlike [`Url::join`] a segment may hold `/`, `!`, `'` or a `:` suffix,
    /// e.g. `["spreadsheets", "abc", "values", "'Ad Groups'!A2:D"]`
    /// or `["spreadsheets", "abc:batchUpdate"]`.
    pub fn segments<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.0.clone();
        // a base url always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }

        url
    }

    pub fn to_url(&self) -> Url {
        self.0.clone()
    }
}

impl fmt::Debug for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Url({})", self)
    }
}

impl TryFrom<Url> for ApiUrl {
    type Error = Error;

    fn try_from(mut url: Url) -> Result<Self, Self::Error> {
        if url.cannot_be_a_base() {
            return Err(Error::ShouldBeABase);
        }

        if url.fragment().is_some() {
            return Err(Error::HasFragment);
        }

        if !SCHEMES.contains(&url.scheme()) {
            return Err(Error::InvalidScheme(url.scheme().to_string()));
        }

        if url.query().is_some() {
            return Err(Error::HasQuery);
        }

        let url_path = url.path();

        let mut stripped_path = url_path.strip_suffix('/').unwrap_or(url_path).to_string();
        stripped_path.push('/');

        url.set_path(&stripped_path);

        Ok(Self(url))
    }
}

impl From<ApiUrl> for Url {
    fn from(api_url: ApiUrl) -> Self {
        api_url.0
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.parse::<Url>()?)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn api_url_always_ends_with_a_slash() {
        let allowed = [
            ("https://sheets.googleapis.com/v4", "https://sheets.googleapis.com/v4/"),
            ("https://sheets.googleapis.com/v4/", "https://sheets.googleapis.com/v4/"),
            ("http://127.0.0.1:8085", "http://127.0.0.1:8085/"),
        ];

        for (input, expected) in allowed {
            assert_eq!(
                expected,
                ApiUrl::parse(input).expect("Should be allowed").to_string()
            );
        }
    }

    #[test]
    fn api_url_rejects_non_api_urls() {
        let failing = [
            (
                "ftp://127.0.0.1/",
                Error::InvalidScheme("ftp".to_string()),
            ),
            ("mailto:ads@example.com", Error::ShouldBeABase),
            ("https://example.com/v4#values", Error::HasFragment),
            ("https://example.com/v4?key=1", Error::HasQuery),
            (
                "not a url",
                Error::Parsing(url::ParseError::RelativeUrlWithoutBase),
            ),
        ];

        for (input, expected) in failing {
            assert_eq!(Err(expected), ApiUrl::parse(input));
        }
    }

    #[test]
    fn segments_are_encoded_one_by_one() {
        let api = ApiUrl::parse("https://sheets.googleapis.com/v4").expect("Valid url");

        assert_eq!(
            "https://sheets.googleapis.com/v4/spreadsheets/abc:batchUpdate",
            api.segments(["spreadsheets", "abc:batchUpdate"]).as_str()
        );
        assert_eq!(
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'Ad%20Groups'!A2:D",
            api.segments(["spreadsheets", "abc", "values", "'Ad Groups'!A2:D"])
                .as_str()
        );
        assert_eq!(
            "https://sheets.googleapis.com/v4/spreadsheets/a%2Fb",
            api.segments(["spreadsheets", "a/b"]).as_str()
        );
    }
}
