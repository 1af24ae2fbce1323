use parse_display::Display;
use std::{error::Error as StdError, fmt};
use thiserror::Error;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The error of every spreadsheet & ads platform call.
#[derive(Debug, Error)]
#[error("{inner}")]
pub struct Error {
    inner: Box<Inner>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// The request couldn't be sent or the response couldn't be read.
    pub fn request<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::new(Kind::Request, Some(source))
    }

    /// The API responded with a non-success status, `body` is the response text.
    pub fn api(status: u16, body: String) -> Self {
        Self::new(Kind::Api(status), Some(body))
    }

    pub fn tab_not_found(title: &str) -> Self {
        Self::new(Kind::TabNotFound(title.to_owned()), None::<BoxError>)
    }

    pub fn invalid_range<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::new(Kind::InvalidRange, Some(source))
    }

    pub fn missing_credentials(variable: &'static str) -> Self {
        Self::new(Kind::MissingCredentials(variable), None::<BoxError>)
    }

    /// A failure raised by the in-memory clients.
    pub fn dummy<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::new(Kind::Dummy, Some(source))
    }
}

#[derive(Debug, Error)]
struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl fmt::Display for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            // Writes: "Kind: Error message here"
            Some(source) => write!(f, "{}: {}", self.kind, source),
            // Writes: "Kind"
            None => write!(f, "{}", self.kind),
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Kind {
    Request,
    #[display("Api responded with {0}")]
    Api(u16),
    #[display("Tab `{0}` not found")]
    TabNotFound(String),
    InvalidRange,
    #[display("Missing credentials {0}")]
    MissingCredentials(&'static str),
    Dummy,
}
