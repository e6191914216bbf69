use std::collections::HashMap;

use bytes::Bytes;

/// Message headers, flattened to one value per key.
pub type Headers = HashMap<String, String>;

/// A message received on a subject.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The concrete subject the message was published on.
    pub subject: String,

    /// The message body.
    pub payload: Bytes,

    /// Headers attached by the publisher.
    pub headers: Option<Headers>,

    /// Subject to send a reply to, if the publisher expects one.
    pub reply: Option<String>,
}

impl Message {
    /// Creates a message without headers or reply subject.
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
            headers: None,
            reply: None,
        }
    }

    /// Attaches headers to the message.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Looks up a single header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|headers| headers.get(key))
            .map(String::as_str)
    }
}
