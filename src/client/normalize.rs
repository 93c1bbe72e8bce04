use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::models::{Certificate, MessageBody};

/// Text shown when a search finds nothing
pub const EMPTY_MESSAGE: &str = "No certificates found";

/// The three shapes the lookup endpoint can answer with
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LookupResponse {
    Many(Vec<Certificate>),
    One(Certificate),
    Message(MessageBody),
}

impl LookupResponse {
    /// Decode a response body by shape. The status code is only used for
    /// the error when the body fits none of them.
    pub fn from_body(status: u16, body: &str) -> ClientResult<Self> {
        serde_json::from_str(body).map_err(|_| ClientError::UnexpectedResponse {
            status,
            body: body.chars().take(200).collect(),
        })
    }
}

/// What the UI should show for a finished request / 结果状态
#[derive(Debug, Clone, PartialEq)]
pub enum ResultState {
    Empty,
    Single(Certificate),
    Many(Vec<Certificate>),
    Message(String),
}

impl ResultState {
    pub fn records(&self) -> &[Certificate] {
        match self {
            ResultState::Single(certificate) => std::slice::from_ref(certificate),
            ResultState::Many(certificates) => certificates,
            ResultState::Empty | ResultState::Message(_) => &[],
        }
    }
}

/// Map a decoded response onto a result state
pub fn normalize(response: LookupResponse) -> ResultState {
    match response {
        LookupResponse::Many(mut certificates) => match certificates.len() {
            0 => ResultState::Empty,
            1 => ResultState::Single(certificates.remove(0)),
            _ => ResultState::Many(certificates),
        },
        LookupResponse::One(certificate) => ResultState::Single(certificate),
        LookupResponse::Message(body) => ResultState::Message(body.message),
    }
}
