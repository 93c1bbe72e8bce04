use super::normalize::{normalize, LookupResponse, ResultState};
use crate::error::{ClientError, ClientResult};
use crate::models::Certificate;

/// Reject blank input before any request goes out / 空查询在客户端拦截
pub fn validate_query(input: &str) -> ClientResult<String> {
    let term = input.trim();
    if term.is_empty() {
        return Err(ClientError::EmptyQuery);
    }
    Ok(term.to_string())
}

/// One user's search box: at most one request in flight, plus the record
/// currently open in the preview modal.
#[derive(Debug, Default)]
pub struct SearchSession {
    loading: bool,
    result: Option<ResultState>,
    preview: Option<usize>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Returns the trimmed term to send.
    pub fn begin(&mut self, input: &str) -> ClientResult<String> {
        if self.loading {
            return Err(ClientError::RequestInFlight);
        }
        let term = validate_query(input)?;
        self.loading = true;
        self.result = None;
        self.preview = None;
        Ok(term)
    }

    /// Settle the in-flight request. Errors become an inline message.
    pub fn finish(&mut self, result: ClientResult<LookupResponse>) -> &ResultState {
        let state = match result {
            Ok(response) => normalize(response),
            Err(e) => {
                tracing::warn!("Lookup failed: {}", e);
                ResultState::Message(e.to_string())
            }
        };
        self.loading = false;
        self.result.insert(state)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The search button is disabled while a request is outstanding
    pub fn control_enabled(&self) -> bool {
        !self.loading
    }

    pub fn state(&self) -> Option<&ResultState> {
        self.result.as_ref()
    }

    /// Open the preview modal for the record at `index`
    pub fn open_preview(&mut self, index: usize) -> Option<&Certificate> {
        let records = self.state().map(ResultState::records).unwrap_or(&[]);
        if index >= records.len() {
            return None;
        }
        self.preview = Some(index);
        self.previewed()
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn previewed(&self) -> Option<&Certificate> {
        let index = self.preview?;
        self.state()?.records().get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificateStatus, MessageBody};

    fn record(number: &str) -> Certificate {
        Certificate {
            id: format!("id-{}", number),
            certificate_number: number.to_string(),
            holder: "Harbour Foods AS".to_string(),
            address: "Bryggen 4, Bergen".to_string(),
            issue_date: "2022-11-30".to_string(),
            status: CertificateStatus::Valid,
            compliance_body: "Nordic Conformity Board".to_string(),
            country_of_origin: "Norway".to_string(),
            design_url: String::new(),
        }
    }

    #[test]
    fn test_blank_query_rejected() {
        assert!(matches!(validate_query(""), Err(ClientError::EmptyQuery)));
        assert!(matches!(validate_query(" \t\n"), Err(ClientError::EmptyQuery)));
        assert_eq!(validate_query("  harbour ").unwrap(), "harbour");

        let mut session = SearchSession::new();
        assert!(session.begin("   ").is_err());
        // nothing was started
        assert!(!session.is_loading());
        assert!(session.control_enabled());
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut session = SearchSession::new();
        assert_eq!(session.begin("harbour").unwrap(), "harbour");
        assert!(!session.control_enabled());
        assert!(matches!(session.begin("other"), Err(ClientError::RequestInFlight)));

        session.finish(Ok(LookupResponse::Many(vec![])));
        assert!(session.control_enabled());
        assert_eq!(session.state(), Some(&ResultState::Empty));
        assert!(session.begin("again").is_ok());
    }

    #[test]
    fn test_errors_degrade_to_message() {
        let mut session = SearchSession::new();
        session.begin("harbour").unwrap();
        let state = session.finish(Err(ClientError::UnexpectedResponse {
            status: 502,
            body: "Bad Gateway".to_string(),
        }));
        assert!(matches!(state, ResultState::Message(m) if m.contains("502")));

        session.begin("missing").unwrap();
        let state = session.finish(Ok(LookupResponse::Message(MessageBody {
            message: "Certificate not found".to_string(),
            error: None,
        })));
        assert_eq!(state, &ResultState::Message("Certificate not found".to_string()));
    }

    #[test]
    fn test_preview_modal() {
        let mut session = SearchSession::new();
        assert!(session.open_preview(0).is_none());

        session.begin("harbour").unwrap();
        session.finish(Ok(LookupResponse::Many(vec![record("CERT-1"), record("CERT-2")])));

        assert_eq!(session.open_preview(1).unwrap().certificate_number, "CERT-2");
        assert_eq!(session.previewed().unwrap().certificate_number, "CERT-2");
        assert!(session.open_preview(5).is_none());
        assert_eq!(session.previewed().unwrap().certificate_number, "CERT-2");

        session.close_preview();
        assert!(session.previewed().is_none());

        // a new search closes the modal
        session.open_preview(0);
        session.begin("next").unwrap();
        assert!(session.previewed().is_none());
    }
}
