use super::normalize::{ResultState, EMPTY_MESSAGE};
use crate::models::Certificate;

fn display_date(certificate: &Certificate) -> String {
    certificate
        .issued_on()
        .map(|d| d.format("%d %B %Y").to_string())
        .unwrap_or_else(|| certificate.issue_date.clone())
}

/// One-card summary used in result lists
pub fn render_card(certificate: &Certificate) -> String {
    format!(
        "[{}] {}\n  {} | {} | issued {}",
        certificate.status,
        certificate.certificate_number,
        certificate.holder,
        certificate.country_of_origin,
        display_date(certificate)
    )
}

/// Full record, as shown in the preview modal / 详情
pub fn render_details(certificate: &Certificate) -> String {
    let design = if certificate.design_url.is_empty() {
        "(none)"
    } else {
        certificate.design_url.as_str()
    };
    let address = certificate.address.lines().collect::<Vec<_>>().join("\n                    ");
    format!(
        "Certificate number: {}\n\
         Holder:             {}\n\
         Address:            {}\n\
         Issue date:         {}\n\
         Status:             {}\n\
         Compliance body:    {}\n\
         Country of origin:  {}\n\
         Design:             {}",
        certificate.certificate_number,
        certificate.holder,
        address,
        display_date(certificate),
        certificate.status,
        certificate.compliance_body,
        certificate.country_of_origin,
        design
    )
}

/// Render a finished result state. Multi-result lists are numbered so a
/// record can be picked for preview.
pub fn render_state(state: &ResultState) -> String {
    match state {
        ResultState::Empty => EMPTY_MESSAGE.to_string(),
        ResultState::Message(message) => message.clone(),
        ResultState::Single(certificate) => render_details(certificate),
        ResultState::Many(certificates) => {
            let mut out = format!("{} certificates found", certificates.len());
            for (i, certificate) in certificates.iter().enumerate() {
                out.push_str(&format!("\n{:>3}. {}", i + 1, render_card(certificate)));
            }
            out
        }
    }
}
