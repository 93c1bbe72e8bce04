use crate::store::CertificateStore;

/// Shared handler state / 共享状态
pub struct AppState {
    pub store: CertificateStore,
}
