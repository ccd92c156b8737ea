use std::sync::Arc;

use tracing::debug;

use crate::domain::OriginAllowList;

/// The parts of an inbound request the validator inspects.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMetadata<'a> {
    pub method: &'a str,
    pub content_type: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub referer: Option<&'a str>,
}

/// Minimal cross-site request forgery guard for the chat endpoint.
///
/// A request passes only when it is a JSON `POST` whose `Origin` and
/// `Referer` headers both resolve to an allowed origin.
pub struct ValidateRequestUseCase {
    allowed_origins: Arc<OriginAllowList>,
}

impl ValidateRequestUseCase {
    pub fn new(allowed_origins: Arc<OriginAllowList>) -> Self {
        Self { allowed_origins }
    }

    pub fn execute(&self, request: &RequestMetadata<'_>) -> bool {
        if request.method != "POST" {
            debug!("Rejecting request: method {} is not POST", request.method);
            return false;
        }

        if !request
            .content_type
            .is_some_and(|ct| ct.contains("application/json"))
        {
            debug!("Rejecting request: content-type {:?} is not JSON", request.content_type);
            return false;
        }

        let (Some(origin), Some(referer)) = (request.origin, request.referer) else {
            debug!("Rejecting request: origin and referer are both required");
            return false;
        };

        if !self.allowed_origins.allows(origin) {
            debug!("Rejecting request: origin '{}' is not allowed", origin);
            return false;
        }

        if !self.allowed_origins.allows(referer) {
            debug!("Rejecting request: referer '{}' is not allowed", referer);
            return false;
        }

        true
    }
}
