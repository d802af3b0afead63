use base64::{prelude::BASE64_STANDARD, Engine};
use tonic::{service::Interceptor, Request, Status};

const AUTHORIZATION_HEADER: &str = "authorization";

/// Shared-secret check run before every gRPC call. Disabled unless both a node id and a secret
/// are configured.
#[derive(Debug, Clone, Default)]
pub struct AuthInterceptor {
    auth_header: Option<String>,
}

impl AuthInterceptor {
    pub fn new(node_id: &str, secret: &str) -> Self {
        if node_id.is_empty() || secret.is_empty() {
            return Self { auth_header: None };
        }
        Self { auth_header: Some(encode_node_secret(node_id, secret)) }
    }

    pub fn is_enabled(&self) -> bool {
        self.auth_header.is_some()
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        let Some(expected) = &self.auth_header else {
            return Ok(request);
        };

        let provided = request
            .metadata()
            .get(AUTHORIZATION_HEADER)
            .ok_or_else(|| Status::unauthenticated("empty auth header provided"))?;

        if provided.as_bytes() != expected.as_bytes() {
            return Err(Status::unauthenticated("incorrect auth header provided"));
        }

        Ok(request)
    }
}

/// Base64 of `node_id:secret`, the value clients send in the `authorization` header.
pub fn encode_node_secret(node_id: &str, secret: &str) -> String {
    BASE64_STANDARD.encode(format!("{node_id}:{secret}"))
}

#[cfg(test)]
mod tests {
    use tonic::{metadata::MetadataValue, Code};

    use super::*;

    fn request_with(header: Option<&str>) -> Request<()> {
        let mut request = Request::new(());
        if let Some(header) = header {
            request
                .metadata_mut()
                .insert(AUTHORIZATION_HEADER, MetadataValue::try_from(header).unwrap());
        }
        request
    }

    #[test]
    fn test_encode_node_secret() {
        assert_eq!(encode_node_secret("node", "secret"), "bm9kZTpzZWNyZXQ=");
    }

    #[test]
    fn test_disabled_without_secret() {
        let mut interceptor = AuthInterceptor::new("node", "");
        assert!(!interceptor.is_enabled());
        assert!(interceptor.call(request_with(None)).is_ok());

        let mut interceptor = AuthInterceptor::new("", "secret");
        assert!(!interceptor.is_enabled());
    }

    #[test]
    fn test_checks_header() {
        let mut interceptor = AuthInterceptor::new("node", "secret");
        assert!(interceptor.is_enabled());

        assert!(interceptor.call(request_with(Some("bm9kZTpzZWNyZXQ="))).is_ok());

        let status = interceptor.call(request_with(None)).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);

        let status = interceptor.call(request_with(Some("bm9kZTpvdGhlcg=="))).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }
}
