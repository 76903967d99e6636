use crate::errors::AuthError;
use crate::models::user::Principal;
use crate::utils::auth::TokenCodec;
use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;
use tracing::warn;

/// Middleware gating the protected scopes. Runs the full check before the
/// wrapped service is called: header shape, then signature, then expiry.
/// Pure with respect to request state, so any number of workers can run it
/// against the same token concurrently.
pub struct TokenGuard {
    codec: Arc<TokenCodec>,
}

impl TokenGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        TokenGuard { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TokenGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = TokenGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenGuardService {
            service,
            codec: self.codec.clone(),
        }))
    }
}

pub struct TokenGuardService<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for TokenGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Anything other than a well-formed `Bearer <token>` header counts
        // as no token at all.
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|t| t.to_string());

        let principal = match token {
            Some(t) => match self.codec.verify(&t) {
                Ok(claims) => Principal::from(claims),
                Err(err) => return reject(req, err),
            },
            None => return reject(req, AuthError::MissingToken),
        };

        req.extensions_mut().insert(principal);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Terminal rejection. The exact failure kind goes to the log; the client
/// sees the same generic 401 either way.
fn reject<B: 'static>(
    req: ServiceRequest,
    err: AuthError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B, BoxBody>>, Error>> {
    warn!(error = %err, path = %req.path(), "Rejected unauthenticated request");

    let (req, _pl) = req.into_parts();
    let res = err.guard_response();
    Box::pin(async move { Ok(ServiceResponse::new(req, res).map_into_right_body()) })
}
