//! JWT authentication middleware.
//!
//! Wrap any scope with [`JwtMiddlewareFactory`] to require a valid access token on every request inside it. The token
//! is read from the `token` cookie, or from an `Authorization: Bearer` header. On success the decoded
//! [`JwtClaims`](crate::auth::JwtClaims) are stored in the request extensions for the ACL middleware and the route
//! handlers. Otherwise the request is rejected with a 401 before it reaches any handler.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{debug, trace};

use crate::{
    auth::{token_from_request, TokenVerifier},
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    verifier: Rc<TokenVerifier>,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenVerifier) -> Self {
        JwtMiddlewareFactory { verifier: Rc::new(verifier) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { verifier: Rc::clone(&self.verifier), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: Rc<TokenVerifier>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Rc::clone(&self.verifier);
        Box::pin(async move {
            let Some(token) = token_from_request(&req) else {
                debug!("🔐️ No access token in request to {}", req.path());
                return Err(ServerError::AuthenticationError(AuthError::MissingToken).into());
            };
            let claims = verifier.verify(&token).map_err(ServerError::AuthenticationError)?;
            trace!("🔐️ Request authenticated for account #{} ({})", claims.id, claims.role);
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
