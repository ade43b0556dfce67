/// Bearer-token authentication middleware.
///
/// Runs before every handler: extracts the `Authorization: Bearer <jwt>`
/// credential, verifies the HS256 signature and claims, and makes the
/// verified subject available to handlers as a strongly-typed `AuthUser`
/// request extension. Handlers receive the identity explicitly through the
/// `FromRequest` extractor and never parse credentials themselves.
use crate::error::ServiceError;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    Error, HttpMessage,
};
use futures::future::{ready, Ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

/// Verified caller identity for one request
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: i64,
}

struct AuthKey {
    decoding: DecodingKey,
    validation: Validation,
}

/// Bearer authentication middleware factory
#[derive(Clone)]
pub struct RequireAuth {
    key: Arc<AuthKey>,
}

impl RequireAuth {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            key: Arc::new(AuthKey {
                decoding: DecodingKey::from_secret(signing_key),
                validation: Validation::new(Algorithm::HS256),
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service: Rc::new(service),
            key: self.key.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    key: Arc<AuthKey>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let key = self.key.clone();

        Box::pin(async move {
            match verify_request(&req, &key) {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                Err(err) => {
                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, err.error_response());
                    Ok(res.map_into_right_body())
                }
            }
        })
    }
}

fn verify_request(req: &ServiceRequest, key: &AuthKey) -> Result<AuthUser, ServiceError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(ServiceError::InvalidAccessToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ServiceError::InvalidAccessToken)?;

    let data = jsonwebtoken::decode::<Claims>(token, &key.decoding, &key.validation)
        .map_err(|err| {
            tracing::warn!("token verification failed: {err}");
            ServiceError::InvalidAccessToken
        })?;

    let user_id: i64 = data
        .claims
        .sub
        .parse()
        .map_err(|_| ServiceError::UnknownSubject)?;

    Ok(AuthUser { user_id })
}

impl actix_web::FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(*user)),
            None => ready(Err(ServiceError::InvalidAccessToken.into())),
        }
    }
}
