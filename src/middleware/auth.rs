use crate::{
    models::User,
    state::AppState,
    utils::{AppError, NOT_AUTHORIZED},
};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures::future::LocalBoxFuture;
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};
use std::rc::Rc;

pub const TOKEN_COOKIE: &str = "token";

/// Who the caller is, attached to the request once the token verifies.
/// `user` is `None` when the token subject no longer exists.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: ObjectId,
    pub user: Option<User>,
}

#[derive(Debug)]
pub enum RejectReason {
    MissingToken,
    InvalidToken(String),
    InvalidSubject(String),
    LookupFailed(String),
    Misconfigured,
}

#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(Identity),
    Rejected(RejectReason),
}

/// Bearer header first, `token` cookie second.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        req.cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

pub async fn authenticate(token: Option<String>, state: &AppState) -> AuthOutcome {
    let Some(token) = token else {
        return AuthOutcome::Rejected(RejectReason::MissingToken);
    };

    let claims = match state.jwt.verify(&token) {
        Ok(claims) => claims,
        Err(e) => return AuthOutcome::Rejected(RejectReason::InvalidToken(e.to_string())),
    };

    let user_id = match ObjectId::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return AuthOutcome::Rejected(RejectReason::InvalidSubject(claims.sub)),
    };

    match state.users.find_by_id(&user_id).await {
        Ok(user) => {
            if user.is_none() {
                log::warn!("⚠️  Token subject {} has no user record", user_id);
            }
            AuthOutcome::Authenticated(Identity { user_id, user })
        }
        Err(e) => AuthOutcome::Rejected(RejectReason::LookupFailed(e.to_string())),
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "message": NOT_AUTHORIZED
    }))
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let token = extract_token(req.request());
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let outcome = match state {
                Some(state) => authenticate(token, &state).await,
                None => AuthOutcome::Rejected(RejectReason::Misconfigured),
            };

            match outcome {
                AuthOutcome::Authenticated(identity) => {
                    req.extensions_mut().insert(identity);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                AuthOutcome::Rejected(reason) => {
                    match &reason {
                        RejectReason::Misconfigured => {
                            log::error!("❌ AuthMiddleware mounted without AppState")
                        }
                        RejectReason::LookupFailed(e) => {
                            log::error!("❌ User lookup failed during auth: {}", e)
                        }
                        other => log::warn!("🔒 {} {} rejected: {:?}", req.method(), req.path(), other),
                    }
                    Ok(req.into_response(unauthorized()).map_into_right_body())
                }
            }
        })
    }
}

/// Extractor for handlers that need a live user record.
/// An identity whose user was deleted is rejected with the same 401.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = match req.extensions().get::<Identity>() {
            Some(Identity { user: Some(user), .. }) => Some(user.clone()),
            Some(Identity { user_id, user: None }) => {
                log::warn!("🔒 {} {} rejected: user {} no longer exists", req.method(), req.path(), user_id);
                None
            }
            None => None,
        };
        ready(user.map(CurrentUser).ok_or_else(AppError::not_authorized))
    }
}
