//! Authentication endpoints over [`ApiClient`].

use async_trait::async_trait;
use folio_domain::{
    ApiEnvelope, AuthPayload, LoginCredentials, PasswordChange, ProfileUpdate, RegisterCredentials,
    User,
};

use crate::api::books::{to_body, unwrap_envelope};
use crate::api::client::{ApiClient, UnauthorizedPolicy};
use crate::error::{ApiError, ApiResult};
use crate::ports::{AuthGateway, HttpMethod};

/// A credential exchange only counts when the backend says so and hands back
/// both a token and a user.
fn accept(payload: AuthPayload) -> ApiResult<AuthPayload> {
    let complete = payload.success
        && payload.token.as_deref().is_some_and(|t| !t.is_empty())
        && payload.user.is_some();
    if complete {
        Ok(payload)
    } else {
        Err(ApiError::Rejected {
            message: payload.message,
        })
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self
            .execute(
                HttpMethod::Post,
                "auth/login",
                &[],
                Some(to_body(credentials)?),
                UnauthorizedPolicy::Report,
            )
            .await?;
        accept(payload)
    }

    async fn register(&self, credentials: &RegisterCredentials) -> ApiResult<AuthPayload> {
        credentials.validate()?;
        let payload: AuthPayload = self
            .execute(
                HttpMethod::Post,
                "auth/register",
                &[],
                Some(to_body(credentials)?),
                UnauthorizedPolicy::Report,
            )
            .await?;
        accept(payload)
    }

    async fn profile(&self) -> ApiResult<User> {
        let envelope: ApiEnvelope<User> = self
            .request(HttpMethod::Get, "auth/profile", &[], None)
            .await?;
        unwrap_envelope(envelope).map(|(user, _)| user)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        update.validate()?;
        let envelope: ApiEnvelope<User> = self
            .request(HttpMethod::Put, "auth/profile", &[], Some(to_body(update)?))
            .await?;
        unwrap_envelope(envelope).map(|(user, _)| user)
    }

    async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        change.validate()?;
        let envelope: ApiEnvelope<serde_json::Value> = self
            .execute(
                HttpMethod::Put,
                "auth/password",
                &[],
                Some(to_body(change)?),
                UnauthorizedPolicy::Report,
            )
            .await?;
        if envelope.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: envelope.message,
            })
        }
    }
}
