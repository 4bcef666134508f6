//! Auth route handlers.
//!
//! Credentials, OTP, and token issuance all live on the commerce backend;
//! these handlers pass requests through and keep the session in step. The
//! one piece of real logic here is the guest-cart merge: logging in pushes
//! the session cart into the backend cart instead of discarding it.

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartService, CartStore, RemoteCartStore, SessionCartStore};
use crate::error::{AppError, Result};
use crate::farmferry::{
    ForgotPasswordInput, LoginInput, LoginPayload, RegisterInput, ResetPasswordInput,
    SendOtpInput, VerifyOtpInput,
};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_customer, set_current_customer};
use crate::models::AuthSession;
use crate::state::AppState;

use super::{ok, ok_message};

/// Turn a successful login payload into session state, merging any guest
/// cart into the customer's backend cart first.
async fn establish_session(
    state: &AppState,
    session: &Session,
    payload: LoginPayload,
) -> Result<AuthSession> {
    let (customer, tokens) = payload.into_parts();
    let auth = AuthSession { customer, tokens };

    let guest_store = SessionCartStore::new(session.clone());
    let guest_cart = guest_store.load().await?;

    if !guest_cart.is_empty() {
        let remote = CartService::new(RemoteCartStore::new(
            state.backend().clone(),
            auth.tokens.access_token.clone(),
        ));
        remote.merge_from(guest_cart.into_lines()).await?;
        guest_store.clear().await?;
        tracing::info!(customer_id = %auth.customer.id, "merged guest cart into backend cart");
    }

    set_current_customer(session, &auth).await?;
    Ok(auth)
}

/// Register a new customer.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse> {
    let message = state.backend().register(&input).await?;
    Ok(ok_message(
        message.unwrap_or_else(|| "Registered. Verify the OTP sent to your phone.".to_owned()),
    ))
}

/// Log in with email and password.
#[instrument(skip(state, session, input), fields(email = %input.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let payload = state.backend().login(&input).await?;
    let auth = establish_session(&state, &session, payload).await?;
    Ok(ok(auth.customer))
}

/// Dispatch an OTP to the customer's phone.
#[instrument(skip(state, input), fields(phone = %input.phone))]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(input): Json<SendOtpInput>,
) -> Result<impl IntoResponse> {
    let message = state.backend().send_otp(&input).await?;
    Ok(ok_message(message.unwrap_or_else(|| "OTP sent".to_owned())))
}

/// Verify an OTP; success logs the customer in.
#[instrument(skip(state, session, input), fields(phone = %input.phone))]
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<VerifyOtpInput>,
) -> Result<impl IntoResponse> {
    let payload = state.backend().verify_otp(&input).await?;
    let auth = establish_session(&state, &session, payload).await?;
    Ok(ok(auth.customer))
}

/// Start the password reset flow.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordInput>,
) -> Result<impl IntoResponse> {
    let message = state.backend().forgot_password(&input).await?;
    Ok(ok_message(
        message.unwrap_or_else(|| "Password reset instructions sent".to_owned()),
    ))
}

/// Complete the password reset flow.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> Result<impl IntoResponse> {
    let message = state.backend().reset_password(&input).await?;
    Ok(ok_message(
        message.unwrap_or_else(|| "Password updated".to_owned()),
    ))
}

/// Rotate the session's token pair.
///
/// A rejected refresh token destroys the session: the customer is logged
/// out rather than left with tokens that can never work again.
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut auth): RequireAuth,
) -> Result<impl IntoResponse> {
    match state.backend().refresh(&auth.tokens.refresh_token).await {
        Ok(tokens) => {
            auth.tokens = tokens;
            set_current_customer(&session, &auth).await?;
            Ok(ok_message("Session refreshed"))
        }
        Err(err) => {
            tracing::warn!(error = %err, "token refresh failed; destroying session");
            clear_current_customer(&session).await?;
            Err(AppError::Unauthorized("Session expired".to_owned()))
        }
    }
}

/// Log out.
///
/// The backend call is best-effort; the local session is flushed no matter
/// what.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    if let Some(auth) = auth
        && let Err(err) = state.backend().logout(auth.access_token()).await
    {
        tracing::warn!(error = %err, "backend logout failed; clearing session anyway");
    }

    clear_current_customer(&session).await?;
    Ok(ok_message("Logged out"))
}

/// The current customer's profile.
#[instrument(skip_all)]
pub async fn me(RequireAuth(auth): RequireAuth) -> Result<impl IntoResponse> {
    Ok(ok(auth.customer))
}
