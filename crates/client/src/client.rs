//! The auth-refreshing client.

use crate::credentials::SessionCredentials;
use crate::refresh::{is_public_path, transition, Event, Phase};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::{ClientError, ClientResult};
use clinicdesk_core::{ConsultationStore, CoreError, PatientContext, PatientStore, TemplateCache};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::RwLock;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const CONSULTATIONS_PATH: &str = "/api/consultations";
pub const ONBOARDING_TEMPLATE_PATH: &str = "/api/onboarding/template";

pub struct AuthClient<T: Transport> {
    transport: T,
    credentials: RwLock<SessionCredentials>,
}

impl<T: Transport> AuthClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_credentials(transport, SessionCredentials::default())
    }

    pub fn with_credentials(transport: T, credentials: SessionCredentials) -> Self {
        Self {
            transport,
            credentials: RwLock::new(credentials),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn credentials(&self) -> ClientResult<SessionCredentials> {
        self.credentials
            .read()
            .map(|c| c.clone())
            .map_err(|_| ClientError::LockPoisoned)
    }

    fn update_credentials(&self, f: impl FnOnce(&mut SessionCredentials)) -> ClientResult<()> {
        let mut guard = self
            .credentials
            .write()
            .map_err(|_| ClientError::LockPoisoned)?;
        f(&mut guard);
        Ok(())
    }

    fn bearer(&self) -> ClientResult<Option<String>> {
        Ok(self.credentials()?.access_token)
    }

    /// Run `req`, refreshing the session once if a protected path answers 401.
    ///
    /// # Errors
    ///
    /// - [`ClientError::SessionExpired`] if the refresh fails or the retry is still unauthorised.
    ///   Stored credentials are cleared in both cases.
    /// - [`ClientError::Transport`] if the gateway could not be reached.
    ///
    /// Non-401 error statuses are returned as responses, not errors.
    pub async fn execute(&self, req: &ApiRequest) -> ClientResult<ApiResponse> {
        let protected = !is_public_path(&req.path);
        let mut phase = Phase::Idle;
        let mut event = Event::Call;
        let mut outcome: Option<ClientResult<ApiResponse>> = None;

        loop {
            let next = transition(phase, event).ok_or(ClientError::IllegalTransition(phase))?;
            tracing::debug!(path = %req.path, from = ?phase, to = ?next, "auth transition");
            phase = next;

            event = match phase {
                Phase::InFlight | Phase::Retrying => match self.transport.send(req, self.bearer()?).await {
                    Ok(resp) => {
                        let unauthorized = resp.is_unauthorized();
                        outcome = Some(Ok(resp));
                        Event::Responded {
                            unauthorized,
                            protected,
                        }
                    }
                    Err(e) => {
                        outcome = Some(Err(e));
                        Event::TransportFailed
                    }
                },
                Phase::Refreshing => match self.refresh().await {
                    Ok(()) => Event::RefreshSucceeded,
                    Err(e) => {
                        tracing::warn!("Token refresh failed for {}: {}", req.path, e);
                        outcome = Some(Err(ClientError::SessionExpired));
                        Event::RefreshFailed
                    }
                },
                Phase::Completed => {
                    return outcome.unwrap_or(Err(ClientError::IllegalTransition(phase)));
                }
                Phase::Failed => {
                    let result = match outcome {
                        // An unauthorised retry means the fresh token was rejected too.
                        Some(Ok(resp)) if resp.is_unauthorized() => Err(ClientError::SessionExpired),
                        Some(result) => result,
                        None => Err(ClientError::IllegalTransition(phase)),
                    };
                    if matches!(result, Err(ClientError::SessionExpired)) {
                        self.update_credentials(SessionCredentials::clear)?;
                    }
                    return result;
                }
                Phase::Idle => return Err(ClientError::IllegalTransition(phase)),
            };
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Without a stored refresh token the request is sent with an empty body and the gateway
    /// falls back to the `refresh_token` cookie.
    pub async fn refresh(&self) -> ClientResult<()> {
        let body = match self.credentials()?.refresh_token {
            Some(token) => json!({ "refresh": token }),
            None => json!({}),
        };
        let resp = self
            .transport
            .send(&ApiRequest::post(REFRESH_PATH, body), None)
            .await?
            .into_success()?;
        self.update_credentials(|c| c.apply_refresh(&resp.body))?;
        tracing::info!("access token refreshed");
        Ok(())
    }

    /// Log in and keep the returned credentials.
    pub async fn login(&self, body: Value) -> ClientResult<ApiResponse> {
        let resp = self
            .execute(&ApiRequest::post(LOGIN_PATH, body))
            .await?
            .into_success()?;
        let creds = SessionCredentials::from_login_body(&resp.body);
        self.update_credentials(|c| *c = creds)?;
        Ok(resp)
    }

    /// Log out. Local credentials are dropped even if the gateway call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let refresh = self.credentials()?.refresh_token;
        let body = refresh.map_or_else(|| json!({}), |r| json!({ "refresh": r }));
        let result = self
            .transport
            .send(&ApiRequest::post(LOGOUT_PATH, body), self.bearer()?)
            .await;
        self.update_credentials(SessionCredentials::clear)?;
        if let Err(e) = result {
            tracing::warn!("Logout call failed: {}", e);
        }
        Ok(())
    }

    /// Submit the current consultation for the selected patient.
    ///
    /// On success the note is cleared and the patient lock released. On failure both stay as
    /// they were so the doctor can retry.
    pub async fn submit_consultation<S: PatientStore>(
        &self,
        store: &mut ConsultationStore,
        patients: &mut PatientContext<S>,
    ) -> ClientResult<ApiResponse> {
        let patient = patients
            .selected()
            .cloned()
            .ok_or(CoreError::NoPatientSelected)?;
        let submission = store.snapshot().submission(&patient);
        let body = serde_json::to_value(&submission).map_err(CoreError::Serialization)?;

        let resp = self
            .execute(&ApiRequest::post(CONSULTATIONS_PATH, body))
            .await?
            .into_success()?;
        store.finish(patients);
        tracing::info!(patient_id = %patient.id, "consultation submitted");
        Ok(resp)
    }

    /// The onboarding template for `version`, served from `cache` when the tag matches.
    pub async fn fetch_onboarding_template(
        &self,
        cache: &TemplateCache,
        version: &str,
    ) -> ClientResult<Value> {
        if let Some(template) = cache.get(version)? {
            return Ok(template);
        }
        let req = ApiRequest::new(Method::GET, ONBOARDING_TEMPLATE_PATH).with_query("version", version);
        let resp = self.execute(&req).await?.into_success()?;

        let payload = resp.body.get("data").cloned().unwrap_or(resp.body);
        let served_version = payload
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(version)
            .to_string();
        let template = payload.get("template").cloned().unwrap_or(payload);
        cache.put(&served_version, template.clone())?;
        Ok(template)
    }
}
