use std::collections::HashMap;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::AppState;
use crate::config::{Account, LoginSettings};
use crate::error::ApiError;

/// Проверка учётных данных по фиксированному списку аккаунтов.
///
/// При включённой блокировке считает подряд идущие неудачные попытки
/// по username существующего аккаунта (неизвестные имена не
/// учитываются, map ограничен числом аккаунтов); после порога любые попытки для этого username
/// отклоняются до рестарта процесса. Успешный вход до порога
/// сбрасывает счётчик.
pub struct Authenticator {
    accounts: Vec<Account>,
    lockout_after: Option<u32>,
    failures: Mutex<HashMap<String, u32>>,
}

impl Authenticator {
    pub fn from_settings(settings: &LoginSettings) -> Self {
        Self {
            accounts: settings.accounts(),
            lockout_after: settings.lockout_threshold(),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Ok(role) при успехе; роль есть только у аккаунтов, где она задана.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<String>, ApiError> {
        let mut failures = self.failures.lock().await;

        if let Some(limit) = self.lockout_after {
            if failures.get(username).is_some_and(|n| *n >= limit) {
                tracing::warn!(username, "login attempt on locked account");
                return Err(ApiError::AccountLocked);
            }
        }

        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username && a.password == password);

        match account {
            Some(account) => {
                failures.remove(username);
                tracing::info!(username, role = ?account.role, "login successful");
                Ok(account.role.clone())
            }
            None => {
                let known = self.accounts.iter().any(|a| a.username == username);
                if let Some(limit) = self.lockout_after.filter(|_| known) {
                    let count = failures.entry(username.to_string()).or_default();
                    *count += 1;
                    if *count >= limit {
                        tracing::warn!(username, attempts = *count, "account locked");
                    }
                }
                tracing::info!(username, "invalid credentials");
                Err(ApiError::InvalidCredentials)
            }
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub(crate) struct LoginResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

// --- POST /login (application/x-www-form-urlencoded) ---

pub(crate) async fn handle_login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::validation("form", e.body_text()))?;
    let role = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoginVariant;

    fn extended() -> Authenticator {
        Authenticator::from_settings(&LoginSettings {
            variant: LoginVariant::Extended,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn basic_accepts_only_the_default_pair() {
        let auth = Authenticator::from_settings(&LoginSettings::default());
        assert_eq!(auth.login("user", "pass").await.unwrap(), None);
        assert!(matches!(auth.login("admin", "admin123").await, Err(ApiError::InvalidCredentials)));
        assert!(matches!(auth.login("user", "wrong").await, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn basic_never_locks() {
        let auth = Authenticator::from_settings(&LoginSettings::default());
        for _ in 0..10 {
            let _ = auth.login("user", "wrong").await;
        }
        assert_eq!(auth.login("user", "pass").await.unwrap(), None);
    }

    #[tokio::test]
    async fn extended_returns_role_for_admin() {
        let auth = extended();
        assert_eq!(auth.login("admin", "admin123").await.unwrap().as_deref(), Some("admin"));
        assert_eq!(auth.login("user", "pass").await.unwrap(), None);
    }

    #[tokio::test]
    async fn extended_locks_after_three_failures() {
        let auth = extended();
        for _ in 0..3 {
            assert!(matches!(auth.login("user", "wrong").await, Err(ApiError::InvalidCredentials)));
        }
        assert!(matches!(auth.login("user", "pass").await, Err(ApiError::AccountLocked)));
        // other accounts unaffected
        assert!(auth.login("admin", "admin123").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_usernames_are_not_tracked() {
        let auth = extended();
        for i in 0..1_000 {
            let username = format!("ghost{i}");
            assert!(matches!(auth.login(&username, "x").await, Err(ApiError::InvalidCredentials)));
        }
        let _ = auth.login("user", "wrong").await;

        assert_eq!(auth.failures.lock().await.len(), 1);
        assert!(matches!(auth.login("ghost0", "x").await, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let auth = extended();
        for _ in 0..2 {
            let _ = auth.login("user", "wrong").await;
        }
        auth.login("user", "pass").await.unwrap();
        for _ in 0..2 {
            let _ = auth.login("user", "wrong").await;
        }
        assert!(auth.login("user", "pass").await.is_ok());
    }
}
