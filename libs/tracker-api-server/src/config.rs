use serde::Deserialize;

/// Настройки API сервера. Секции `[joke]`, `[login]`, `[recommend]`
/// десериализуются бинарём по отдельности и собираются сюда.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    pub joke: JokeSettings,
    pub login: LoginSettings,
    pub recommend: RecommendSettings,
}

// ---- /joke ----

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JokeSettings {
    #[serde(default = "default_joke_url")]
    pub upstream_url: String,
    /// Таймаут одного запроса к upstream.
    #[serde(default = "default_joke_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for JokeSettings {
    fn default() -> Self {
        Self {
            upstream_url: default_joke_url(),
            timeout_ms: default_joke_timeout_ms(),
        }
    }
}

fn default_joke_url() -> String {
    "https://official-joke-api.appspot.com/jokes/random".into()
}
fn default_joke_timeout_ms() -> u64 {
    10_000
}

// ---- /login ----

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginVariant {
    /// Одна пара `user`/`pass`, без блокировки.
    #[default]
    Basic,
    /// Добавляет `admin`/`admin123` с ролью и блокировку после
    /// `lockout_after` неудачных попыток.
    Extended,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Account {
    fn new(username: &str, password: &str, role: Option<&str>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginSettings {
    #[serde(default)]
    pub variant: LoginVariant,
    /// Переопределяет порог блокировки варианта. 0 = без блокировки.
    #[serde(default)]
    pub lockout_after: Option<u32>,
    /// Пусто = учётки по умолчанию для варианта.
    #[serde(default)]
    pub users: Vec<Account>,
}

impl LoginSettings {
    pub fn accounts(&self) -> Vec<Account> {
        if !self.users.is_empty() {
            return self.users.clone();
        }
        match self.variant {
            LoginVariant::Basic => vec![Account::new("user", "pass", None)],
            LoginVariant::Extended => vec![
                Account::new("user", "pass", None),
                Account::new("admin", "admin123", Some("admin")),
            ],
        }
    }

    pub fn lockout_threshold(&self) -> Option<u32> {
        let default = match self.variant {
            LoginVariant::Basic => None,
            LoginVariant::Extended => Some(3),
        };
        self.lockout_after.or(default).filter(|n| *n > 0)
    }
}

// ---- /recommend ----

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendVariant {
    /// Неизвестный интерес → рекомендация по умолчанию.
    #[default]
    Fallback,
    /// Неизвестный интерес → 400 со списком допустимых значений.
    Strict,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendSettings {
    #[serde(default)]
    pub variant: RecommendVariant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_login_has_single_account_and_no_lockout() {
        let settings = LoginSettings::default();
        let accounts = settings.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].username, "user");
        assert_eq!(settings.lockout_threshold(), None);
    }

    #[test]
    fn extended_login_defaults() {
        let settings = LoginSettings { variant: LoginVariant::Extended, ..Default::default() };
        assert!(settings.accounts().iter().any(|a| a.role.as_deref() == Some("admin")));
        assert_eq!(settings.lockout_threshold(), Some(3));
    }

    #[test]
    fn zero_lockout_disables_it() {
        let settings = LoginSettings {
            variant: LoginVariant::Extended,
            lockout_after: Some(0),
            ..Default::default()
        };
        assert_eq!(settings.lockout_threshold(), None);
    }

    #[test]
    fn explicit_users_replace_defaults() {
        let settings: LoginSettings = serde_json::from_value(serde_json::json!({
            "variant": "extended",
            "users": [{"username": "ops", "password": "hunter2", "role": "operator"}],
        }))
        .unwrap();
        let accounts = settings.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role.as_deref(), Some("operator"));
    }
}
