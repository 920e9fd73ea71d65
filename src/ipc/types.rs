use crate::{
    config::portal::PortalConfig,
    core::accounts::{Account, Role},
    errors::{Error, Result},
    sheet::Workbook,
};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;

const TOKEN_LENGTH: usize = 32;

/// One request line.
#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    /// Echoed back in the response
    pub id: String,
    /// Dotted method name, e.g. `students.get`
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Value,
    /// Token from `auth.login`
    #[serde(default)]
    pub session: Option<String>,
}

impl Request {
    /// Decodes `params` into the method's parameter type.
    ///
    /// Absent params decode like an empty object.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T> {
        let params = if self.params.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            self.params.clone()
        };
        Ok(serde_json::from_value(params)?)
    }
}

/// A logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Token the client sends back with each request
    pub token: String,
    /// Role the account logged in as
    pub role: Role,
    /// Account code
    pub code: String,
    /// Display name
    pub name: String,
}

impl Session {
    /// Fails unless the session has one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                message: format!("{} accounts cannot do this", self.role),
            })
        }
    }

    /// Resolves which account a request is about.
    ///
    /// Without an explicit code the session's own account is meant. Only the
    /// roles in `any_of` may name someone else's code.
    pub fn target_code(&self, requested: Option<&str>, any_of: &[Role]) -> Result<String> {
        let code = match requested.map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ if self.role == Role::Admin => {
                return Err(Error::validation("params.code is required"));
            }
            _ => return Ok(self.code.clone()),
        };
        if code == self.code || any_of.contains(&self.role) {
            Ok(code.to_string())
        } else {
            Err(Error::Unauthorized {
                message: format!("cannot access account {code}"),
            })
        }
    }
}

/// Process-wide state shared by all requests.
pub struct AppState {
    /// The opened workbook
    pub workbook: Workbook,
    /// Portal settings
    pub config: PortalConfig,
    sessions: HashMap<String, Session>,
}

impl AppState {
    /// State with no one logged in.
    #[must_use]
    pub fn new(workbook: Workbook, config: PortalConfig) -> Self {
        Self {
            workbook,
            config,
            sessions: HashMap::new(),
        }
    }

    /// Starts a session for a verified account.
    ///
    /// An account holds at most one session per role: logging in again
    /// closes the earlier one, so its token stops working.
    pub fn open_session(&mut self, account: &Account) -> Session {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        let session = Session {
            token: token.clone(),
            role: account.role(),
            code: account.code().to_string(),
            name: account.name().to_string(),
        };
        self.sessions
            .retain(|_, s| !(s.role == session.role && s.code == session.code));
        self.sessions.insert(token, session.clone());
        session
    }

    /// Ends a session; false when the token was unknown.
    pub fn close_session(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Session the request belongs to.
    pub fn session(&self, req: &Request) -> Result<Session> {
        let token = req.session.as_deref().ok_or_else(|| Error::Unauthorized {
            message: "login required".to_string(),
        })?;
        self.sessions
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized {
                message: "session expired or unknown".to_string(),
            })
    }

    /// Number of open sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
