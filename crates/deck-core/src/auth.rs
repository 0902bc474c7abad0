use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::kvstore::{KvStore, SESSION_KEY, USER_DATA_KEY};
use crate::sync::RemoteSync;

// Credentials are stored and compared in plain text by contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserData {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "signedUp", default)]
    pub signed_up: bool,
}

#[instrument(skip(kv, remote, password))]
pub fn signup(
    kv: &mut dyn KvStore,
    remote: Option<&dyn RemoteSync>,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserData> {
    validate_required("username", username)?;
    validate_required("email", email)?;
    validate_required("password", password)?;

    let user = UserData {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
        signed_up: true,
    };

    let payload = serde_json::to_string(&user)
        .map_err(|err| Error::PersistenceUnavailable(err.to_string()))?;
    if let Err(err) = kv.set(USER_DATA_KEY, &payload) {
        warn!(error = %err, "user record not persisted; continuing");
    }
    if let Some(remote) = remote {
        remote.publish(USER_DATA_KEY, &payload);
    }

    info!(email = %user.email, "user signed up");
    Ok(user)
}

#[instrument(skip(kv, password))]
pub fn login(kv: &mut dyn KvStore, email: &str, password: &str) -> Result<UserData> {
    let Some(user) = current_user(kv) else {
        debug!("login attempted with no stored user");
        return Err(Error::InvalidCredentials);
    };

    if user.email != email.trim() || user.password != password {
        debug!(email, "credential mismatch");
        return Err(Error::InvalidCredentials);
    }

    if let Err(err) = kv.set(SESSION_KEY, "true") {
        warn!(error = %err, "session flag not persisted; continuing");
    }
    info!(email = %user.email, "logged in");
    Ok(user)
}

#[instrument(skip(kv))]
pub fn logout(kv: &mut dyn KvStore) {
    if let Err(err) = kv.remove(SESSION_KEY) {
        warn!(error = %err, "failed clearing session flag");
    }
    if let Err(err) = kv.remove(USER_DATA_KEY) {
        warn!(error = %err, "failed clearing user record");
    }
    info!("logged out");
}

pub fn current_user(kv: &dyn KvStore) -> Option<UserData> {
    let blob = match kv.get(USER_DATA_KEY) {
        Ok(blob) => blob?,
        Err(err) => {
            warn!(error = %err, "user record unreadable");
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "user record unparsable");
            None
        }
    }
}

pub fn is_logged_in(kv: &dyn KvStore) -> bool {
    matches!(kv.get(SESSION_KEY), Ok(Some(flag)) if flag == "true")
}

fn validate_required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation { field });
    }
    Ok(())
}
