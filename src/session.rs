// src/session.rs
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::errors::{GatePassError, GatePassResult};
use crate::models::{Stage, UserProfile};

/// The two local keys this client persists, and nothing else.
pub const PROFILE_KEY: &str = "gatepass-user";
pub const TOKEN_KEY: &str = "gatepass-token";

/// Claims carried in the backend-issued JWT. The payload is decoded locally
/// without signature verification; the backend remains the verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// ✅ **Locally cached session: serialized profile + auth token**
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub profile: UserProfile,
    pub token: String,
}

impl Session {
    pub fn claims(&self) -> GatePassResult<TokenClaims> {
        decode_claims(&self.token)
    }

    pub fn is_expired(&self) -> bool {
        match self.claims() {
            Ok(claims) => (claims.exp as i64) <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }

    /// Stage of the approval chain this session's role acts at, if any.
    pub fn stage(&self) -> Option<Stage> {
        let claims = self.claims().ok()?;
        match claims.role.as_str() {
            "executive_officer" => Some(Stage::Executive),
            "verify_officer" => Some(Stage::Verify),
            "petrol_leader" => Some(Stage::Dispatch),
            "receiver" => Some(Stage::Receive),
            _ => None,
        }
    }
}

/// ✅ **Decode the JWT payload segment (base64, no verification)**
pub fn decode_claims(token: &str) -> GatePassResult<TokenClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(GatePassError::Session("Invalid token format".to_string()));
    }
    let decoded = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| GatePassError::Session("Failed to decode token payload".to_string()))?;
    Ok(serde_json::from_slice(&decoded)?)
}

/// File-backed store for the two session keys, read on every startup.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(format!("{PROFILE_KEY}.json"))
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    pub fn load(&self) -> GatePassResult<Session> {
        let profile_raw = fs::read_to_string(self.profile_path())
            .map_err(|_| GatePassError::Session("No stored session; sign in first".to_string()))?;
        let profile: UserProfile = serde_json::from_str(&profile_raw)?;
        let token = fs::read_to_string(self.token_path())
            .map_err(|_| GatePassError::Session("Stored session is missing its token".to_string()))?
            .trim()
            .to_string();
        Ok(Session { profile, token })
    }

    pub fn save(&self, session: &Session) -> GatePassResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(
            self.profile_path(),
            serde_json::to_string_pretty(&session.profile)?,
        )?;
        fs::write(self.token_path(), &session.token)?;
        Ok(())
    }

    pub fn clear(&self) -> GatePassResult<()> {
        for path in [self.profile_path(), self.token_path()] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
