use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Which enclave a key belongs to. Storage slots are namespaced by this,
/// so a password-derived key and a recovery-derived key never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    User,
    Mpc,
}

impl KeyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyKind::User => "user",
            KeyKind::Mpc => "mpc",
        }
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a key retires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationPolicy {
    /// Expired once `now > expires_at`.
    Timed,
    /// Invalid after its first successful use.
    OneShot,
    /// Never auto-expires; an explicit lock retires it.
    Session,
}

/// Metadata persisted next to the secret-key slot, JSON-serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub user_id: Uuid,
    /// Hex of the derived Curve25519 public key.
    pub public_key: idos_core::types::Bytes,
    #[serde(rename = "type")]
    pub kind: KeyKind,
    pub expiration_type: ExpirationPolicy,
    /// Unix millis; present iff `expiration_type` is `timed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    pub created_at: u64,
    pub last_used_at: u64,
    /// Explicit one-shot marker. The timestamps alone would couple
    /// correctness to monotonic-clock behavior.
    #[serde(default)]
    pub used: bool,
}

impl KeyMetadata {
    /// Whether the expiration policy has retired this key at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expiration_type {
            ExpirationPolicy::Timed => self.expires_at.map(|at| now > at).unwrap_or(true),
            ExpirationPolicy::OneShot => self.used || self.last_used_at != self.created_at,
            ExpirationPolicy::Session => false,
        }
    }

    /// Records a successful use of the key.
    pub fn touch(&mut self, now: u64) {
        self.last_used_at = now;
        self.used = true;
    }
}

/// Current Unix time in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(policy: ExpirationPolicy, expires_at: Option<u64>) -> KeyMetadata {
        KeyMetadata {
            user_id: "550e8400-e29b-41d4-a716-446655440000".parse().unwrap(),
            public_key: idos_core::types::Bytes::from([1u8; 32]),
            kind: KeyKind::User,
            expiration_type: policy,
            expires_at,
            created_at: 1_000,
            last_used_at: 1_000,
            used: false,
        }
    }

    #[test]
    fn timed_expiry() {
        let meta = metadata(ExpirationPolicy::Timed, Some(2_000));
        assert!(!meta.is_expired(2_000));
        assert!(meta.is_expired(2_001));
        // a timed key without a deadline is treated as already expired
        assert!(metadata(ExpirationPolicy::Timed, None).is_expired(0));
    }

    #[test]
    fn one_shot_expires_after_first_use() {
        let mut meta = metadata(ExpirationPolicy::OneShot, None);
        assert!(!meta.is_expired(5_000));
        meta.touch(5_000);
        assert!(meta.is_expired(5_001));
        // even if the clock never moved
        let mut frozen = metadata(ExpirationPolicy::OneShot, None);
        frozen.touch(frozen.created_at);
        assert!(frozen.is_expired(frozen.created_at));
    }

    #[test]
    fn session_never_auto_expires() {
        let mut meta = metadata(ExpirationPolicy::Session, None);
        meta.touch(u64::MAX);
        assert!(!meta.is_expired(u64::MAX));
    }

    #[test]
    fn json_round_trip() {
        let meta = metadata(ExpirationPolicy::Timed, Some(9_000));
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"type\":\"user\""));
        assert!(json.contains("\"expiration_type\":\"timed\""));
        let back: KeyMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
