//! One-time passcodes for SMS login
//!
//! Codes live in process memory with a short TTL. One live code per email:
//! requesting a new code replaces the old one, and a successful verify
//! consumes the code.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::RwLock;

struct OtpEntry {
    code: String,
    expires_at: DateTime<Utc>,
}

pub struct OtpStore {
    entries: RwLock<HashMap<String, OtpEntry>>,
    ttl: Duration,
}

impl OtpStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Generate and store a fresh 6-digit code for the email, replacing any
    /// existing one. Expired codes for other emails are purged on the way.
    pub async fn create(&self, email: &str) -> String {
        let code = generate_code();
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.ttl.as_secs() as i64);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at >= now);
        entries.insert(
            email.to_lowercase(),
            OtpEntry {
                code: code.clone(),
                expires_at,
            },
        );
        code
    }

    /// Check a code and consume it on success
    pub async fn verify(&self, email: &str, code: &str) -> bool {
        let key = email.to_lowercase();
        let mut entries = self.entries.write().await;
        let valid = entries
            .get(&key)
            .map(|entry| entry.code == code && entry.expires_at >= Utc::now())
            .unwrap_or(false);
        if valid {
            entries.remove(&key);
        }
        valid
    }
}

fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    n.to_string()
}
