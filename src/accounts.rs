//! Account store
//!
//! Credentials load once at server startup into a fixed-size hash table and
//! are never mutated afterwards, so session tasks read it without locks.

use crate::error::{FtpError, Result};
use std::path::Path;

/// Number of buckets in the account table
const ACCOUNT_BUCKETS: usize = 512;

/// One user account
#[derive(Debug, Clone)]
pub struct Account {
    /// Account username, unique across the table
    pub username: String,
    password: String,
}

impl Account {
    /// Create an account record
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Compare a candidate password byte-for-byte
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

/// Separate-chaining hash table of accounts keyed by username
#[derive(Debug)]
pub struct AccountsTable {
    buckets: Vec<Vec<Account>>,
}

/// djb2 string hash
fn djb2(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(u64::from(byte));
    }
    hash
}

fn bucket_index(username: &str) -> usize {
    (djb2(username) % ACCOUNT_BUCKETS as u64) as usize
}

impl AccountsTable {
    fn empty() -> Self {
        Self {
            buckets: (0..ACCOUNT_BUCKETS).map(|_| Vec::new()).collect(),
        }
    }

    /// Load the accounts file at `path`
    ///
    /// Format: a decimal record-count line, then for each record a username
    /// line and a password line, all CRLF-terminated.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(FtpError::FileOpen)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.lines().map(|l| l.trim_end_matches('\r'));

        let count_line = lines
            .next()
            .ok_or_else(|| FtpError::Config("accounts file is empty".to_string()))?;
        let records: usize = count_line.trim().parse().map_err(|_| {
            FtpError::Config(format!(
                "accounts file record count is not a number: {count_line:?}"
            ))
        })?;

        let mut table = Self::empty();
        for _ in 0..records {
            let username = lines.next().ok_or_else(|| {
                FtpError::Config("accounts file ends before all records were read".to_string())
            })?;
            let password = lines.next().ok_or_else(|| {
                FtpError::Config(format!("account {username:?} has no password line"))
            })?;
            table.insert(Account {
                username: username.to_string(),
                password: password.to_string(),
            });
        }

        Ok(table)
    }

    /// Insert at the head of the chain; later insertions shadow earlier
    /// ones with the same username
    fn insert(&mut self, account: Account) {
        let index = bucket_index(&account.username);
        self.buckets[index].insert(0, account);
    }

    /// Look up an account by username
    pub fn get(&self, username: &str) -> Option<&Account> {
        self.buckets[bucket_index(username)]
            .iter()
            .find(|account| account.username == username)
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether the table holds no accounts
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
