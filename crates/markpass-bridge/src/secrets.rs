//! Secret-store seam used for credential persistence.
//!
//! The bridge only needs a durable key→string mapping that survives process
//! restarts. Production uses the OS keyring; tests use an in-memory map so
//! suites can run hermetically and instantiate independent stores.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{BridgeError, BridgeResult};

/// Keyring service name under which every kiosk entry is stored.
pub const SERVICE_NAME: &str = "mp.ticketing.service";

/// Well-known key holding the enrolled server address.
pub const KEY_SERVER: &str = "mp.server";

/// Well-known key holding the human-readable kiosk name.
pub const KEY_KIOSK_NAME: &str = "mp.kiosk.name";

/// Durable key→string secret mapping.
///
/// Implementations must treat a missing key as an ordinary outcome
/// (`Ok(None)` from [`SecretStore::get`], `Ok(())` from
/// [`SecretStore::delete`]) rather than an error, since the bridge probes
/// for keys that legitimately may not exist.
pub trait SecretStore: Send + Sync {
    /// Look up the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying store cannot be read at all;
    /// a missing entry is `Ok(None)`.
    fn get(&self, key: &str) -> BridgeResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be written.
    fn set(&self, key: &str, value: &str) -> BridgeResult<()>;

    /// Remove the entry stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects the deletion; deleting a
    /// key that does not exist succeeds.
    fn delete(&self, key: &str) -> BridgeResult<()>;
}

/// Secret store backed by the OS keyring.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a store scoped to the given keyring service name.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> BridgeResult<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(|err| BridgeError::Secrets {
            operation: "keyring_entry",
            detail: err.to_string(),
        })
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(BridgeError::Secrets {
                operation: "keyring_get",
                detail: err.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| BridgeError::Secrets {
                operation: "keyring_set",
                detail: err.to_string(),
            })
    }

    fn delete(&self, key: &str) -> BridgeResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(BridgeError::Secrets {
                operation: "keyring_delete",
                detail: err.to_string(),
            }),
        }
    }
}

/// In-memory secret store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    fn lock(&self) -> BridgeResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| BridgeError::Secrets {
            operation: "memory_lock",
            detail: "store lock poisoned".to_string(),
        })
    }

    /// Number of entries currently held.
    ///
    /// # Errors
    ///
    /// Returns an error when the store lock is poisoned.
    pub fn len(&self) -> BridgeResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error when the store lock is poisoned.
    pub fn is_empty(&self) -> BridgeResult<bool> {
        Ok(self.lock()?.is_empty())
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> BridgeResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
