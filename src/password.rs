use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{StoreError, StoreResult};

/// Argon2id with a random salt per password. Hashes are PHC strings.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self { argon2: Argon2::default() }
    }
}

impl Hasher {
    pub fn with_cost(memory_kib: u32, iterations: u32) -> StoreResult<Hasher> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
        Ok(Hasher { argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
    }

    pub fn hash(&self, password: &str) -> StoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(
            self.argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| StoreError::PasswordHash(e.to_string()))?
                .to_string()
        )
    }

    /// Hashes on the blocking pool so request workers stay free.
    pub async fn hash_blocking(&self, password: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.hash(&password)).await??)
    }

    pub async fn verify_blocking(&self, password: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
