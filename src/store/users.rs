use std::collections::{BTreeMap, BTreeSet, HashMap};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    catalog::{BadgeId, ClassId, ModuleId},
    error::{StoreError, StoreResult},
    password::Hasher,
};

/// A completed `(class_id, module_id)` pair.
pub type ModuleKey = (ClassId, ModuleId);

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub username: String,
    pub(crate) password_hash: String,
    pub full_name: String,
    pub bio: String,
    /// Keys are the completed set; values record the first completion.
    pub(crate) completed_modules: BTreeMap<ModuleKey, OffsetDateTime>,
    pub(crate) earned_badges: BTreeSet<BadgeId>,
}

impl UserRecord {
    pub fn completed_modules(&self) -> impl Iterator<Item = ModuleKey> + '_ {
        self.completed_modules.keys().copied()
    }

    pub fn completed_count(&self) -> usize {
        self.completed_modules.len()
    }

    pub fn completed_at(&self, key: ModuleKey) -> Option<OffsetDateTime> {
        self.completed_modules.get(&key).copied()
    }

    pub fn has_completed(&self, class_id: ClassId, module_id: ModuleId) -> bool {
        self.completed_modules.contains_key(&(class_id, module_id))
    }

    pub fn earned_badges(&self) -> &BTreeSet<BadgeId> {
        &self.earned_badges
    }
}

#[derive(Default)]
pub struct UserStore {
    users: HashMap<String, UserRecord>,
    hasher: Hasher,
}

impl UserStore {
    pub fn new(hasher: Hasher) -> UserStore {
        UserStore { users: HashMap::new(), hasher }
    }

    pub fn register(&mut self, username: &str, password: &str, full_name: &str) -> StoreResult<&UserRecord> {
        if self.users.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_owned()));
        }
        let password_hash = self.hasher.hash(password)?;
        self.insert(username, password_hash, full_name)
    }

    /// Adds a user whose password was hashed elsewhere. The username is
    /// checked again here since hashing happens without the store locked.
    pub fn insert(&mut self, username: &str, password_hash: String, full_name: &str) -> StoreResult<&UserRecord> {
        if self.users.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_owned()));
        }

        let record = UserRecord {
            user_id: Uuid::now_v7(),
            username: username.to_owned(),
            password_hash,
            full_name: full_name.to_owned(),
            bio: String::new(),
            completed_modules: BTreeMap::new(),
            earned_badges: BTreeSet::new(),
        };
        tracing::info!(user_id = %record.user_id, username, "registered user");
        Ok(&*self.users.entry(username.to_owned()).or_insert(record))
    }

    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<&UserRecord> {
        match self.users.get(username) {
            Some(user) if self.hasher.verify(password, &user.password_hash) => Ok(user),
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    pub fn password_hash(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(|u| u.password_hash.as_str())
    }

    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    pub fn update_bio(&mut self, username: &str, bio: &str) -> StoreResult<()> {
        self.get_mut(username)?.bio = bio.to_owned();
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    pub(crate) fn get_mut(&mut self, username: &str) -> StoreResult<&mut UserRecord> {
        self.users
            .get_mut(username)
            .ok_or_else(|| StoreError::UnknownUser(username.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.values()
    }
}
