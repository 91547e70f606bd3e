mod friends;
pub mod leaderboard;
pub mod progress;
mod users;

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

pub use friends::FriendStore;
pub use users::{ModuleKey, UserRecord, UserStore};

use crate::{
    catalog::{BadgeInfo, Catalog, ClassId, ModuleId},
    error::{StoreError, StoreResult},
    password::Hasher,
};

/// Every piece of mutable application state. Built once at startup and shared
/// with the request handlers; nothing here survives a restart.
pub struct Academy {
    catalog: Arc<Catalog>,
    users: UserStore,
    friends: FriendStore,
}

impl Academy {
    pub fn new(catalog: Arc<Catalog>, hasher: Hasher) -> Academy {
        Academy {
            catalog,
            users: UserStore::new(hasher),
            friends: FriendStore::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn user(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    pub fn user_by_id(&self, user_id: Uuid) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn register(&mut self, username: &str, password: &str, full_name: &str) -> StoreResult<&UserRecord> {
        let user = self.users.register(username, password, full_name)?;
        self.friends.add_user(username);
        Ok(user)
    }

    /// Registration with a hash computed outside the store lock.
    pub fn insert_user(&mut self, username: &str, password_hash: String, full_name: &str) -> StoreResult<&UserRecord> {
        let user = self.users.insert(username, password_hash, full_name)?;
        self.friends.add_user(username);
        Ok(user)
    }

    pub fn password_hash(&self, username: &str) -> Option<String> {
        self.users.password_hash(username).map(str::to_owned)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<&UserRecord> {
        let result = self.users.authenticate(username, password);
        if result.is_err() {
            tracing::debug!(username, "rejected login");
        }
        result
    }

    pub fn update_bio(&mut self, username: &str, bio: &str) -> StoreResult<()> {
        self.users.update_bio(username, bio)
    }

    pub fn complete_module(&mut self, username: &str, class_id: ClassId, module_id: ModuleId) -> StoreResult<()> {
        self.complete_module_at(username, class_id, module_id, OffsetDateTime::now_utc())
    }

    /// Adding an already completed pair keeps its first completion time.
    pub fn complete_module_at(
        &mut self,
        username: &str,
        class_id: ClassId,
        module_id: ModuleId,
        at: OffsetDateTime,
    ) -> StoreResult<()> {
        let Some(class) = self.catalog.class(class_id) else {
            return Err(StoreError::UnknownClass(class_id));
        };
        if !class.has_module(module_id) {
            return Err(StoreError::UnknownModule { class_id, module_id });
        }

        let user = self.users.get_mut(username)?;
        if !user.completed_modules.contains_key(&(class_id, module_id)) {
            user.completed_modules.insert((class_id, module_id), at);
            tracing::info!(username, class_id, module_id, "module completed");
        }
        Ok(())
    }

    /// Awards the class badge when the user's completed modules for the class
    /// equal its module set. Returns true only when this call added the badge.
    pub fn evaluate_badge_eligibility(&mut self, username: &str, class_id: ClassId) -> StoreResult<bool> {
        let Some(class) = self.catalog.class(class_id) else {
            return Err(StoreError::UnknownClass(class_id));
        };
        let Some(badge) = self.catalog.badge_for_class(class_id) else {
            return Ok(false);
        };
        let user = self.users.get_mut(username)?;

        if !progress::is_class_complete(user, class) || !user.earned_badges.insert(badge.badge_id) {
            return Ok(false);
        }
        tracing::info!(username, class_id, badge_id = badge.badge_id, "badge awarded");
        Ok(true)
    }

    /// Marks a module done and re-checks the class badge. Returns the badge if
    /// this completion earned it.
    pub fn complete_and_award(&mut self, username: &str, class_id: ClassId, module_id: ModuleId) -> StoreResult<Option<&BadgeInfo>> {
        self.complete_module(username, class_id, module_id)?;
        if self.evaluate_badge_eligibility(username, class_id)? {
            Ok(self.catalog.badge_for_class(class_id))
        } else {
            Ok(None)
        }
    }

    /// No-op for self-edges and unknown candidates.
    pub fn add_friend(&mut self, user: &str, candidate: &str) -> bool {
        let added = self.friends.add_friend(user, candidate);
        if added {
            tracing::info!(user, candidate, "friendship added");
        }
        added
    }

    pub fn friends_of(&self, user: &str) -> Vec<&UserRecord> {
        self.friends
            .friends_of(user)
            .into_iter()
            .filter_map(|name| self.users.get(name))
            .collect()
    }

    pub fn leaderboard(&self, category: leaderboard::Category, now: OffsetDateTime) -> Vec<leaderboard::Entry> {
        leaderboard::rank(self.users.iter(), category, now)
    }
}
