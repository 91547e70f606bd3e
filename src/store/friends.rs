use std::collections::{BTreeSet, HashMap};

/// Symmetric friend sets keyed by username.
#[derive(Debug, Default)]
pub struct FriendStore {
    friends: HashMap<String, BTreeSet<String>>,
}

impl FriendStore {
    pub(crate) fn add_user(&mut self, username: &str) {
        self.friends.entry(username.to_owned()).or_default();
    }

    /// Returns whether a new edge was created. Unknown users, self-edges and
    /// existing edges leave the store untouched.
    pub fn add_friend(&mut self, user: &str, candidate: &str) -> bool {
        if user == candidate
            || !self.friends.contains_key(user)
            || !self.friends.contains_key(candidate)
        {
            return false;
        }

        let added = self
            .friends
            .get_mut(user)
            .is_some_and(|set| set.insert(candidate.to_owned()));
        if let Some(set) = self.friends.get_mut(candidate) {
            set.insert(user.to_owned());
        }
        added
    }

    pub fn friends_of(&self, user: &str) -> Vec<&str> {
        self.friends
            .get(user)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn are_friends(&self, a: &str, b: &str) -> bool {
        self.friends.get(a).is_some_and(|set| set.contains(b))
    }
}
