//! Completion state and badge eligibility derived from the catalog and a
//! user's completed-module set.

use std::collections::BTreeSet;

use crate::catalog::{Catalog, ClassId, ClassInfo, ModuleId};

use super::users::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassProgress {
    pub completed: usize,
    pub total: usize,
}

impl ClassProgress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    pub fn percent(&self) -> usize {
        match self.total {
            0 => 0,
            total => self.completed * 100 / total,
        }
    }
}

/// Module ids of `class` the user has completed.
pub fn completed_in_class(user: &UserRecord, class_id: ClassId) -> BTreeSet<ModuleId> {
    user.completed_modules()
        .filter(|&(c, _)| c == class_id)
        .map(|(_, m)| m)
        .collect()
}

pub fn class_progress(user: &UserRecord, class: &ClassInfo) -> ClassProgress {
    ClassProgress {
        completed: class.modules.iter().filter(|m| user.has_completed(class.id, m.module_id)).count(),
        total: class.modules.len(),
    }
}

/// Whether the user's completed modules for `class` equal the class's
/// required module set.
pub fn is_class_complete(user: &UserRecord, class: &ClassInfo) -> bool {
    !class.modules.is_empty() && completed_in_class(user, class.id) == class.module_ids()
}

pub fn overall_progress(user: &UserRecord, catalog: &Catalog) -> ClassProgress {
    ClassProgress {
        completed: user.completed_count(),
        total: catalog.total_modules(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::catalog::tests::small_catalog;

    fn user_with(done: &[(ClassId, ModuleId)]) -> UserRecord {
        UserRecord {
            user_id: Uuid::now_v7(),
            username: "kim".to_owned(),
            password_hash: String::new(),
            full_name: "Kim".to_owned(),
            bio: String::new(),
            completed_modules: done.iter().map(|&k| (k, OffsetDateTime::UNIX_EPOCH)).collect::<BTreeMap<_, _>>(),
            earned_badges: BTreeSet::new(),
        }
    }

    #[test]
    fn partial_class_is_not_complete() {
        let catalog = small_catalog();
        let class = catalog.class(1).unwrap();
        let user = user_with(&[(1, 11), (1, 12), (2, 21)]);
        assert!(!is_class_complete(&user, class));
        assert_eq!(class_progress(&user, class), ClassProgress { completed: 2, total: 3 });
        assert_eq!(class_progress(&user, class).percent(), 66);
    }

    #[test]
    fn full_class_is_complete() {
        let catalog = small_catalog();
        let user = user_with(&[(1, 11), (1, 12), (1, 13)]);
        assert!(is_class_complete(&user, catalog.class(1).unwrap()));
        assert!(!is_class_complete(&user, catalog.class(2).unwrap()));
        assert_eq!(overall_progress(&user, &catalog), ClassProgress { completed: 3, total: 5 });
    }

    #[test]
    fn completed_in_class_ignores_other_classes() {
        let user = user_with(&[(1, 11), (2, 21), (2, 22)]);
        assert_eq!(completed_in_class(&user, 2), BTreeSet::from([21, 22]));
    }
}
