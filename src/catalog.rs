use std::{collections::{BTreeMap, BTreeSet}, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ClassId = u32;
pub type ModuleId = u32;
pub type BadgeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Foundation,
    Novice,
    Apprentice,
    Proficient,
    Expert,
    Mastery,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Foundation,
        Difficulty::Novice,
        Difficulty::Apprentice,
        Difficulty::Proficient,
        Difficulty::Expert,
        Difficulty::Mastery,
    ];

    pub fn id(&self) -> &'static str {
        use Difficulty::*;
        match self {
            Foundation => "foundation",
            Novice => "novice",
            Apprentice => "apprentice",
            Proficient => "proficient",
            Expert => "expert",
            Mastery => "mastery",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Difficulty {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.id() == s)
            .ok_or_else(|| CatalogError::UnknownFilter(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "4-7")]
    FourToSeven,
    #[serde(rename = "8-10")]
    EightToTen,
    #[serde(rename = "11-13")]
    ElevenToThirteen,
    #[serde(rename = "14+")]
    FourteenPlus,
}

impl AgeRange {
    pub const ALL: [AgeRange; 4] = [
        AgeRange::FourToSeven,
        AgeRange::EightToTen,
        AgeRange::ElevenToThirteen,
        AgeRange::FourteenPlus,
    ];

    pub fn id(&self) -> &'static str {
        use AgeRange::*;
        match self {
            FourToSeven => "4-7",
            EightToTen => "8-10",
            ElevenToThirteen => "11-13",
            FourteenPlus => "14+",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AgeRange {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeRange::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| CatalogError::UnknownFilter(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleInfo {
    pub module_id: ModuleId,
    pub module_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassInfo {
    pub id: ClassId,
    pub title: String,
    /// Markdown.
    pub description: String,
    pub difficulty: Difficulty,
    pub age_range: AgeRange,
    pub modules: Vec<ModuleInfo>,
}

impl ClassInfo {
    pub fn module_ids(&self) -> BTreeSet<ModuleId> {
        self.modules.iter().map(|m| m.module_id).collect()
    }

    pub fn has_module(&self, module_id: ModuleId) -> bool {
        self.modules.iter().any(|m| m.module_id == module_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BadgeInfo {
    pub badge_id: BadgeId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog json: {0}")]
    Json(String),

    #[error("class {0} is defined twice")]
    DuplicateClass(ClassId),

    #[error("module {module_id} appears in class {first} and class {second}")]
    DuplicateModule { module_id: ModuleId, first: ClassId, second: ClassId },

    #[error("badge {0} is defined twice")]
    DuplicateBadge(BadgeId),

    #[error("class {0} has no badge")]
    ClassWithoutBadge(ClassId),

    #[error("class_badges maps unknown class {0}")]
    UnknownClass(ClassId),

    #[error("class {class_id} maps to unknown badge {badge_id}")]
    UnknownBadge { class_id: ClassId, badge_id: BadgeId },

    #[error("badge {badge_id} is awarded by both class {first} and class {second}")]
    SharedBadge { badge_id: BadgeId, first: ClassId, second: ClassId },

    #[error("unknown filter value {0:?}")]
    UnknownFilter(String),
}

#[derive(Deserialize)]
struct RawCatalog {
    classes: Vec<ClassInfo>,
    badges: Vec<BadgeInfo>,
    class_badges: BTreeMap<ClassId, BadgeId>,
}

/// Read-only course data. Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    classes: Vec<ClassInfo>,
    badges: BTreeMap<BadgeId, BadgeInfo>,
    class_badges: BTreeMap<ClassId, BadgeId>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)
            .map_err(|e| CatalogError::Json(e.to_string()))?;
        Catalog::new(raw.classes, raw.badges, raw.class_badges)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Catalog, CatalogError> {
        Catalog::from_json(crate::include_res!(str, "/catalog.json"))
    }

    pub fn new(
        classes: Vec<ClassInfo>,
        badges: Vec<BadgeInfo>,
        class_badges: BTreeMap<ClassId, BadgeId>,
    ) -> Result<Catalog, CatalogError> {
        let mut class_ids = BTreeSet::new();
        let mut module_owner: BTreeMap<ModuleId, ClassId> = BTreeMap::new();
        for class in &classes {
            if !class_ids.insert(class.id) {
                return Err(CatalogError::DuplicateClass(class.id));
            }
            for module in &class.modules {
                if let Some(first) = module_owner.insert(module.module_id, class.id) {
                    return Err(CatalogError::DuplicateModule {
                        module_id: module.module_id,
                        first,
                        second: class.id,
                    });
                }
            }
        }

        let mut badge_map = BTreeMap::new();
        for badge in badges {
            let badge_id = badge.badge_id;
            if badge_map.insert(badge_id, badge).is_some() {
                return Err(CatalogError::DuplicateBadge(badge_id));
            }
        }

        let mut badge_owner: BTreeMap<BadgeId, ClassId> = BTreeMap::new();
        for (&class_id, &badge_id) in &class_badges {
            if !class_ids.contains(&class_id) {
                return Err(CatalogError::UnknownClass(class_id));
            }
            if !badge_map.contains_key(&badge_id) {
                return Err(CatalogError::UnknownBadge { class_id, badge_id });
            }
            if let Some(first) = badge_owner.insert(badge_id, class_id) {
                return Err(CatalogError::SharedBadge { badge_id, first, second: class_id });
            }
        }
        if let Some(missing) = class_ids.iter().find(|id| !class_badges.contains_key(id)) {
            return Err(CatalogError::ClassWithoutBadge(*missing));
        }

        Ok(Catalog { classes, badges: badge_map, class_badges })
    }

    pub fn classes(&self) -> &[ClassInfo] {
        &self.classes
    }

    pub fn class(&self, class_id: ClassId) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    pub fn badge(&self, badge_id: BadgeId) -> Option<&BadgeInfo> {
        self.badges.get(&badge_id)
    }

    pub fn badge_for_class(&self, class_id: ClassId) -> Option<&BadgeInfo> {
        self.class_badges
            .get(&class_id)
            .and_then(|badge_id| self.badges.get(badge_id))
    }

    pub fn contains_module(&self, class_id: ClassId, module_id: ModuleId) -> bool {
        self.class(class_id).is_some_and(|c| c.has_module(module_id))
    }

    pub fn total_modules(&self) -> usize {
        self.classes.iter().map(|c| c.modules.len()).sum()
    }

    /// Empty filter lists match everything.
    pub fn filter_classes<'a>(
        &'a self,
        ages: &'a [AgeRange],
        difficulties: &'a [Difficulty],
    ) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        self.classes.iter().filter(move |c| {
            (ages.is_empty() || ages.contains(&c.age_range))
                && (difficulties.is_empty() || difficulties.contains(&c.difficulty))
        })
    }
}
