use serde::Deserialize;
use time::OffsetDateTime;

use super::users::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Badges,
    Modules,
    Monthly,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Badges, Category::Modules, Category::Monthly];

    pub fn id(&self) -> &'static str {
        match self {
            Category::Badges => "badges",
            Category::Modules => "modules",
            Category::Monthly => "monthly",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Badges => "Badges Earned",
            Category::Modules => "Modules Completed",
            Category::Monthly => "Monthly Progress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub rank: usize,
    pub username: String,
    pub full_name: String,
    pub score: usize,
}

fn same_month(a: OffsetDateTime, b: OffsetDateTime) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn score(user: &UserRecord, category: Category, now: OffsetDateTime) -> usize {
    match category {
        Category::Badges => user.earned_badges().len(),
        Category::Modules => user.completed_count(),
        Category::Monthly => user
            .completed_modules
            .values()
            .filter(|&&at| same_month(at.to_offset(time::UtcOffset::UTC), now.to_offset(time::UtcOffset::UTC)))
            .count(),
    }
}

/// Highest score first, ties broken by username. Equal scores share a rank.
pub fn rank<'a>(
    users: impl IntoIterator<Item = &'a UserRecord>,
    category: Category,
    now: OffsetDateTime,
) -> Vec<Entry> {
    let mut scored: Vec<(&UserRecord, usize)> = users
        .into_iter()
        .map(|user| (user, score(user, category, now)))
        .collect();
    scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.username.cmp(&b.username)));

    let mut entries: Vec<Entry> = Vec::with_capacity(scored.len());
    for (i, (user, score)) in scored.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => i + 1,
        };
        entries.push(Entry {
            rank,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            score,
        });
    }
    entries
}
