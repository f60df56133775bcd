use crate::model::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    DateAsc,
    /// Most recently updated first.
    #[default]
    DateDesc,
    PriorityHigh,
    PriorityLow,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        Self::DateAsc,
        Self::DateDesc,
        Self::PriorityHigh,
        Self::PriorityLow,
        Self::NameAsc,
        Self::NameDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateAsc => "date-asc",
            Self::DateDesc => "date-desc",
            Self::PriorityHigh => "priority-high",
            Self::PriorityLow => "priority-low",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DateAsc => "Oldest first",
            Self::DateDesc => "Newest first",
            Self::PriorityHigh => "Priority: high to low",
            Self::PriorityLow => "Priority: low to high",
            Self::NameAsc => "Name: A to Z",
            Self::NameDesc => "Name: Z to A",
        }
    }

    /// Descending keys swap the operands instead of reversing the result
    /// list, so equal elements keep their input order in both directions.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::DateAsc => a.updated_at.cmp(&b.updated_at),
            Self::DateDesc => b.updated_at.cmp(&a.updated_at),
            Self::PriorityHigh => a.priority.rank().cmp(&b.priority.rank()),
            Self::PriorityLow => b.priority.rank().cmp(&a.priority.rank()),
            Self::NameAsc => compare_titles(&a.title, &b.title),
            Self::NameDesc => compare_titles(&b.title, &a.title),
        }
    }

    /// Stable in-place sort.
    pub fn sort(self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }
}

/// Case-insensitive title collation. Titles that differ only in case tie.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match cleaned.as_str() {
            "date-asc" | "date-ascending" | "oldest" => Ok(Self::DateAsc),
            "date-desc" | "date-descending" | "newest" | "date" => Ok(Self::DateDesc),
            "priority-high" | "priority-high-first" | "priority" => Ok(Self::PriorityHigh),
            "priority-low" | "priority-low-first" => Ok(Self::PriorityLow),
            "name-asc" | "name-ascending" | "name" | "a-z" => Ok(Self::NameAsc),
            "name-desc" | "name-descending" | "z-a" => Ok(Self::NameDesc),
            other => {
                let known: Vec<&str> = Self::ALL.iter().map(|key| key.as_str()).collect();
                Err(format!(
                    "unknown sort key '{other}' (expected one of {})",
                    known.join(", ")
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SortKey, compare_titles};
    use std::cmp::Ordering;

    #[test]
    fn title_collation_ignores_case() {
        assert_eq!(compare_titles("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_titles("Zebra", "apple"), Ordering::Greater);
        assert_eq!(compare_titles("Report", "report"), Ordering::Equal);
        assert_eq!(compare_titles("Ärger", "ärger"), Ordering::Equal);
        assert_eq!(compare_titles("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("date-asc".parse::<SortKey>(), Ok(SortKey::DateAsc));
        assert_eq!("Priority High First".parse::<SortKey>(), Ok(SortKey::PriorityHigh));
        assert_eq!("z-a".parse::<SortKey>(), Ok(SortKey::NameDesc));
        let err = "random".parse::<SortKey>().unwrap_err();
        assert!(err.contains("name-desc"));
    }

    #[test]
    fn default_is_newest_first() {
        assert_eq!(SortKey::default(), SortKey::DateDesc);
    }

    #[test]
    fn wire_names_match_display() {
        for key in SortKey::ALL {
            let encoded = serde_json::to_value(key).unwrap();
            assert_eq!(encoded, serde_json::json!(key.as_str()));
            assert_eq!(key.to_string().parse::<SortKey>(), Ok(key));
        }
    }
}
