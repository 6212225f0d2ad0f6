use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Profile fields requested for every friend list.
pub const DEFAULT_FIELDS: [&str; 5] = ["sex", "country", "education", "city", "bdate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "ж")]
    Female,
    #[serde(rename = "м")]
    Male,
}

impl Sex {
    /// VK encodes female as 1. Everything else, including "unspecified", maps to male.
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Sex::Female
        } else {
            Sex::Male
        }
    }
}

/// One vertex of the friend graph. `name` is the join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub name: String,
    pub name_label: String,
    pub sex: Sex,
    pub byear: String,
    pub id: u64,
    pub city: String,
    pub country: String,
    pub faculty_name: String,
    pub university_name: String,
    #[serde(default)]
    pub n_friends: usize,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    id: u64,
    first_name: String,
    last_name: String,
    #[serde(default)]
    sex: i64,
    #[serde(default)]
    bdate: String,
    city: Option<Place>,
    country: Option<Place>,
    #[serde(default)]
    faculty_name: String,
    #[serde(default)]
    university_name: String,
}

/// Trailing four characters of a "D.M.YYYY"-shaped date, empty when the
/// string is too short to carry a year.
pub fn birth_year(bdate: &str) -> String {
    let len = bdate.chars().count();
    if len > 6 {
        bdate.chars().skip(len - 4).collect()
    } else {
        String::new()
    }
}

/// Converts one raw friend record into a `Friend`. Deactivated accounts and
/// records of an unexpected shape yield `None`.
pub fn normalize(raw: &Value) -> Option<Friend> {
    if let Some(status) = raw.get("deactivated") {
        debug!("skipping deactivated account {} ({})", raw["id"], status);
        return None;
    }

    let person: RawPerson = match RawPerson::deserialize(raw) {
        Ok(person) => person,
        Err(e) => {
            warn!("skipping malformed person record {}: {}", raw["id"], e);
            return None;
        }
    };

    Some(Friend {
        name: format!("{} {}", person.first_name, person.last_name),
        name_label: format!("{}\n{}", person.first_name, person.last_name),
        sex: Sex::from_code(person.sex),
        byear: birth_year(&person.bdate),
        id: person.id,
        city: person.city.map(|c| c.title).unwrap_or_default(),
        country: person.country.map(|c| c.title).unwrap_or_default(),
        faculty_name: person.faculty_name,
        university_name: person.university_name,
        n_friends: 0,
    })
}

pub fn normalize_all(raw: &[Value]) -> Vec<Friend> {
    raw.iter().filter_map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_record() {
        let raw = json!({
            "id": 42,
            "first_name": "Ann",
            "last_name": "Lee",
            "sex": 1,
            "bdate": "12.3.1994",
            "city": {"id": 1, "title": "Moscow"},
            "country": {"id": 1, "title": "Russia"},
            "faculty_name": "Physics",
            "university_name": "MSU"
        });

        let friend = normalize(&raw).unwrap();
        assert_eq!(
            friend,
            Friend {
                name: "Ann Lee".to_string(),
                name_label: "Ann\nLee".to_string(),
                sex: Sex::Female,
                byear: "1994".to_string(),
                id: 42,
                city: "Moscow".to_string(),
                country: "Russia".to_string(),
                faculty_name: "Physics".to_string(),
                university_name: "MSU".to_string(),
                n_friends: 0,
            }
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let raw = json!({"id": 7, "first_name": "Bob", "last_name": "Fox", "sex": 2});
        let friend = normalize(&raw).unwrap();
        assert_eq!(friend.sex, Sex::Male);
        assert_eq!(friend.byear, "");
        assert_eq!(friend.city, "");
        assert_eq!(friend.country, "");
        assert_eq!(friend.faculty_name, "");
    }

    #[test]
    fn test_unspecified_sex_is_male() {
        let raw = json!({"id": 7, "first_name": "Bob", "last_name": "Fox", "sex": 0});
        assert_eq!(normalize(&raw).unwrap().sex, Sex::Male);
    }

    #[test]
    fn test_deactivated_records_are_skipped() {
        for status in ["deleted", "banned"] {
            let raw = json!({
                "id": 9,
                "first_name": "DELETED",
                "last_name": "",
                "deactivated": status
            });
            assert!(normalize(&raw).is_none());
        }
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let raws = vec![
            json!({"id": "not-a-number", "first_name": "X", "last_name": "Y"}),
            json!({"id": 3}),
            json!({"id": 4, "first_name": "Ok", "last_name": "Person"}),
        ];
        let friends = normalize_all(&raws);
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].name, "Ok Person");
    }

    #[test]
    fn test_birth_year_without_year() {
        assert_eq!(birth_year("12.3"), "");
        assert_eq!(birth_year("1.12.9"), "");
        assert_eq!(birth_year(""), "");
        assert_eq!(birth_year("1.1.2001"), "2001");
    }

    #[test]
    fn test_sex_serializes_as_marker() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"ж\"");
        assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"м\"");
    }

    proptest! {
        #[test]
        fn prop_long_dates_keep_last_four(prefix in "[0-9.]{3,6}", year in "[0-9]{4}") {
            let bdate = format!("{}{}", prefix, year);
            prop_assert_eq!(birth_year(&bdate), year);
        }

        #[test]
        fn prop_short_dates_have_no_year(bdate in "[0-9.]{0,6}") {
            prop_assert_eq!(birth_year(&bdate), "");
        }
    }
}
