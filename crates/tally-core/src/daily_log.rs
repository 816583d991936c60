//! Daily journal: one log per user per day, plus custom tracked fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::enums::FieldType;
use crate::validation::ValidationError;

/// Self-reported mood on a fixed 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validates a raw mood value.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::InvalidMood(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Fixed label for the mood scale.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Very Bad",
            2 => "Bad",
            3 => "Okay",
            4 => "Good",
            _ => "Great",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self.0 {
            1 => "😢",
            2 => "😟",
            3 => "😐",
            4 => "🙂",
            _ => "😄",
        }
    }
}

impl TryFrom<i64> for Mood {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood.0
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's journal row for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: i64,

    pub user: String,

    pub log_date: NaiveDate,

    #[serde(default)]
    pub mood: Option<Mood>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// A user-configured field tracked in the daily log (e.g. "Wake time").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogField {
    pub id: i64,

    pub user: String,

    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Sort key; unique among active fields but not necessarily contiguous.
    pub display_order: i64,

    pub is_active: bool,
}

/// The value of one field in one daily log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,

    pub daily_log_id: i64,

    pub field_id: i64,

    pub value: String,
}

/// A daily log together with all its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogWithEntries {
    #[serde(flatten)]
    pub log: DailyLog,

    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

impl DailyLogWithEntries {
    /// Looks up the entry recorded for `field_id`, if any.
    pub fn entry_for(&self, field_id: i64) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.field_id == field_id)
    }

    /// Pairs each active field (in display order) with its non-empty value.
    pub fn field_values<'a>(&'a self, fields: &'a [LogField]) -> Vec<(&'a str, &'a str)> {
        let mut active: Vec<&LogField> = fields.iter().filter(|f| f.is_active).collect();
        active.sort_by_key(|f| (f.display_order, f.id));
        active
            .into_iter()
            .filter_map(|f| {
                self.entry_for(f.id)
                    .filter(|e| !e.value.is_empty())
                    .map(|e| (f.name.as_str(), e.value.as_str()))
            })
            .collect()
    }
}

/// Values keyed by field name, kept in field display order.
///
/// Serializes as a map whose keys appear in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<V = String>(Vec<(String, V)>);

impl FieldValues {
    /// The log's non-empty values for active fields.
    pub fn from_log(log: &DailyLogWithEntries, fields: &[LogField]) -> Self {
        log.field_values(fields)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

impl<V> FieldValues<V> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<V> Default for FieldValues<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> FromIterator<(String, V)> for FieldValues<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V> std::ops::Index<&str> for FieldValues<V> {
    type Output = V;

    fn index(&self, name: &str) -> &V {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no value for field {name:?}"),
        }
    }
}

impl<V: Serialize> Serialize for FieldValues<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(id: i64, name: &str, active: bool) -> LogField {
        LogField {
            id,
            user: "alice".into(),
            name: name.into(),
            field_type: FieldType::Text,
            display_order: id,
            is_active: active,
        }
    }

    fn entry(field_id: i64, value: &str) -> LogEntry {
        LogEntry {
            id: field_id * 10,
            daily_log_id: 1,
            field_id,
            value: value.into(),
        }
    }

    #[test]
    fn mood_range() {
        assert!(Mood::new(0).is_err());
        assert!(Mood::new(6).is_err());
        assert_eq!(Mood::new(3).unwrap().label(), "Okay");
        assert_eq!(Mood::new(5).unwrap().emoji(), "😄");
    }

    #[test]
    fn mood_serde_as_integer() {
        let mood = Mood::new(4).unwrap();
        assert_eq!(serde_json::to_string(&mood).unwrap(), "4");
        assert!(serde_json::from_str::<Mood>("9").is_err());
    }

    #[test]
    fn field_values_skip_inactive_and_empty() {
        let log = DailyLogWithEntries {
            log: DailyLog {
                id: 1,
                user: "alice".into(),
                log_date: "2024-05-01".parse().unwrap(),
                mood: None,
                notes: None,
            },
            entries: vec![entry(1, "07:00"), entry(2, "old"), entry(3, "")],
        };
        let fields = vec![field(1, "Wake", true), field(2, "Gone", false), field(3, "Blank", true)];
        assert_eq!(log.field_values(&fields), vec![("Wake", "07:00")]);
    }

    #[test]
    fn field_values_follow_display_order_not_name() {
        let log = DailyLogWithEntries {
            log: DailyLog {
                id: 1,
                user: "alice".into(),
                log_date: "2024-05-01".parse().unwrap(),
                mood: None,
                notes: None,
            },
            entries: vec![entry(1, "23:10"), entry(2, "2")],
        };
        let mut sleep = field(1, "Zzz sleep", true);
        sleep.display_order = 0;
        let mut alcohol = field(2, "Alcohol", true);
        alcohol.display_order = 1;

        // Input order should not matter, only display_order.
        let values = FieldValues::from_log(&log, &[alcohol, sleep]);
        assert_eq!(values.names().collect::<Vec<_>>(), vec!["Zzz sleep", "Alcohol"]);
        assert_eq!(values["Alcohol"], "2");
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"{"Zzz sleep":"23:10","Alcohol":"2"}"#
        );
    }
}
