use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// One logged entry on the timeline.
///
/// `time` is a zero-padded `HH:MM` string and is the only sort key, so plain
/// string comparison orders the day correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub time: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Creation instant in epoch milliseconds. Stored, never used for ordering.
    pub timestamp: i64,
}

impl Activity {
    pub fn new(name: impl Into<String>, time: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            time: time.into(),
            description: normalize_description(description),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Merge a patch over this record. `id` and `timestamp` never change.
    pub fn apply(&mut self, patch: ActivityPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(description) = patch.description {
            self.description = normalize_description(Some(description));
        }
    }

    pub fn regenerate_id(&mut self) {
        self.id = generate_id();
    }
}

/// Field-wise update for an [`Activity`]. A present field overrides, an absent
/// one keeps the prior value. A blank description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
}

impl ActivityPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.time.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub summary: String,
    pub suggestions: Vec<String>,
}

/// Stable ascending sort on the `time` string.
pub fn sort_by_time(activities: &mut [Activity]) {
    activities.sort_by(|a, b| a.time.cmp(&b.time));
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, time: &str) -> Activity {
        Activity {
            id: id.to_string(),
            name: format!("entry {id}"),
            time: time.to_string(),
            description: None,
            timestamp: 1000,
        }
    }

    #[test]
    fn new_activity_gets_base36_id_and_timestamp() {
        let a = Activity::new("Run", "06:00", None);
        assert_eq!(a.id.len(), ID_LEN);
        assert!(a.id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        assert!(a.timestamp > 0);
    }

    #[test]
    fn apply_keeps_identity_and_overrides_present_fields() {
        let mut a = activity("a1", "07:30");
        a.apply(ActivityPatch {
            time: Some("08:15".into()),
            description: Some("with oat milk".into()),
            ..Default::default()
        });
        assert_eq!(a.id, "a1");
        assert_eq!(a.timestamp, 1000);
        assert_eq!(a.name, "entry a1");
        assert_eq!(a.time, "08:15");
        assert_eq!(a.description.as_deref(), Some("with oat milk"));

        a.apply(ActivityPatch {
            description: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(a.description, None);
    }

    #[test]
    fn sort_by_time_is_lexical_and_stable() {
        let mut list = vec![
            activity("c", "09:00"),
            activity("a", "08:00"),
            activity("b", "09:00"),
        ];
        sort_by_time(&mut list);
        let ids: Vec<_> = list.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn description_may_be_absent_in_json() {
        let a: Activity =
            serde_json::from_str(r#"{"id":"a1","name":"Coffee","time":"07:30","timestamp":1000}"#)
                .unwrap();
        assert_eq!(a.description, None);
    }
}
