use chrono::Local;
use chronicle_common::{Activity, ActivityPatch};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("an activity needs a name")]
    MissingName,
    #[error("an activity needs a time")]
    MissingTime,
    #[error("time must be HH:MM in 24-hour form")]
    MalformedTime,
}

/// Form backing the create/edit modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEditor {
    pub name: String,
    pub time: String,
    pub description: String,
}

impl RecordEditor {
    /// Blank form with the time pre-filled to the current local minute.
    pub fn for_create() -> Self {
        Self {
            time: Local::now().format("%H:%M").to_string(),
            ..Default::default()
        }
    }

    pub fn for_edit(activity: &Activity) -> Self {
        Self {
            name: activity.name.clone(),
            time: activity.time.clone(),
            description: activity.description.clone().unwrap_or_default(),
        }
    }

    pub fn submit(&self) -> Result<ActivityPatch, ValidationError> {
        let time = self.time.trim();
        validate_fields(&self.name, time)?;

        Ok(ActivityPatch {
            name: Some(self.name.clone()),
            time: Some(time.to_string()),
            description: Some(self.description.clone()),
        })
    }
}

/// Checks the required fields of a record about to be stored.
pub fn validate_fields(name: &str, time: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if time.trim().is_empty() {
        return Err(ValidationError::MissingTime);
    }
    if !is_time_of_day(time) {
        return Err(ValidationError::MalformedTime);
    }
    Ok(())
}

/// Zero-padded 24-hour `HH:MM`, the only shape that sorts correctly as text.
pub fn is_time_of_day(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hours = (digits[0] - b'0') * 10 + (digits[1] - b'0');
    let minutes = (digits[2] - b'0') * 10 + (digits[3] - b'0');
    hours < 24 && minutes < 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_prefills_current_time() {
        let form = RecordEditor::for_create();
        assert!(form.name.is_empty());
        assert!(is_time_of_day(&form.time));
    }

    #[test]
    fn edit_form_copies_record() {
        let mut activity = Activity::new("Coffee", "07:30", Some("espresso".into()));
        let form = RecordEditor::for_edit(&activity);
        assert_eq!(form.description, "espresso");

        activity.description = None;
        assert_eq!(RecordEditor::for_edit(&activity).description, "");
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let form = RecordEditor {
            name: "  ".into(),
            time: "07:30".into(),
            description: String::new(),
        };
        assert_eq!(form.submit(), Err(ValidationError::MissingName));

        let form = RecordEditor {
            name: "Coffee".into(),
            time: "".into(),
            description: String::new(),
        };
        assert_eq!(form.submit(), Err(ValidationError::MissingTime));
    }

    #[test]
    fn time_must_be_padded_24_hour() {
        for bad in ["7:30", "24:00", "07:60", "07-30", "ab:cd"] {
            assert!(!is_time_of_day(bad), "{bad} should be rejected");
        }
        for good in ["00:00", "07:30", "23:59"] {
            assert!(is_time_of_day(good));
        }
    }

    #[test]
    fn submit_yields_full_patch() {
        let form = RecordEditor {
            name: "Run".into(),
            time: " 06:00 ".into(),
            description: String::new(),
        };
        let patch = form.submit().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Run"));
        assert_eq!(patch.time.as_deref(), Some("06:00"));
        assert_eq!(patch.description.as_deref(), Some(""));
    }
}
