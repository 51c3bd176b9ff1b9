use chronicle_common::{Activity, Insight};

const RAIL: &str = "|";
const COLUMN: usize = 32;

/// Plain-text vertical timeline. Entries alternate sides of the rail.
pub fn render_lines(activities: &[Activity]) -> Vec<String> {
    if activities.is_empty() {
        return vec!["The timeline is silent.".to_string()];
    }

    let mut lines = Vec::with_capacity(activities.len() * 3);
    for (index, activity) in activities.iter().enumerate() {
        let heading = format!("{}  {}", activity.time, activity.name);
        let detail = activity.description.clone().unwrap_or_default();
        let id = format!("[{}]", activity.id);

        for text in [heading, detail, id] {
            if text.is_empty() {
                continue;
            }
            lines.push(if index % 2 == 0 {
                format!("{:>width$} {} ", text, RAIL, width = COLUMN)
            } else {
                format!("{:>width$} {} {}", "", RAIL, text, width = COLUMN)
            });
        }
        lines.push(format!("{:>width$} {}", "", RAIL, width = COLUMN));
    }
    lines
}

pub fn render_insight(insight: &Insight) -> Vec<String> {
    let mut lines = vec![
        "Daily Synthesis".to_string(),
        String::new(),
        format!("\"{}\"", insight.summary),
        String::new(),
    ];
    lines.extend(
        insight
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s)),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, name: &str, time: &str) -> Activity {
        Activity {
            id: id.into(),
            name: name.into(),
            time: time.into(),
            description: None,
            timestamp: 0,
        }
    }

    #[test]
    fn empty_timeline_is_silent() {
        assert_eq!(render_lines(&[]), ["The timeline is silent."]);
    }

    #[test]
    fn entries_alternate_sides() {
        let lines = render_lines(&[
            activity("a1", "Coffee", "07:30"),
            activity("b2", "Run", "08:00"),
        ]);
        let coffee = lines.iter().find(|l| l.contains("Coffee")).unwrap();
        let run = lines.iter().find(|l| l.contains("Run")).unwrap();
        assert!(coffee.find("Coffee").unwrap() < coffee.find(RAIL).unwrap());
        assert!(run.find("Run").unwrap() > run.find(RAIL).unwrap());
    }

    #[test]
    fn insight_suggestions_are_numbered() {
        let lines = render_insight(&Insight {
            summary: "Calm.".into(),
            suggestions: vec!["Walk".into(), "Rest".into()],
        });
        assert!(lines.contains(&"1. Walk".to_string()));
        assert!(lines.contains(&"2. Rest".to_string()));
    }
}
