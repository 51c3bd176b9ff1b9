use crate::error::InsightError;
use crate::llm::InsightGenerator;
use crate::models::{Activity, Insight};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

struct CannedInsight {
    summary: &'static str,
    suggestions: [&'static str; 3],
}

impl CannedInsight {
    fn to_insight(&self) -> Insight {
        Insight {
            summary: self.summary.to_string(),
            suggestions: self.suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

static DENSE_DAY: CannedInsight = CannedInsight {
    summary: "Your day is remarkably dense with activity. You've maintained a high-output rhythm, but the density suggests you might be nearing a cognitive threshold.",
    suggestions: [
        "Schedule a 'zero-input' window of 15 minutes to clear mental cache.",
        "Prioritize one high-impact task for the next hour and defer the rest.",
        "Ensure you're hydrating; high-density schedules often lead to neglected basics.",
    ],
};

static BALANCED_FLOW: [CannedInsight; 2] = [
    CannedInsight {
        summary: "You've established a consistent and healthy flow. Your cadence between events shows intentionality and focus.",
        suggestions: [
            "This is your peak performance window. Tackle your hardest problem now.",
            "Document one small win from the morning to boost afternoon morale.",
            "Check your posture. Reset your shoulders and neck before the next log.",
        ],
    },
    CannedInsight {
        summary: "A balanced start to the day. You are navigating between tasks with enough breathing room to maintain quality.",
        suggestions: [
            "Consider a short walk to consolidate the learning from your last task.",
            "Prepare your environment for the next transition.",
            "Reflect on if the current 'time' of these events matches your natural energy.",
        ],
    },
];

static FORMATIVE_STAGE: CannedInsight = CannedInsight {
    summary: "The day is still in its formative stages. This is the 'quiet before the storm', a perfect time for strategic intent.",
    suggestions: [
        "Define the 'one thing' that would make today a success.",
        "Check in with your energy levels: Are you fueled for the afternoon?",
        "Set a reminder for a mindful transition into your next big block of work.",
    ],
};

const DENSE_THRESHOLD: usize = 6;
const BALANCED_THRESHOLD: usize = 3;

/// Placeholder synthesis that only looks at how many entries the day has.
pub struct CannedInsights {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl CannedInsights {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant choice for reproducible runs.
    pub fn seeded(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick_balanced_variant(&self) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..BALANCED_FLOW.len()),
            // A poisoned lock only means another caller panicked mid-choice.
            Err(poisoned) => poisoned.into_inner().gen_range(0..BALANCED_FLOW.len()),
        }
    }

    fn select(&self, count: usize) -> Option<Insight> {
        let canned = match count {
            0 => return None,
            n if n >= DENSE_THRESHOLD => &DENSE_DAY,
            n if n >= BALANCED_THRESHOLD => &BALANCED_FLOW[self.pick_balanced_variant()],
            _ => &FORMATIVE_STAGE,
        };
        Some(canned.to_insight())
    }
}

#[async_trait]
impl InsightGenerator for CannedInsights {
    async fn analyze(&self, activities: &[Activity]) -> Result<Option<Insight>, InsightError> {
        if activities.is_empty() {
            return Ok(None);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        debug!("Selecting canned insight for {} activities", activities.len());
        Ok(self.select(activities.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(count: usize) -> Vec<Activity> {
        (0..count)
            .map(|i| Activity::new(format!("entry {i}"), format!("{:02}:00", i), None))
            .collect()
    }

    fn generator() -> CannedInsights {
        CannedInsights::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn empty_day_has_no_insight() {
        assert_eq!(generator().analyze(&[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn six_or_more_entries_read_as_dense() {
        let generator = generator();
        for count in [6, 7, 20] {
            let insight = generator.analyze(&day(count)).await.unwrap().unwrap();
            assert_eq!(insight.summary, DENSE_DAY.summary);
            assert_eq!(insight.suggestions.len(), 3);
        }
    }

    #[tokio::test]
    async fn mid_range_picks_one_of_two_balanced_variants() {
        let generator = generator();
        let allowed = [BALANCED_FLOW[0].summary, BALANCED_FLOW[1].summary];
        for count in [3, 4, 5] {
            let insight = generator.analyze(&day(count)).await.unwrap().unwrap();
            assert!(allowed.contains(&insight.summary.as_str()));
        }
    }

    #[tokio::test]
    async fn short_day_is_formative() {
        let generator = generator();
        for count in [1, 2] {
            let insight = generator.analyze(&day(count)).await.unwrap().unwrap();
            assert_eq!(insight.summary, FORMATIVE_STAGE.summary);
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let a = CannedInsights::seeded(Duration::ZERO, 7);
        let b = CannedInsights::seeded(Duration::ZERO, 7);
        let picks_a: Vec<_> = (0..16).map(|_| a.pick_balanced_variant()).collect();
        let picks_b: Vec<_> = (0..16).map(|_| b.pick_balanced_variant()).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|&i| i < BALANCED_FLOW.len()));
    }
}
