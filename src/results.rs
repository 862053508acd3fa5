use crate::models::AnswerRecord;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Mid,
    Low,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 50 {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }
}

/// Aggregate outcome of a finished quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub total_seconds: f64,
    pub average_seconds: f64,
    pub records: Vec<AnswerRecord>,
}

impl QuizResult {
    pub fn from_records(records: &[AnswerRecord], elapsed: Duration) -> Self {
        let total_questions = records.len();
        let correct_count = records.iter().filter(|r| r.is_correct).count();
        let total_seconds = elapsed.as_secs_f64();
        let (score, average_seconds) = if total_questions == 0 {
            (0, 0.0)
        } else {
            (
                (100.0 * correct_count as f64 / total_questions as f64).round() as u32,
                total_seconds / total_questions as f64,
            )
        };
        Self {
            score,
            correct_count,
            total_questions,
            total_seconds,
            average_seconds,
            records: records.to_vec(),
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    pub fn headline(&self) -> &'static str {
        if self.score >= 50 {
            "Good Job!"
        } else {
            "Keep Practicing"
        }
    }

    pub fn speed_label(&self) -> &'static str {
        speed_label(self.average_seconds)
    }

    pub fn incorrect(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.records.iter().filter(|r| !r.is_correct)
    }
}

pub fn speed_label(average_seconds: f64) -> &'static str {
    if average_seconds <= 10.0 {
        "Very Fast"
    } else if average_seconds <= 20.0 {
        "Fast"
    } else if average_seconds <= 30.0 {
        "Moderate"
    } else {
        "Slow"
    }
}

/// `"<m>m <s>s"` from one minute up, `"<s>s"` below.
pub fn format_time(seconds: f64) -> String {
    let whole = seconds.max(0.0).round() as u64;
    if whole >= 60 {
        format!("{}m {}s", whole / 60, whole % 60)
    } else {
        format!("{}s", whole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_correct: bool) -> AnswerRecord {
        AnswerRecord {
            question_text: "Q".to_string(),
            selected_answer: if is_correct { "x" } else { "y" }.to_string(),
            correct_answer: "x".to_string(),
            is_correct,
            explanation: None,
        }
    }

    #[test]
    fn test_three_of_four() {
        let records = vec![record(true), record(true), record(false), record(true)];
        let result = QuizResult::from_records(&records, Duration::from_secs(60));
        assert_eq!(result.score, 75);
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.average_seconds, 15.0);
        assert_eq!(result.speed_label(), "Fast");
        assert_eq!(result.band(), ScoreBand::Mid);
        assert_eq!(result.incorrect().count(), 1);
    }

    #[test]
    fn test_score_rounds() {
        let records = vec![record(true), record(false), record(false)];
        let result = QuizResult::from_records(&records, Duration::from_secs(3));
        assert_eq!(result.score, 33);
        assert_eq!(result.headline(), "Keep Practicing");

        let records = vec![record(true), record(true), record(false)];
        assert_eq!(QuizResult::from_records(&records, Duration::ZERO).score, 67);
    }

    #[test]
    fn test_speed_label_boundaries() {
        assert_eq!(speed_label(10.0), "Very Fast");
        assert_eq!(speed_label(10.1), "Fast");
        assert_eq!(speed_label(20.0), "Fast");
        assert_eq!(speed_label(30.0), "Moderate");
        assert_eq!(speed_label(30.1), "Slow");
    }

    #[test]
    fn test_bands_and_headline() {
        assert_eq!(ScoreBand::from_score(80), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Mid);
        assert_eq!(ScoreBand::from_score(50), ScoreBand::Mid);
        assert_eq!(ScoreBand::from_score(49), ScoreBand::Low);

        let result = QuizResult::from_records(&[record(true), record(false)], Duration::ZERO);
        assert_eq!(result.headline(), "Good Job!");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0s");
        assert_eq!(format_time(59.4), "59s");
        assert_eq!(format_time(60.0), "1m 0s");
        assert_eq!(format_time(125.0), "2m 5s");
    }

    #[test]
    fn test_empty_records() {
        let result = QuizResult::from_records(&[], Duration::from_secs(5));
        assert_eq!(result.score, 0);
        assert_eq!(result.average_seconds, 0.0);
    }
}
