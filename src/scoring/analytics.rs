// src/scoring/analytics.rs

use crate::{
    models::{
        analytics::{
            AnswerFactRow, OverallStats, PerformanceReport, RecentTest, SectionPerformance,
            StrengthsWeaknesses, SubmittedAttemptRow, TimeAnalysis,
        },
        question::{QuestionType, Section},
    },
    scoring::aggregate::{percentage, round_half_up},
};

pub const RECENT_TESTS_LIMIT: usize = 10;
/// Attempts compared on each side of the improvement trend.
pub const TREND_WINDOW: usize = 3;
pub const STRONG_ACCURACY: i64 = 80;
pub const WEAK_ACCURACY: i64 = 60;
pub const DECLINE_THRESHOLD: i64 = -5;
pub const SLOW_SECONDS_PER_QUESTION: f64 = 120.0;

/// Builds the performance history of one student.
///
/// `attempts` must be the student's submitted attempts, newest first.
/// `facts` are the answers belonging to those attempts; unanswered ones
/// are ignored.
pub fn summarize(attempts: &[SubmittedAttemptRow], facts: &[AnswerFactRow]) -> PerformanceReport {
    if attempts.is_empty() {
        return PerformanceReport {
            overall_stats: OverallStats::default(),
            section_wise_performance: vec![],
            recent_tests: vec![],
            time_analysis: vec![],
            strengths_weaknesses: StrengthsWeaknesses::default(),
        };
    }

    let overall_stats = overall(attempts);
    let section_wise_performance = section_performance(facts);
    let time_analysis = time_by_type(facts);

    let recent_tests = attempts
        .iter()
        .take(RECENT_TESTS_LIMIT)
        .map(|a| RecentTest {
            attempt_id: a.attempt_id,
            test_title: a.test_title.clone(),
            score: a.obtained_marks,
            percentage: percentage(a.obtained_marks, a.total_marks),
            date: a.submitted_at,
            time_spent: a.time_spent_seconds,
        })
        .collect();

    let question_count: i64 = attempts.iter().map(|a| a.question_count).sum();
    let seconds_per_question = if question_count > 0 {
        overall_stats.total_time_spent as f64 / question_count as f64
    } else {
        0.0
    };

    let strengths_weaknesses =
        assess(&overall_stats, &section_wise_performance, seconds_per_question);

    PerformanceReport {
        overall_stats,
        section_wise_performance,
        recent_tests,
        time_analysis,
        strengths_weaknesses,
    }
}

fn score_percent(attempt: &SubmittedAttemptRow) -> f64 {
    if attempt.total_marks <= 0 {
        return 0.0;
    }
    attempt.obtained_marks as f64 / attempt.total_marks as f64 * 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn overall(attempts: &[SubmittedAttemptRow]) -> OverallStats {
    let average = mean(attempts.iter().map(score_percent));
    let best = attempts
        .iter()
        .map(|a| round_half_up(score_percent(a)))
        .max()
        .unwrap_or(0);

    let improvement_trend = if attempts.len() >= TREND_WINDOW * 2 {
        let recent = mean(attempts[..TREND_WINDOW].iter().map(score_percent));
        let previous = mean(attempts[TREND_WINDOW..TREND_WINDOW * 2].iter().map(score_percent));
        round_half_up(recent - previous)
    } else {
        0
    };

    OverallStats {
        total_tests: attempts.len() as i64,
        average_score: round_half_up(average),
        best_score: best,
        total_time_spent: attempts.iter().map(|a| a.time_spent_seconds).sum(),
        improvement_trend,
    }
}

fn ratio_percent(part: i64, whole: i64) -> i64 {
    if whole == 0 {
        0
    } else {
        round_half_up(part as f64 / whole as f64 * 100.0)
    }
}

fn average_time<'a>(facts: impl Iterator<Item = &'a AnswerFactRow>) -> (i64, i64, i64) {
    let answered = facts.filter(|f| f.is_answered());
    let (count, correct, time) = answered.fold((0, 0, 0), |(n, c, t), f| {
        (n + 1, c + i64::from(f.is_correct.unwrap_or(false)), t + f.time_spent_seconds)
    });
    let avg = if count == 0 {
        0
    } else {
        round_half_up(time as f64 / count as f64)
    };
    (count, correct, avg)
}

fn section_performance(facts: &[AnswerFactRow]) -> Vec<SectionPerformance> {
    Section::ALL
        .into_iter()
        .map(|section| {
            let (total, correct, avg_time) =
                average_time(facts.iter().filter(|f| f.section == section));
            SectionPerformance {
                section,
                average_score: ratio_percent(correct, total),
                total_questions: total,
                correct_answers: correct,
                average_time: avg_time,
            }
        })
        .collect()
}

fn time_by_type(facts: &[AnswerFactRow]) -> Vec<TimeAnalysis> {
    QuestionType::ALL
        .into_iter()
        .map(|question_type| {
            let (total, correct, avg_time) =
                average_time(facts.iter().filter(|f| f.question_type == question_type));
            TimeAnalysis {
                question_type: question_type.label(),
                average_time: avg_time,
                accuracy: ratio_percent(correct, total),
            }
        })
        .collect()
}

fn assess(
    stats: &OverallStats,
    sections: &[SectionPerformance],
    seconds_per_question: f64,
) -> StrengthsWeaknesses {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    // a section with nothing answered says nothing either way
    for s in sections.iter().filter(|s| s.total_questions > 0) {
        if s.average_score >= STRONG_ACCURACY {
            strengths.push(format!("Strong performance in {}", s.section));
        } else if s.average_score < WEAK_ACCURACY {
            weaknesses.push(format!("Needs improvement in {}", s.section));
            recommendations.push(format!("Focus more practice on {} concepts", s.section));
        }
    }

    if stats.average_score >= STRONG_ACCURACY {
        strengths.push("Consistently high performance across tests".to_string());
    }

    if stats.improvement_trend > 0 {
        strengths.push("Showing positive improvement trend".to_string());
    } else if stats.improvement_trend < DECLINE_THRESHOLD {
        weaknesses.push("Recent performance decline".to_string());
        recommendations.push("Review recent test mistakes and practice more".to_string());
    }

    if seconds_per_question > SLOW_SECONDS_PER_QUESTION {
        weaknesses.push("Taking too much time per question".to_string());
        recommendations
            .push("Practice time management and quick problem-solving techniques".to_string());
    }

    if strengths.is_empty() {
        strengths.push("Keep practicing to build strengths".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("No major weaknesses identified".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Continue regular practice".to_string());
    }

    StrengthsWeaknesses {
        strengths,
        weaknesses,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(id: i64, obtained: i64, total: i64, time: i64) -> SubmittedAttemptRow {
        SubmittedAttemptRow {
            attempt_id: id,
            test_title: format!("Mock {}", id),
            obtained_marks: obtained,
            total_marks: total,
            time_spent_seconds: time,
            question_count: 10,
            submitted_at: None,
        }
    }

    fn fact(section: Section, question_type: QuestionType, correct: bool, time: i64) -> AnswerFactRow {
        AnswerFactRow {
            section,
            question_type,
            is_correct: Some(correct),
            time_spent_seconds: time,
        }
    }

    #[test]
    fn test_no_attempts_gives_empty_report() {
        let report = summarize(&[], &[]);
        assert_eq!(report.overall_stats, OverallStats::default());
        assert!(report.recent_tests.is_empty());
        assert!(report.section_wise_performance.is_empty());
        assert!(report.strengths_weaknesses.strengths.is_empty());
    }

    #[test]
    fn test_overall_stats() {
        let attempts = vec![attempt(2, 30, 40, 600), attempt(1, 10, 40, 300)];
        let report = summarize(&attempts, &[]);

        assert_eq!(report.overall_stats.total_tests, 2);
        assert_eq!(report.overall_stats.average_score, 50);
        assert_eq!(report.overall_stats.best_score, 75);
        assert_eq!(report.overall_stats.total_time_spent, 900);
        assert_eq!(report.overall_stats.improvement_trend, 0);
        assert_eq!(report.recent_tests[0].percentage, 75);
    }

    #[test]
    fn test_improvement_trend_needs_six_attempts() {
        // newest first: recent three average 80, previous three average 50
        let attempts: Vec<SubmittedAttemptRow> = [80, 80, 80, 50, 50, 50]
            .iter()
            .enumerate()
            .map(|(i, &m)| attempt(i as i64, m, 100, 60))
            .collect();

        let report = summarize(&attempts, &[]);
        assert_eq!(report.overall_stats.improvement_trend, 30);
        assert!(
            report
                .strengths_weaknesses
                .strengths
                .contains(&"Showing positive improvement trend".to_string())
        );
    }

    #[test]
    fn test_decline_is_flagged() {
        let attempts: Vec<SubmittedAttemptRow> = [40, 40, 40, 70, 70, 70]
            .iter()
            .enumerate()
            .map(|(i, &m)| attempt(i as i64, m, 100, 60))
            .collect();

        let report = summarize(&attempts, &[]);
        assert_eq!(report.overall_stats.improvement_trend, -30);
        assert!(
            report
                .strengths_weaknesses
                .weaknesses
                .contains(&"Recent performance decline".to_string())
        );
    }

    #[test]
    fn test_section_and_type_breakdown() {
        let facts = vec![
            fact(Section::Physics, QuestionType::SingleChoice, true, 60),
            fact(Section::Physics, QuestionType::SingleChoice, true, 40),
            fact(Section::Chemistry, QuestionType::Numeric, false, 90),
            fact(Section::Chemistry, QuestionType::Numeric, true, 30),
        ];
        let report = summarize(&[attempt(1, 40, 40, 220)], &facts);

        let physics = &report.section_wise_performance[0];
        assert_eq!(physics.total_questions, 2);
        assert_eq!(physics.average_score, 100);
        assert_eq!(physics.average_time, 50);

        let chemistry = &report.section_wise_performance[1];
        assert_eq!(chemistry.average_score, 50);

        let maths = &report.section_wise_performance[2];
        assert_eq!(maths.total_questions, 0);
        assert_eq!(maths.average_score, 0);

        let numeric = report
            .time_analysis
            .iter()
            .find(|t| t.question_type == "NUMERIC")
            .unwrap();
        assert_eq!(numeric.average_time, 60);
        assert_eq!(numeric.accuracy, 50);

        let sw = &report.strengths_weaknesses;
        assert!(sw.strengths.contains(&"Strong performance in Physics".to_string()));
        assert!(sw.weaknesses.contains(&"Needs improvement in Chemistry".to_string()));
        assert!(!sw.weaknesses.contains(&"Needs improvement in Mathematics".to_string()));
    }

    #[test]
    fn test_unanswered_questions_are_not_counted() {
        let skipped = |section| AnswerFactRow {
            section,
            question_type: QuestionType::SingleChoice,
            is_correct: None,
            time_spent_seconds: 0,
        };
        let facts = vec![
            fact(Section::Physics, QuestionType::SingleChoice, true, 30),
            skipped(Section::Chemistry),
            skipped(Section::Mathematics),
        ];
        let report = summarize(&[attempt(1, 4, 12, 30)], &facts);

        let physics = &report.section_wise_performance[0];
        assert_eq!(physics.total_questions, 1);
        assert_eq!(physics.correct_answers, 1);

        let maths = &report.section_wise_performance[2];
        assert_eq!(maths.total_questions, 0);
        assert_eq!(maths.correct_answers, 0);

        let single = report
            .time_analysis
            .iter()
            .find(|t| t.question_type == "MCQ SINGLE")
            .unwrap();
        assert_eq!(single.accuracy, 100);
        assert_eq!(single.average_time, 30);

        let sw = &report.strengths_weaknesses;
        assert_eq!(sw.strengths[0], "Strong performance in Physics");
        assert!(!sw.weaknesses.iter().any(|w| w.starts_with("Needs improvement")));
    }

    #[test]
    fn test_slow_pace_is_flagged() {
        // 10 questions in 1500 seconds
        let report = summarize(&[attempt(1, 20, 40, 1500)], &[]);
        assert!(
            report
                .strengths_weaknesses
                .weaknesses
                .contains(&"Taking too much time per question".to_string())
        );
    }

    #[test]
    fn test_fallback_messages() {
        let facts = vec![
            fact(Section::Physics, QuestionType::SingleChoice, true, 10),
            fact(Section::Chemistry, QuestionType::SingleChoice, false, 10),
            fact(Section::Chemistry, QuestionType::SingleChoice, true, 10),
            fact(Section::Chemistry, QuestionType::SingleChoice, true, 10),
            fact(Section::Mathematics, QuestionType::SingleChoice, false, 10),
            fact(Section::Mathematics, QuestionType::SingleChoice, true, 10),
            fact(Section::Mathematics, QuestionType::SingleChoice, true, 10),
        ];
        // average 70%, every section between 60 and 80 except physics
        let report = summarize(&[attempt(1, 28, 40, 100)], &facts);
        let sw = &report.strengths_weaknesses;
        assert_eq!(sw.strengths, vec!["Strong performance in Physics".to_string()]);
        assert_eq!(sw.weaknesses, vec!["No major weaknesses identified".to_string()]);
        assert_eq!(sw.recommendations, vec!["Continue regular practice".to_string()]);
    }
}
