// src/scoring/order.rs

use std::collections::{HashMap, HashSet};

use rand::{Rng, seq::SliceRandom};

use crate::models::question::{Question, Section};

/// Builds the question order snapshot for a new attempt.
///
/// Sections stay in their fixed order; questions are shuffled only
/// within their own section.
pub fn shuffle_within_sections<R: Rng + ?Sized>(questions: &[Question], rng: &mut R) -> Vec<i64> {
    let mut order = Vec::with_capacity(questions.len());

    for section in Section::ALL {
        let mut ids: Vec<i64> = canonical(questions.iter().filter(|q| q.section == section))
            .into_iter()
            .map(|q| q.id)
            .collect();
        ids.shuffle(rng);
        order.extend(ids);
    }

    order
}

/// Lays questions out in snapshot order.
///
/// Snapshot IDs whose question has since been deleted are skipped.
/// Questions added after the snapshot go last, in section order.
pub fn arrange(questions: Vec<Question>, snapshot: &[i64]) -> Vec<Question> {
    let mut by_id: HashMap<i64, Question> = questions.into_iter().map(|q| (q.id, q)).collect();
    let mut seen = HashSet::new();

    let mut ordered: Vec<Question> = snapshot
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| by_id.remove(id))
        .collect();

    let leftovers: Vec<Question> = by_id.into_values().collect();
    ordered.extend(canonical(leftovers.iter()).into_iter().cloned());
    ordered
}

fn canonical<'a>(questions: impl Iterator<Item = &'a Question>) -> Vec<&'a Question> {
    let mut sorted: Vec<&Question> = questions.collect();
    sorted.sort_by_key(|q| (q.section, q.order_index, q.id));
    sorted
}
