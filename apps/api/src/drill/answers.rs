//! Answer computation and answer-sheet pagination.

use serde::{Deserialize, Serialize};

use crate::drill::difficulty::Operator;
use crate::drill::question::{Question, QuestionSet};

/// One printed answer. `index` matches the question's printed number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub index: u32,
    pub answer: i64,
}

/// Result of a question. Division is exact by the generator's invariant.
pub fn compute_answer(question: &Question) -> i64 {
    let (a, b) = (question.operand_a, question.operand_b);
    match question.operator {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => a / b,
    }
}

/// Answers for a whole set, in generation order.
pub fn answer_list(questions: &QuestionSet) -> Vec<AnswerEntry> {
    questions
        .iter()
        .map(|q| AnswerEntry {
            index: q.index,
            answer: compute_answer(q),
        })
        .collect()
}

/// Formats an answer with comma thousands separators (`998001` → `998,001`).
pub fn format_answer(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

/// True when the current answer page is full and answers are still waiting.
pub fn should_break_page(
    printed_on_page: u32,
    rows_per_page: u32,
    columns_per_page: u32,
    remaining: usize,
) -> bool {
    remaining > 0 && printed_on_page >= rows_per_page * columns_per_page
}

/// Tracks how many answers sit on the current page.
#[derive(Debug, Clone)]
pub struct AnswerPaginator {
    rows_per_page: u32,
    columns_per_page: u32,
    printed_on_page: u32,
    pages: u32,
}

impl AnswerPaginator {
    pub fn new(rows_per_page: u32, columns_per_page: u32) -> Self {
        AnswerPaginator {
            rows_per_page,
            columns_per_page,
            printed_on_page: 0,
            pages: 1,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.rows_per_page * self.columns_per_page
    }

    /// Slot of the next answer on the current page, as `(row, column)`.
    pub fn next_slot(&self) -> (u32, u32) {
        (
            self.printed_on_page / self.columns_per_page,
            self.printed_on_page % self.columns_per_page,
        )
    }

    /// Records one printed answer. Returns true if a new page must start before
    /// the next of the `remaining` answers; the per-page count resets on a break.
    pub fn record(&mut self, remaining: usize) -> bool {
        self.printed_on_page += 1;
        if should_break_page(
            self.printed_on_page,
            self.rows_per_page,
            self.columns_per_page,
            remaining,
        ) {
            self.printed_on_page = 0;
            self.pages += 1;
            true
        } else {
            false
        }
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }
}

/// Number of answer pages needed for `total` answers at `capacity` per page.
pub fn answer_page_count(total: usize, capacity: u32) -> u32 {
    if total == 0 || capacity == 0 {
        return 1;
    }
    total.div_ceil(capacity as usize) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(operator: Operator, a: i64, b: i64) -> Question {
        Question {
            index: 1,
            operand_a: a,
            operand_b: b,
            operator,
        }
    }

    #[test]
    fn test_compute_answer_per_operator() {
        assert_eq!(compute_answer(&question(Operator::Add, 123, 456)), 579);
        assert_eq!(compute_answer(&question(Operator::Subtract, 456, 123)), 333);
        assert_eq!(compute_answer(&question(Operator::Multiply, 12, 12)), 144);
        assert_eq!(compute_answer(&question(Operator::Divide, 144, 12)), 12);
    }

    #[test]
    fn test_format_answer_groups_thousands() {
        assert_eq!(format_answer(7), "7");
        assert_eq!(format_answer(999), "999");
        assert_eq!(format_answer(1_000), "1,000");
        assert_eq!(format_answer(998_001), "998,001");
        assert_eq!(format_answer(-12_345), "-12,345");
    }

    #[test]
    fn test_should_break_only_when_full_and_more_remain() {
        assert!(!should_break_page(47, 12, 4, 10));
        assert!(should_break_page(48, 12, 4, 10));
        assert!(!should_break_page(48, 12, 4, 0));
    }

    #[test]
    fn test_hundred_answers_at_48_per_page() {
        let total = 100_usize;
        let mut paginator = AnswerPaginator::new(12, 4);
        let mut breaks_after = Vec::new();
        for printed in 1..=total {
            if paginator.record(total - printed) {
                breaks_after.push(printed);
            }
        }
        assert_eq!(breaks_after, vec![48, 96]);
        assert_eq!(paginator.pages(), 3);
        assert_eq!(answer_page_count(total, paginator.capacity()), 3);
    }

    #[test]
    fn test_exactly_full_page_does_not_break() {
        let mut paginator = AnswerPaginator::new(12, 4);
        let breaks = (1..=48_usize).filter(|&n| paginator.record(48 - n)).count();
        assert_eq!(breaks, 0);
        assert_eq!(paginator.pages(), 1);
    }

    #[test]
    fn test_next_slot_walks_row_major_and_resets() {
        let mut paginator = AnswerPaginator::new(2, 3);
        let mut slots = Vec::new();
        for remaining in (0..7).rev() {
            slots.push(paginator.next_slot());
            paginator.record(remaining);
        }
        assert_eq!(
            slots,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (0, 0)]
        );
    }
}
