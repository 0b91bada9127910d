//! Question Generator: constrained random operand pairs, recorded in order.
//!
//! Every question a worksheet prints comes from `QuestionGenerator::next_question`,
//! which is the only place questions are created. The resulting `QuestionSet` is
//! read back by the answer pass, so the printed index doubles as the lookup key.
//!
//! # Sampling
//! Both operands are drawn uniformly from their digit range. If the pair violates
//! the active `Constraint`, both are redrawn. Sampling gives up with
//! `GenerationExhausted` after `max_attempts` tries so unreachable configurations
//! (e.g. a 1-digit dividend with a 2-digit divisor) fail instead of spinning.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::drill::difficulty::{DrillStyle, Operator};
use crate::errors::DrillError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

// ────────────────────────────────────────────────────────────────────────────
// Random source
// ────────────────────────────────────────────────────────────────────────────

/// Uniform inclusive integer source. Injected so tests can be deterministic.
pub trait NumberSource {
    /// Returns an integer in `[min, max]`, both bounds inclusive.
    fn next_in_range(&mut self, min: i64, max: i64) -> i64;
}

/// Adapts any `rand` generator to `NumberSource`.
pub struct RngSource<R>(pub R);

impl<R: Rng> NumberSource for RngSource<R> {
    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        self.0.gen_range(min..=max)
    }
}

/// Inclusive value range for an operand with `digits` decimal digits.
pub fn digit_range(digits: u8) -> Result<(i64, i64), DrillError> {
    match digits {
        1 => Ok((1, 9)),
        2 => Ok((10, 99)),
        3 => Ok((100, 999)),
        other => Err(DrillError::InvalidDigitCount(other)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Constraints
// ────────────────────────────────────────────────────────────────────────────

/// Validity predicate a sampled pair must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    Unconstrained,
    /// `a > b`, so subtraction never goes negative.
    StrictlyGreater,
    /// `b >= 2` and `a % b == 0`, so the quotient is a non-trivial integer.
    ExactDivision,
}

impl Constraint {
    /// Constraint for a drill style and operator.
    ///
    /// The column method orders every pair, multiplication and addition included;
    /// worksheets printed so far have always had the larger operand on top.
    pub fn for_drill(style: DrillStyle, operator: Operator) -> Self {
        match (style, operator) {
            (_, Operator::Divide) => Constraint::ExactDivision,
            (_, Operator::Subtract) => Constraint::StrictlyGreater,
            (DrillStyle::ColumnMethod, _) => Constraint::StrictlyGreater,
            (DrillStyle::LongDivision, _) => Constraint::Unconstrained,
        }
    }

    pub fn accepts(&self, a: i64, b: i64) -> bool {
        match self {
            Constraint::Unconstrained => true,
            Constraint::StrictlyGreater => a > b,
            Constraint::ExactDivision => b >= 2 && a % b == 0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position in the document, in reading order across pages.
    pub index: u32,
    pub operand_a: i64,
    pub operand_b: i64,
    pub operator: Operator,
}

/// Ordered, append-only record of a document's questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Looks up a question by its printed (1-based) index.
    pub fn get(&self, index: u32) -> Option<&Question> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        self.questions.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    fn append(&mut self, operand_a: i64, operand_b: i64, operator: Operator) -> Question {
        let question = Question {
            index: self.questions.len() as u32 + 1,
            operand_a,
            operand_b,
            operator,
        };
        self.questions.push(question);
        question
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

/// An accepted operand pair and how many draws it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledPair {
    pub operand_a: i64,
    pub operand_b: i64,
    pub attempts: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// Produces questions for one document and owns its `QuestionSet`.
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    style: DrillStyle,
    max_attempts: u32,
    questions: QuestionSet,
    total_attempts: u64,
}

impl QuestionGenerator {
    pub fn new(style: DrillStyle, max_attempts: u32) -> Self {
        QuestionGenerator {
            style,
            max_attempts: max_attempts.max(1),
            questions: QuestionSet::default(),
            total_attempts: 0,
        }
    }

    /// Generates the next question and appends it with the next index.
    pub fn next_question(
        &mut self,
        source: &mut dyn NumberSource,
        operator: Operator,
        digits_a: u8,
        digits_b: u8,
    ) -> Result<Question, DrillError> {
        let constraint = Constraint::for_drill(self.style, operator);
        let SampledPair {
            operand_a,
            operand_b,
            attempts,
        } = sample_operands(
            source,
            constraint,
            operator,
            digits_a,
            digits_b,
            self.max_attempts,
        )?;
        self.total_attempts += u64::from(attempts);
        Ok(self.questions.append(operand_a, operand_b, operator))
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn into_questions(self) -> QuestionSet {
        self.questions
    }

    /// Mean draws per accepted question so far.
    pub fn mean_attempts(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.total_attempts as f64 / self.questions.len() as f64
    }
}

/// Draws operand pairs until one satisfies `constraint`, up to `max_attempts` draws.
pub fn sample_operands(
    source: &mut dyn NumberSource,
    constraint: Constraint,
    operator: Operator,
    digits_a: u8,
    digits_b: u8,
    max_attempts: u32,
) -> Result<SampledPair, DrillError> {
    let (min_a, max_a) = digit_range(digits_a)?;
    let (min_b, max_b) = digit_range(digits_b)?;

    for attempt in 1..=max_attempts {
        let a = source.next_in_range(min_a, max_a);
        let b = source.next_in_range(min_b, max_b);
        if constraint.accepts(a, b) {
            return Ok(SampledPair {
                operand_a: a,
                operand_b: b,
                attempts: attempt,
            });
        }
    }

    Err(DrillError::GenerationExhausted {
        operator: operator.to_string(),
        digits_a,
        digits_b,
        attempts: max_attempts,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
