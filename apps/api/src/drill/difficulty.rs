//! Operators, difficulty levels and drill styles with their printed labels.
//!
//! Labels are bilingual (English / Malay) because every worksheet prints both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Operator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Symbol printed between operands.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    pub fn name_eng(&self) -> &'static str {
        match self {
            Operator::Add => "addition",
            Operator::Subtract => "subtraction",
            Operator::Multiply => "multiplication",
            Operator::Divide => "division",
        }
    }

    pub fn name_malay(&self) -> &'static str {
        match self {
            Operator::Add => "tambah",
            Operator::Subtract => "tolak",
            Operator::Multiply => "darab",
            Operator::Divide => "bahagi",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_eng())
    }
}

impl FromStr for Operator {
    type Err = String;

    /// Accepts English names, short names and symbols.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A bare `+` in a query string arrives as a space once form-decoded.
        if s == " " {
            return Ok(Operator::Add);
        }
        match s.trim().to_lowercase().as_str() {
            "addition" | "add" | "+" | "plus" => Ok(Operator::Add),
            "subtraction" | "subtract" | "-" | "minus" => Ok(Operator::Subtract),
            "multiplication" | "multiply" | "*" | "x" | "×" | "times" => Ok(Operator::Multiply),
            "division" | "divide" | "/" | "÷" => Ok(Operator::Divide),
            other => Err(format!(
                "unknown operation '{other}'; expected add, subtract, multiply or divide"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Difficulty
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Default `(digits_a, digits_b)` for this level.
    pub fn digits(&self) -> (u8, u8) {
        match self {
            Difficulty::Easy => (2, 1),
            Difficulty::Medium => (3, 1),
            Difficulty::Hard => (3, 2),
        }
    }

    pub fn label_eng(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn label_malay(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Mudah",
            Difficulty::Medium => "Sederhana",
            Difficulty::Hard => "Sukar",
        }
    }

    /// Directory name used to look up cartoon images for this level.
    pub fn slug(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "mudah" => Ok(Difficulty::Easy),
            "medium" | "sederhana" => Ok(Difficulty::Medium),
            "hard" | "sukar" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drill style
// ────────────────────────────────────────────────────────────────────────────

/// How each question is drawn on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrillStyle {
    /// Operands stacked above a line, result written below.
    ColumnMethod,
    /// Divisor outside a bracket, dividend under it.
    LongDivision,
}

impl DrillStyle {
    /// Default `(rows, columns)` of the question grid.
    pub fn default_grid(&self) -> (u32, u32) {
        match self {
            DrillStyle::ColumnMethod => (5, 5),
            DrillStyle::LongDivision => (4, 4),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DrillStyle::ColumnMethod => "Column Method",
            DrillStyle::LongDivision => "Long Division Method",
        }
    }
}
