//! Calculus problems and the bank they are drawn from.
//!
//! The bank is a small immutable pool. Selection goes through an injected
//! PCG generator so tests can pin the sequence with a seed.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

/// A single gate question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculusProblem {
    pub question: String,
    pub answer: String,
    pub hint: String,
    /// Maximum absolute deviation accepted for numeric answers.
    pub tolerance: f64,
}

impl CalculusProblem {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        hint: impl Into<String>,
        tolerance: f64,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            hint: hint.into(),
            tolerance,
        }
    }

    /// Check a submitted answer.
    ///
    /// When both sides parse as real numbers they are compared within
    /// `tolerance`. Anything else (including symbolic answers such as
    /// `6x`) falls back to case-insensitive string equality.
    pub fn check_answer(&self, answer: &str) -> bool {
        match (answer.parse::<f64>(), self.answer.parse::<f64>()) {
            (Ok(given), Ok(correct)) => (given - correct).abs() <= self.tolerance,
            _ => answer.to_lowercase() == self.answer.to_lowercase(),
        }
    }
}

/// The built-in problem pool.
pub fn standard_problems() -> Vec<CalculusProblem> {
    vec![
        CalculusProblem::new(
            "Find the derivative of f(x) = 3x²",
            "6x",
            "Use the power rule: d/dx(xⁿ) = n·xⁿ⁻¹",
            0.0,
        ),
        CalculusProblem::new(
            "What is the derivative of sin(x)?",
            "cos(x)",
            "This is a basic trigonometric derivative",
            0.0,
        ),
        CalculusProblem::new(
            "Find ∫ 2x dx",
            "x²",
            "Use the power rule for integration: ∫xⁿ dx = xⁿ⁺¹/(n+1) + C",
            0.0,
        ),
        CalculusProblem::new(
            "What is the derivative of e^x?",
            "e^x",
            "The exponential function is its own derivative",
            0.0,
        ),
        CalculusProblem::new(
            "Find the derivative of ln(x)",
            "1/x",
            "This is the derivative of the natural logarithm",
            0.0,
        ),
        CalculusProblem::new(
            "What is ∫ 1/x dx?",
            "ln(x)",
            "This is the antiderivative of 1/x",
            0.0,
        ),
    ]
}

/// Immutable pool of problems with a seedable selector.
#[derive(Debug, Clone)]
pub struct ProblemBank {
    problems: Vec<CalculusProblem>,
    rng: Mcg128Xsl64,
}

impl ProblemBank {
    /// Create a bank over `problems`.
    ///
    /// # Panics
    ///
    /// Panics if `problems` is empty. An empty pool is a programming error:
    /// the unblock gate would have nothing to ask.
    pub fn new(problems: Vec<CalculusProblem>, seed: Option<u64>) -> Self {
        assert!(!problems.is_empty(), "problem bank must not be empty");
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { problems, rng }
    }

    /// The built-in pool, seeded from entropy.
    pub fn standard() -> Self {
        Self::new(standard_problems(), None)
    }

    /// The built-in pool with a fixed seed.
    pub fn standard_seeded(seed: u64) -> Self {
        Self::new(standard_problems(), Some(seed))
    }

    /// Pick a problem uniformly at random.
    pub fn random_problem(&mut self) -> &CalculusProblem {
        let index = self.rng.gen_range(0..self.problems.len());
        &self.problems[index]
    }

    pub fn problems(&self) -> &[CalculusProblem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
