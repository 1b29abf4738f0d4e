//! Solver-independent description of a linear / integer program.
//!
//! Programs are always maximised. Coefficient vectors are dense and indexed
//! like `LinearProgram::variables`.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VariableDomain {
    Continuous { lower: f64, upper: f64 },
    Binary,
}

impl VariableDomain {
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        match *self {
            VariableDomain::Continuous { lower, upper } => {
                value >= lower - tolerance && value <= upper + tolerance
            }
            VariableDomain::Binary => value.abs() <= tolerance || (value - 1.0).abs() <= tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionVariable {
    pub name: String,
    pub domain: VariableDomain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintSense {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl fmt::Display for ConstraintSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSense::LessOrEqual => write!(f, "<="),
            ConstraintSense::GreaterOrEqual => write!(f, ">="),
            ConstraintSense::Equal => write!(f, "=="),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub name: String,
    pub coefficients: Vec<f64>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients.iter().zip(values).map(|(a, x)| a * x).sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            ConstraintSense::LessOrEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::GreaterOrEqual => lhs >= self.rhs - tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearProgram {
    pub name: String,
    pub variables: Vec<DecisionVariable>,
    /// Objective coefficients, maximised.
    pub objective: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            objective: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Add a variable with its objective coefficient; returns its index.
    pub fn add_variable(&mut self, name: impl Into<String>, domain: VariableDomain, objective: f64) -> usize {
        self.variables.push(DecisionVariable {
            name: name.into(),
            domain,
        });
        self.objective.push(objective);
        self.variables.len() - 1
    }

    /// Add `Σ coefficients · x  (sense)  rhs`. Coefficients must cover every
    /// variable added so far.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: Vec<f64>,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        debug_assert_eq!(coefficients.len(), self.variables.len());
        self.constraints.push(LinearConstraint {
            name: name.into(),
            coefficients,
            sense,
            rhs,
        });
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Names of the bounds and constraints that `values` breaks.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut broken: Vec<String> = self
            .variables
            .iter()
            .zip(values)
            .filter(|(v, x)| !v.domain.contains(**x, tolerance))
            .map(|(v, x)| format!("{} = {}", v.name, x))
            .collect();

        broken.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tolerance))
                .map(|c| format!("{}: {} {} {}", c.name, c.lhs(values), c.sense, c.rhs)),
        );
        broken
    }
}
