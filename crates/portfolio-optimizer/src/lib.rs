pub mod allocation;
pub mod config;
pub mod model;
pub mod portfolio;
pub mod report;
pub mod selection;
pub mod solver;

pub use allocation::ContinuousAllocation;
pub use config::{OptimizerConfig, Variant};
pub use model::{ConstraintSense, DecisionVariable, LinearConstraint, LinearProgram, VariableDomain};
pub use portfolio::{optimize, PortfolioModel};
pub use report::{Holding, OptimizationReport, PortfolioTotals};
pub use selection::BinarySelection;
pub use solver::{block_on_detached, GoodLpSolver, LpSolver, SolveOutcome, SolveStatus};
