//! models::formula — minimal `endog ~ terms` formulas.
//!
//! Purpose
//! -------
//! Describe which column a model explains and which columns enter its
//! design. Only additive main effects are supported: terms are column names
//! joined by `+`, with the intercept controlled by `1`, `0`, or a trailing
//! `- 1`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The endogenous name never appears among the exogenous terms.
//! - Exogenous terms are unique and kept in the order written.
//! - A formula always has at least one design column (a term or the
//!   intercept).
//!
//! Conventions
//! -----------
//! - The intercept column is named [`INTERCEPT`] and always comes first in
//!   [`Formula::design_names`].
use crate::models::errors::{ModelError, ModelResult};
use std::{fmt, str::FromStr};

/// Name of the constant design column.
pub const INTERCEPT: &str = "Intercept";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    endog: String,
    exog: Vec<String>,
    intercept: bool,
}

impl Formula {
    /// Build a formula from parts, applying the same checks as [`Formula::parse`].
    pub fn new(
        endog: impl Into<String>, exog: Vec<String>, intercept: bool,
    ) -> ModelResult<Self> {
        let endog = endog.into();
        let text = render(&endog, &exog, intercept);
        if endog.trim().is_empty() {
            return Err(ModelError::InvalidFormula {
                formula: text,
                reason: "left-hand side is empty",
            });
        }
        for (i, term) in exog.iter().enumerate() {
            if term.trim().is_empty() {
                return Err(ModelError::InvalidFormula { formula: text, reason: "empty term" });
            }
            if *term == endog {
                return Err(ModelError::InvalidFormula {
                    formula: text,
                    reason: "response appears on the right-hand side",
                });
            }
            if exog[..i].contains(term) {
                return Err(ModelError::InvalidFormula { formula: text, reason: "duplicate term" });
            }
        }
        if exog.is_empty() && !intercept {
            return Err(ModelError::InvalidFormula {
                formula: text,
                reason: "right-hand side has no columns",
            });
        }
        Ok(Self { endog, exog, intercept })
    }

    /// Parse `"y ~ a + b"`, `"y ~ 0 + a"`, `"y ~ a - 1"`, or `"y ~ 1"`.
    ///
    /// # Errors
    /// [`ModelError::InvalidFormula`] when there is not exactly one `~`,
    /// either side is empty, the only subtraction is not a trailing `- 1`,
    /// or a term is duplicated or repeats the response.
    pub fn parse(text: &str) -> ModelResult<Self> {
        let invalid = |reason| ModelError::InvalidFormula { formula: text.to_string(), reason };
        let mut sides = text.split('~');
        let (lhs, rhs) = match (sides.next(), sides.next(), sides.next()) {
            (Some(lhs), Some(rhs), None) => (lhs.trim(), rhs.trim()),
            _ => return Err(invalid("expected exactly one '~'")),
        };
        if lhs.is_empty() {
            return Err(invalid("left-hand side is empty"));
        }
        if lhs.contains('+') || lhs.contains('-') {
            return Err(invalid("left-hand side must be a single column"));
        }
        if rhs.is_empty() {
            return Err(invalid("right-hand side is empty"));
        }

        let mut intercept = true;
        let additive = match rhs.split_once('-') {
            Some((head, tail)) => {
                if tail.trim() != "1" {
                    return Err(invalid("only a trailing '- 1' may be subtracted"));
                }
                intercept = false;
                head.trim()
            }
            None => rhs,
        };

        let mut exog = Vec::new();
        if !additive.is_empty() {
            for term in additive.split('+').map(str::trim) {
                match term {
                    "" => return Err(invalid("empty term")),
                    "0" => intercept = false,
                    "1" => {}
                    name => exog.push(name.to_string()),
                }
            }
        } else if intercept {
            return Err(invalid("right-hand side is empty"));
        }

        Self::new(lhs, exog, intercept).map_err(|err| match err {
            ModelError::InvalidFormula { reason, .. } => invalid(reason),
            other => other,
        })
    }

    /// `endog ~ every other column`, with intercept.
    pub fn all_others(endog: &str, names: &[String]) -> ModelResult<Self> {
        let exog = names.iter().filter(|n| n.as_str() != endog).cloned().collect();
        Self::new(endog, exog, true)
    }

    pub fn endog(&self) -> &str {
        &self.endog
    }

    pub fn exog(&self) -> &[String] {
        &self.exog
    }

    pub fn has_intercept(&self) -> bool {
        self.intercept
    }

    /// Column names of the design matrix, intercept first when present.
    pub fn design_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.exog.len() + 1);
        if self.intercept {
            names.push(INTERCEPT.to_string());
        }
        names.extend(self.exog.iter().cloned());
        names
    }

    /// Number of design columns.
    pub fn width(&self) -> usize {
        self.exog.len() + usize::from(self.intercept)
    }
}

impl FromStr for Formula {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.endog, &self.exog, self.intercept))
    }
}

fn render(endog: &str, exog: &[String], intercept: bool) -> String {
    let rhs = match (exog.is_empty(), intercept) {
        (true, true) => "1".to_string(),
        (true, false) => "0".to_string(),
        (false, true) => exog.join(" + "),
        (false, false) => format!("0 + {}", exog.join(" + ")),
    };
    format!("{endog} ~ {rhs}")
}
