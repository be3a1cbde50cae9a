// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reporting port for violations and configuration errors.

use serde::Serialize;
use tagreq_model::SymbolModel;

use crate::requirement::ConfigurationError;
use crate::validator::Violation;

/// Receives validation findings in traversal order.
///
/// Implementations turn findings into host diagnostics; any call means the
/// round fails.
pub trait Reporter {
    /// Called once per violation.
    fn on_violation(&mut self, violation: &Violation, model: &dyn SymbolModel);
    /// Called once per misconfigured trigger.
    fn on_configuration_error(&mut self, error: &ConfigurationError);
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the build.
    Error,
}

/// A rendered finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the finding.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// The offending symbol, when the finding has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// The enclosing flagged method, when the finding has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Renders the message for a violation.
pub fn violation_message(violation: &Violation, model: &dyn SymbolModel) -> String {
    format!(
        "{} at {} should have one of these annotations: [{}]",
        model.describe(violation.symbol),
        model.describe(violation.enclosing_method),
        violation.required.join(", ")
    )
}

/// Reporter that keeps everything it is told.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    /// Violations, in report order.
    pub violations: Vec<Violation>,
    /// Configuration errors, in report order.
    pub configuration_errors: Vec<ConfigurationError>,
    /// Rendered diagnostics for both, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Reporter for CollectingReporter {
    fn on_violation(&mut self, violation: &Violation, model: &dyn SymbolModel) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: violation_message(violation, model),
            symbol: Some(model.describe(violation.symbol)),
            method: Some(model.describe(violation.enclosing_method)),
        });
        self.violations.push(violation.clone());
    }

    fn on_configuration_error(&mut self, error: &ConfigurationError) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: error.to_string(),
            symbol: None,
            method: None,
        });
        self.configuration_errors.push(error.clone());
    }
}
