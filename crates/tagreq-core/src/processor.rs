// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Round processing: discover flagged roots, build their requirement specs,
//! validate, and report.
//!
//! Roots come from two sources. The built-in trigger carries its own
//! `requires`/`ignore` arguments; option triggers take their required tags
//! from [`ProcessorOptions`]. The global ignore list applies to both.
//!
//! Every spec is built before any traversal starts. A single empty `requires`
//! list fails the whole round and nothing is validated.

use serde::Serialize;
use tagreq_model::{SymbolId, SymbolModel};
use tracing::{debug, info, instrument, warn};

use crate::options::ProcessorOptions;
use crate::report::{CollectingReporter, Diagnostic, Reporter};
use crate::requirement::{ConfigurationError, RequirementSpec};
use crate::validator::{Validator, Violation};

/// Built-in trigger tag.
pub const BUILTIN_TRIGGER: &str = "tagreq.annotation.RequiresAnnotation";
/// Built-in trigger argument listing required tags.
pub const REQUIRES_ELEMENT: &str = "requires";
/// Built-in trigger argument listing ignored type/member names.
pub const IGNORE_ELEMENT: &str = "ignore";

/// Result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundOutcome {
    /// No violations and no configuration errors.
    Passed,
    /// At least one violation or configuration error was reported.
    Failed,
}

impl RoundOutcome {
    /// True for [`RoundOutcome::Passed`].
    pub fn passed(self) -> bool {
        self == Self::Passed
    }
}

/// Value-level summary of a round.
#[derive(Debug)]
pub struct RoundReport {
    /// Overall outcome.
    pub outcome: RoundOutcome,
    /// Violations in traversal order.
    pub violations: Vec<Violation>,
    /// Configuration errors (non-empty means nothing was validated).
    pub configuration_errors: Vec<ConfigurationError>,
    /// Rendered diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// A discovered root paired with the spec it is validated against.
#[derive(Debug, Clone)]
pub struct FlaggedRoot {
    /// Flagged class or method.
    pub symbol: SymbolId,
    /// Requirement for this root.
    pub spec: RequirementSpec,
}

/// Drives one validation round over a symbol model.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    options: ProcessorOptions,
}

impl Processor {
    /// Creates a processor with the given options.
    pub fn new(options: ProcessorOptions) -> Self {
        Self { options }
    }

    /// Trigger tags this processor reacts to, sorted and deduplicated.
    pub fn supported_triggers(&self) -> Vec<String> {
        let mut triggers: Vec<String> = std::iter::once(BUILTIN_TRIGGER)
            .chain(self.options.triggers())
            .map(str::to_owned)
            .collect();
        triggers.sort();
        triggers.dedup();
        triggers
    }

    /// Discovers roots and builds their specs.
    ///
    /// Returns every configuration error instead when any spec is invalid.
    pub fn plan(&self, model: &dyn SymbolModel) -> Result<Vec<FlaggedRoot>, Vec<ConfigurationError>> {
        let mut roots = Vec::new();
        let mut errors = Vec::new();
        let global_ignore = &self.options.ignore;

        for symbol in model.annotated_with(BUILTIN_TRIGGER) {
            let required = model
                .annotation_values(symbol, BUILTIN_TRIGGER, REQUIRES_ELEMENT)
                .unwrap_or_default();
            let ignored = model
                .annotation_values(symbol, BUILTIN_TRIGGER, IGNORE_ELEMENT)
                .unwrap_or_default();
            match RequirementSpec::new(BUILTIN_TRIGGER, required, ignored) {
                Ok(spec) => roots.push(FlaggedRoot {
                    symbol,
                    spec: spec.with_ignored(global_ignore.iter().cloned()),
                }),
                Err(err) => errors.push(err),
            }
        }

        for (trigger, required) in &self.options.requires {
            let spec = match RequirementSpec::new(
                trigger.as_str(),
                required.iter().cloned(),
                global_ignore.iter().cloned(),
            ) {
                Ok(spec) => spec,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            for symbol in model.annotated_with(trigger) {
                roots.push(FlaggedRoot {
                    symbol,
                    spec: spec.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(roots)
        } else {
            Err(errors)
        }
    }

    /// Runs one round, forwarding findings to `reporter`.
    #[instrument(level = "info", skip_all)]
    pub fn process_round(
        &self,
        model: &dyn SymbolModel,
        reporter: &mut dyn Reporter,
    ) -> RoundOutcome {
        let roots = match self.plan(model) {
            Ok(roots) => roots,
            Err(errors) => {
                for err in &errors {
                    warn!(trigger = err.trigger(), "invalid requirement; round aborted");
                    reporter.on_configuration_error(err);
                }
                return RoundOutcome::Failed;
            }
        };

        debug!(roots = roots.len(), "roots discovered");
        let validator = Validator::new(model);
        let mut failed = false;
        for root in &roots {
            for violation in validator.validate_root(root.symbol, &root.spec) {
                failed = true;
                reporter.on_violation(&violation, model);
            }
        }

        let outcome = if failed {
            RoundOutcome::Failed
        } else {
            RoundOutcome::Passed
        };
        info!(?outcome, roots = roots.len(), "round complete");
        outcome
    }

    /// Runs one round and collects everything into a [`RoundReport`].
    pub fn run(&self, model: &dyn SymbolModel) -> RoundReport {
        let mut reporter = CollectingReporter::default();
        let outcome = self.process_round(model, &mut reporter);
        RoundReport {
            outcome,
            violations: reporter.violations,
            configuration_errors: reporter.configuration_errors,
            diagnostics: reporter.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::{json, Value};
    use tagreq_model::SymbolGraph;

    fn graph(types: Value) -> SymbolGraph {
        SymbolGraph::from_json_str(&json!({ "types": types }).to_string()).unwrap()
    }

    fn requires(tags: &[&str]) -> Value {
        json!([{ "name": BUILTIN_TRIGGER, "values": { "requires": tags } }])
    }

    fn order_types(method_annotations: Value) -> Value {
        json!([
            {
                "name": "shop.Service",
                "methods": [{
                    "name": "process",
                    "annotations": method_annotations,
                    "parameters": [{ "name": "o", "type": "shop.Order" }]
                }]
            },
            {
                "name": "shop.Order",
                "fields": [
                    { "name": "id", "type": "java.lang.String", "annotations": [{ "name": "shop.Validated" }] },
                    { "name": "items", "type": "java.util.List<shop.Item>", "annotations": [{ "name": "shop.Validated" }] }
                ]
            },
            { "name": "shop.Item", "fields": [{ "name": "sku", "type": "java.lang.String" }] }
        ])
    }

    #[test]
    fn builtin_trigger_reports_violations() {
        let g = graph(order_types(requires(&["shop.Validated"])));
        let report = Processor::default().run(&g);
        assert_eq!(report.outcome, RoundOutcome::Failed);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(
            report.diagnostics[0].message,
            "shop.Item.sku at shop.Service.process(shop.Order) should have one of these annotations: [shop.Validated]"
        );
        assert_eq!(report.diagnostics[0].symbol.as_deref(), Some("shop.Item.sku"));
    }

    #[test]
    fn clean_round_passes() {
        let g = graph(order_types(requires(&["shop.Validated"])));
        let options = ProcessorOptions::from_pairs([("ignore", "sku")]);
        let report = Processor::new(options).run(&g);
        assert!(report.outcome.passed());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn empty_requires_fails_round_without_validating() {
        let types = json!([
            {
                "name": "shop.Service",
                "methods": [
                    { "name": "bad", "annotations": requires(&[]) },
                    {
                        "name": "good",
                        "annotations": requires(&["shop.Validated"]),
                        "parameters": [{ "name": "o", "type": "shop.Order" }]
                    }
                ]
            },
            { "name": "shop.Order", "fields": [{ "name": "id", "type": "long" }] }
        ]);
        let g = graph(types);
        let report = Processor::default().run(&g);
        assert_eq!(report.outcome, RoundOutcome::Failed);
        assert!(report.violations.is_empty());
        assert_eq!(report.configuration_errors.len(), 1);
        assert_eq!(report.configuration_errors[0].trigger(), BUILTIN_TRIGGER);
        assert_eq!(
            report.diagnostics[0].message,
            format!("{BUILTIN_TRIGGER} requires at least one annotation as 'requires'")
        );
    }

    #[test]
    fn missing_requires_argument_is_a_configuration_error() {
        let g = graph(order_types(json!([{ "name": BUILTIN_TRIGGER }])));
        let report = Processor::default().run(&g);
        assert_eq!(report.outcome, RoundOutcome::Failed);
        assert_eq!(report.configuration_errors.len(), 1);
    }

    #[test]
    fn option_trigger_uses_configured_requirements() {
        let g = graph(order_types(json!([{ "name": "shop.Audited" }])));
        let options = ProcessorOptions::from_pairs([("requires_shop.Audited", "shop.Validated")]);
        let report = Processor::new(options).run(&g);
        assert_eq!(report.violations.len(), 1);
        assert!(report.diagnostics[0].message.starts_with("shop.Item.sku"));
    }

    #[test]
    fn empty_option_trigger_fails_round() {
        let g = graph(order_types(requires(&["shop.Validated"])));
        let options = ProcessorOptions::from_pairs([("requires_shop.Audited", "")]);
        let report = Processor::new(options).run(&g);
        assert_eq!(report.outcome, RoundOutcome::Failed);
        assert!(report.violations.is_empty());
        assert_eq!(report.configuration_errors[0].trigger(), "shop.Audited");
    }

    #[test]
    fn per_annotation_ignore_applies() {
        let annotations = json!([{
            "name": BUILTIN_TRIGGER,
            "values": { "requires": ["shop.Validated"], "ignore": ["shop.Item"] }
        }]);
        let g = graph(order_types(annotations));
        assert!(Processor::default().run(&g).outcome.passed());
    }

    #[test]
    fn class_flag_covers_every_method() {
        let types = json!([
            {
                "name": "shop.Service",
                "annotations": requires(&["shop.Validated"]),
                "methods": [
                    { "name": "a", "parameters": [{ "name": "o", "type": "shop.Order" }] },
                    { "name": "b", "parameters": [{ "name": "o", "type": "shop.Order" }] }
                ]
            },
            { "name": "shop.Order", "fields": [{ "name": "id", "type": "long" }] }
        ]);
        let g = graph(types);
        let report = Processor::default().run(&g);
        let methods: Vec<_> = report
            .diagnostics
            .iter()
            .filter_map(|d| d.method.as_deref())
            .collect();
        assert_eq!(
            methods,
            ["shop.Service.a(shop.Order)", "shop.Service.b(shop.Order)"]
        );
    }

    #[test]
    fn repeated_rounds_are_identical() {
        let g = graph(order_types(requires(&["shop.Validated"])));
        let processor = Processor::default();
        assert_eq!(processor.run(&g).diagnostics, processor.run(&g).diagnostics);
    }

    #[test]
    fn supported_triggers_include_options() {
        let options = ProcessorOptions::from_pairs([
            ("requires_shop.Audited", "shop.Validated"),
            ("requires_a.First", "shop.Validated"),
        ]);
        assert_eq!(
            Processor::new(options).supported_triggers(),
            ["a.First", "shop.Audited", BUILTIN_TRIGGER]
        );
    }
}
