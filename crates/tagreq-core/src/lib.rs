// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! tagreq core: the annotation-contract validator.
//!
//! A method (or every method of a class) flagged by a trigger tag requires
//! that every field transitively reachable from its parameters and return
//! type carries one of the required tags. [`Processor`] runs one round over a
//! [`tagreq_model::SymbolModel`]; [`Validator`] is the traversal itself.

pub mod generics;
pub mod options;
pub mod processor;
pub mod report;
pub mod requirement;
pub mod validator;

pub use options::{OptionsError, ProcessorOptions};
pub use processor::{
    FlaggedRoot, Processor, RoundOutcome, RoundReport, BUILTIN_TRIGGER, IGNORE_ELEMENT,
    REQUIRES_ELEMENT,
};
pub use report::{CollectingReporter, Diagnostic, Reporter, Severity};
pub use requirement::{is_trusted_type, ConfigurationError, RequirementSpec, TRUSTED_PACKAGES};
pub use validator::{TraversalState, Validator, Violation};
