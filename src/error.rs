//! Error types surfaced by the parser, the validator and the iterator surface.

use thiserror::Error;

/// Everything that can go wrong while parsing, validating or iterating a rule.
///
/// The parser validates eagerly at construction time (see [`crate::parser`]);
/// drivers never mutate rule state, so once an [`crate::RRule`] exists the only
/// error a driver can still raise is [`RRuleError::HorizonExceeded`] (and only
/// when `yearly_skip_upper_limit` is disabled) or [`RRuleError::LogicError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RRuleError {
    /// A rule part is legal syntax but violates a cross-field invariant, is
    /// out of range, or combines FREQ with a BY-part that FREQ does not allow.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// The rule string or mapping contained a key that is not one of the
    /// recognised RRULE parts.
    #[error("unrecognised rule part `{0}`")]
    UnknownPart(String),

    /// A token could not be parsed into the type its key expects (e.g.
    /// `BYDAY=XX` or `INTERVAL=abc`).
    #[error("failed to parse `{key}`: {reason}")]
    ParseError { key: String, reason: String },

    /// Raised only when `yearly_skip_upper_limit` is `false` and a yearly
    /// scan would cross the horizon (9999-12-31T23:59:59Z). When the flag is
    /// left at its default of `true`, the cursor silently becomes exhausted
    /// instead.
    #[error("recurrence exceeds the representable horizon (9999-12-31T23:59:59Z)")]
    HorizonExceeded,

    /// Raised by [`crate::RRule::fast_forward_to_end`] when called on a rule
    /// that is neither COUNT- nor UNTIL-bounded.
    #[error("{0}")]
    LogicError(String),
}
