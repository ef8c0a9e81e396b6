//! Injected diagnostic sink, replacing the "global logger / progress bar"
//! the original package wires through a per-module `Logger` instance.

use core::fmt;

/// A diagnostic event emitted by a non-error code path.
///
/// These are not failures: spec.md §7 is explicit that range-exceeding
/// inputs are reduced rather than rejected, and the reduction is merely
/// reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A plaintext (or a scalar multiplier) exceeded the scheme's
    /// `plaintext_modulo` and was reduced before use.
    PlaintextReduced {
        /// Scheme or component name emitting the event.
        source: &'static str,
        /// The value before reduction, rendered for diagnostics.
        original: String,
        /// The value after reduction, rendered for diagnostics.
        reduced: String,
        /// The modulus the value was reduced against, rendered for
        /// diagnostics.
        modulo: String,
    },
    /// A re-encryption produced the same ciphertext as its input. Not an
    /// error, but worth surfacing since it defeats the point of
    /// re-randomisation (e.g. a misconfigured RNG).
    ReencryptionNoOp {
        /// Scheme name emitting the event.
        source: &'static str,
    },
    /// An element-wise tensor addition combined a positive and a negative
    /// operand. PHE has no general way to tell whether the modular sum
    /// wrapped, so the result's sign is reported as positive and trusted to
    /// the modular representation rather than computed.
    MixedSignTensorAdd {
        /// Index within the tensor this addition occurred at.
        index: usize,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::PlaintextReduced {
                source,
                original,
                reduced,
                modulo,
            } => write!(
                f,
                "[{source}] value {original} exceeds modulus {modulo}, reduced to {reduced}"
            ),
            Event::ReencryptionNoOp { source } => {
                write!(f, "[{source}] re-encryption returned an identical ciphertext")
            }
            Event::MixedSignTensorAdd { index } => write!(
                f,
                "tensor add: element {index} has mixed-sign operands; result sign trusted to modular wrap"
            ),
        }
    }
}

/// A sink for [`Event`]s. Implementations must not panic and should not
/// block; the core calls this synchronously on every encrypt/scalar-multiply
/// path that might reduce an out-of-range input.
pub trait Reporter: Send + Sync {
    /// Receive a diagnostic event.
    fn note(&self, event: Event);
}

/// The default reporter: drops every event. Matches spec.md's "no-op by
/// default" requirement for the injected reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn note(&self, _event: Event) {}
}

/// Forwards events to the `log` crate, one call site per variant, at the
/// same `debug`/`warn` severities `original_source`'s per-module `Logger`
/// used (`logger.debug(...)` on every reduction path it has).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn note(&self, event: Event) {
        match &event {
            Event::PlaintextReduced { .. } => log::debug!("{event}"),
            Event::ReencryptionNoOp { .. } => log::warn!("{event}"),
            Event::MixedSignTensorAdd { .. } => log::debug!("{event}"),
        }
    }
}
