/// Facts about the surrounding transaction that the execution layer consumes but never derives.
///
/// Signature checking and authority resolution happen upstream; by the time an action reaches a
/// handler, the only question left is whether the signers satisfied `(namespace, subject)`.
pub trait Context {
    /// Whether the action's signatures satisfy the authority registered for
    /// `(namespace, subject)`.
    fn is_authorized(&self, namespace: &str, subject: &str) -> bool;

    /// Ledger time in milliseconds of the block being applied.
    fn current_time(&self) -> u64;
}
