//! Aggregate traits for the event-sourced catalog and order models.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far.
    fn version(&self) -> u64;
}

/// Decide/evolve split used by products and sales orders.
///
/// - `handle(&self, cmd)` validates a command against current state and returns
///   the events it produces. It must not mutate state.
/// - `apply(&mut self, event)` folds one event into state and bumps the version.
///
/// Neither side performs IO. Anything that needs a lookup (option values, pricing
/// rules) is resolved before the command is built.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Handle a command and fold the resulting events in one step.
    ///
    /// Nothing is applied when `handle` fails.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
