// Analysis sessions: one per browser tab.
// controller holds the state machine, view turns it into display JSON,
// registry keeps sessions alive between requests.

pub mod controller;
pub mod handlers;
pub mod notice;
pub mod registry;
pub mod view;
