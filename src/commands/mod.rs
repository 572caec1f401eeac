// ABOUTME: Command module aggregator for the slipway CLI.
// ABOUTME: Re-exports the validate, plan and run command handlers.

mod inspect;
mod run;

pub use inspect::{plan, validate};
pub use run::run;
