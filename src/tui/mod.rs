//! Interactive selector: Elm-style model/update, crossterm rendering and the
//! effect runtime.

pub mod input;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod update;

#[cfg(test)]
mod test_properties;

pub use model::SessionOutcome;
pub use runtime::run_interactive;
