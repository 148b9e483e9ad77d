//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the container's render model and turns it into cells
//! on the terminal.  Animation timing lives here too: the core only says
//! where things should end up.

pub mod layout;
pub mod popup;
pub mod slides;
pub mod theme;
pub mod transition;
