pub mod case;
pub mod history;
pub mod menu;
pub mod progress;
