pub mod catalog;
pub mod judge;
pub mod next;
pub mod progress;
pub mod reset;
pub mod settings;
pub mod start;
pub mod study;
pub mod words;
