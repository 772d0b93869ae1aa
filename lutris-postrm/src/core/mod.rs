/*!
Core modules for the package removal hook
*/

pub mod config;
pub mod decision;
pub mod hook;
pub mod notifiers;
