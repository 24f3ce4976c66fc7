#[macro_use(debug, trace)]
extern crate tracing;

pub mod assertion;
pub mod config;
pub mod description;
pub mod input;
pub mod interval_tree;
pub mod matcher;
pub mod parallel;
pub mod submatch;
pub mod tags;
pub mod tnfa;

pub mod c_interface;
#[cfg(feature = "python")]
pub mod python_interface;
