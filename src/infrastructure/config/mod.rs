//! Configuration storage

mod xdg;

pub use xdg::{default_output_dir, XdgConfigStore};
