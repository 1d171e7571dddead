pub mod ssh_probe;

pub use ssh_probe::probe;
