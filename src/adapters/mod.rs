// Adapters layer: concrete implementations of the domain ports for the host system.

pub mod port_probe;
pub mod process;
pub mod terminal;

pub use port_probe::TcpPortProbe;
pub use process::SystemRunner;
pub use terminal::StdConsole;
