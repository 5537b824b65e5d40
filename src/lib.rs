pub mod cli;
pub mod io;
pub mod layout;
pub mod model;
pub mod ops;
