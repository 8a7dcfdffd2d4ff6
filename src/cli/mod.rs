pub mod convert;
pub mod ui;
