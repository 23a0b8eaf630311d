pub mod input;
pub mod picker;
pub mod practice;
