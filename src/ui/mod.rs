pub mod panels;
pub mod windows;
