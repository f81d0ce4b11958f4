pub mod chart;
pub mod file_card;
pub mod panels;
