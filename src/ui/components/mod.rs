pub mod chart;
pub mod menu;
pub mod practice_area;
pub mod progress_bar;
pub mod reference_cards;
pub mod stats_dashboard;
