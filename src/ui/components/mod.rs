pub mod menu;
pub mod progress_bar;
pub mod quiz_card;
pub mod review_list;
pub mod stats_sidebar;
