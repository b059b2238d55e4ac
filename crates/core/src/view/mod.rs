pub mod filter;
pub mod strategy_index;
