pub mod breakout;
pub mod traits;
