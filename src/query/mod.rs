pub mod period;
pub mod source;
