pub mod buyer;
pub mod draft;
pub mod line;
pub mod offer;
