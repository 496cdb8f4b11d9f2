pub mod buyer;
pub mod draft;
pub mod offer;
