pub mod batch;
pub mod price;
pub mod signals;
pub mod watchlist;

pub use batch::*;
pub use price::*;
pub use signals::*;
pub use watchlist::*;
