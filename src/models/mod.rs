pub mod item;
pub mod outfit;

pub use item::*;
pub use outfit::*;
