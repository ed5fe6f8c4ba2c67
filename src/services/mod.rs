pub mod closet;
pub mod stylist;

pub use closet::ClosetService;
pub use stylist::StylistService;
