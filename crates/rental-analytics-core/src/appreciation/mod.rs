pub mod projection;
pub mod resolver;
