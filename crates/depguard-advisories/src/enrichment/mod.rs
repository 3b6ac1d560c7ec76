pub mod epss;
pub mod kev;
