pub mod annotate;
pub mod config;
pub mod jtl;
pub mod logging;
pub mod notify;
pub mod panels;
pub mod render;
