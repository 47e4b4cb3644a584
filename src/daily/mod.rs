pub mod audit;
pub mod config;
pub mod description;
pub mod key;
pub mod merge;
pub mod paths;
pub mod scan;
pub mod summary;
pub mod util;
pub mod warn;
