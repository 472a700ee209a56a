
pub mod core {
    pub mod config;
    pub mod error;
    pub mod runner;
    pub mod test;
}


pub mod reporters;
pub mod resolver;
