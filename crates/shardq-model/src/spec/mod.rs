mod manager;
pub use manager::ManagerSpec;
