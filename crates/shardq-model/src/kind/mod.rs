mod controller;
pub use controller::{ControllerKind, parse_kind_list};
