//! Table regions layered over a worksheet grid: the region model, the table
//! entity and the value extraction scans.
pub mod column;
pub mod extract;
pub mod region;
pub mod table;
