pub mod attribution;
pub mod eda;
pub mod outbound;
pub mod panels;
pub mod plot;
pub mod table;
