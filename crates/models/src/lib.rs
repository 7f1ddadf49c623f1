pub mod errors;
pub mod db;
pub mod region;
pub mod cliente;
pub mod producto;
pub mod factura;
pub mod item_factura;
