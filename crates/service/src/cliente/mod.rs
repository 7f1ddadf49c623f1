//! Clientes: persistence behind [`repository::ClienteRepository`] and the
//! orchestration of validation, photo files and metrics in [`service`].

pub mod repository;
pub mod service;

pub use repository::{ClienteRepository, SeaOrmClienteRepository};
pub use service::{ClienteService, DeleteReport, PAGE_SIZE};
