//! Service layer for clientes and their photos.
//! - `upload`: File Storage Service over a configurable upload root.
//! - `cliente`: data access (repository) and orchestration (service).
//! - `factura_service`: facturas with their items, producto search.
//! - Reuses validation and entity definitions in `models` crate.

pub mod errors;
pub mod runtime;
pub mod pagination;
pub mod upload;
pub mod cliente;
pub mod factura_service;
#[cfg(test)]
pub mod test_support;
