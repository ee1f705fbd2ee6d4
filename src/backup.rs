//! Motor de backup e restauração de dados de um tenant.
//!
//! Exportação: todas as coleções do tenant lidas em paralelo e normalizadas num
//! [`BackupBundle`](crate::models::backup::BackupBundle) versionado.
//! Importação: validação do arquivo, depois apagar e recriar tudo numa única
//! transação, na ordem das chaves estrangeiras, e só então invalidar os caches.

pub mod catalog;
pub mod coordinator;
pub mod serializer;
pub mod store;
pub mod summary;
pub mod validator;

#[cfg(test)]
pub(crate) mod memory;
