//! # 凭证存储模块
//!
//! 凭证的读取与同步结果记录；凭证的创建/删除属于外部管理面

pub mod store;

pub use store::{CredentialStore, CredentialWithProvider, SeaOrmCredentialStore};
