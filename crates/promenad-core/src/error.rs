use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromenadError {
    #[error("{table} table is full ({capacity} rows)")]
    CapacityExceeded { table: &'static str, capacity: usize },

    #[error("bone pool exhausted ({capacity} nodes)")]
    PoolExhausted { capacity: usize },

    #[error("{table} table already has a row for id {id}")]
    DuplicateRow { table: &'static str, id: u16 },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PromenadError>;
