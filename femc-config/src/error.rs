#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to open configuration file: {0}")]
    FileOpen(#[source] std::io::Error),
    #[error("section [{0}] not found in configuration file")]
    SectionNotFound(String),
    #[error("key {key} not found in section [{section}]")]
    KeyNotFound { section: String, key: String },
    #[error("value for {key} in [{section}] could not be parsed")]
    BadValue { section: String, key: String },
    #[error("non-volatile image could not be read: {0}")]
    NvRead(#[source] std::io::Error),
    #[error("non-volatile image could not be written: {0}")]
    NvWrite(#[source] std::io::Error),
    #[error("non-volatile image is corrupt: {0}")]
    NvDecode(#[source] Box<bincode::ErrorKind>),
    #[error("non-volatile image could not be encoded: {0}")]
    NvEncode(#[source] Box<bincode::ErrorKind>),
}
