//! Command Line Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("unusable library root: {}", _0.display())]
    Root(#[error(not(source))] PathBuf),
    #[display("could not set up the storefront client")]
    Client,
    #[display("metadata cache failure")]
    Cache,
    #[display("could not discover work folders")]
    Discovery,
    #[display("could not plan renames")]
    Plan,
    #[display("could not write output")]
    Output,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
