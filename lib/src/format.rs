use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Chainable, ErrorDetail, Result};

/// A structured data format that documents and configuration are written in.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Human readable name of the format, used in error messages.
    const NAME: &'static str;

    /// Parses `string` in the data format `Self` as a `T` or returns an error
    /// if `string` is not a valid `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads the file at `path` and parses its contents as a `T`.
    fn read<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let string = fs::read_to_string(path).chain_with(|| error! {
            format!("failed to read {} file", Self::NAME),
            "path" => path.display(),
        })?;

        Self::from_str(&string).chain_with(|| error! {
            format!("failed to parse {} file", Self::NAME),
            "path" => path.display(),
        })
    }
}

macro_rules! impl_format {
    ($name:ident ($display:literal) : $func:expr, $E:ty) => (
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const NAME: &'static str = $display;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml("TOML"): toml::from_str, toml::de::Error);
impl_format!(Yaml("YAML"): serde_yaml::from_str, serde_yaml::Error);
