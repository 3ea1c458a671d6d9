use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    CmdArgs { msg: String },
    File { msg: String },
    Serde { msg: String },
    Core(cipsi_core::Error),
}

impl Display for Error {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Error::CmdArgs {
                msg,
            } => write!(f, "[command line] {msg}"),
            Error::File {
                msg,
            } => write!(f, "[file] {msg}"),
            Error::Core(e) => write!(f, "cipsi-core: {e}"),
            Error::Serde {
                msg,
            } => write!(f, "[serde] {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<&Error> for u8 {
    fn from(value: &Error) -> Self {
        match value {
            Error::CmdArgs {
                ..
            } => 1,
            Error::File {
                ..
            } => 2,
            Error::Core(_) => 3,
            Error::Serde {
                ..
            } => 11,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::File {
            msg: format!("{value}"),
        }
    }
}

impl From<cipsi_core::Error> for Error {
    fn from(value: cipsi_core::Error) -> Self {
        Self::Core(value)
    }
}

macro_rules! impl_serde_error {
    ($($Typ:ty)* ) => {
        $(
            impl From<$Typ> for Error {
                fn from(value: $Typ) -> Self {
                    Self::Serde { msg: format!("{value}") }
                }
            }
        )*
    };
}

impl_serde_error!(serde_json::Error);
impl_serde_error!(serde_yaml::Error);
impl_serde_error!(toml::ser::Error toml::de::Error);
