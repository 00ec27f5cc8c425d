use crate::error::{Error, ErrorKind};

/// Return code of the C support-layer calls.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetCode {
    Success = 0,
    Failure = 1,
}

impl RetCode {
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            RetCode::Success => Ok(()),
            RetCode::Failure => Err(ErrorKind::Failure.into()),
        }
    }
}
