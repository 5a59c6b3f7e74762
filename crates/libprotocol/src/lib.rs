mod message;
mod protocol_error;

pub use crate::message::{
    SignalMessage, ANSWER, ICE, OFFER, REGISTER_REQUEST, REGISTER_SUCCESS,
};
pub use crate::protocol_error::{JsonError, ProtocolError};

pub type Result<T> = std::result::Result<T, ProtocolError>;
