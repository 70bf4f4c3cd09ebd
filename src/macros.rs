//===========================================================================//

macro_rules! malformed {
    ($e:expr) => {
        return Err($crate::error::IcoError::MalformedContainer(
            ::std::string::String::from($e),
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::IcoError::MalformedContainer(
            format!($fmt, $($arg)+),
        ))
    };
}

macro_rules! unsupported_payload {
    ($e:expr) => {
        return Err($crate::error::IcoError::UnsupportedPayloadFormat(
            ::std::string::String::from($e),
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::IcoError::UnsupportedPayloadFormat(
            format!($fmt, $($arg)+),
        ))
    };
}

//===========================================================================//

macro_rules! truncated {
    ($e:expr) => {
        return Err($crate::error::IcoError::TruncatedStream(
            ::std::io::Error::new(::std::io::ErrorKind::UnexpectedEof, $e),
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::IcoError::TruncatedStream(
            ::std::io::Error::new(::std::io::ErrorKind::UnexpectedEof,
                                  format!($fmt, $($arg)+)),
        ))
    };
}

//===========================================================================//
