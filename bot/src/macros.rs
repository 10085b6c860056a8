/// Helper macro to generate a respond error.
macro_rules! respond_err {
    ($($t:tt)*) => {
        $crate::command::Respond(std::borrow::Cow::Owned(format!($($t)*)))
    };
}

/// Helper macro to bail with a respond error.
///
/// Bail from the current function with the given response, which is sent
/// back to the user who issued the command.
macro_rules! respond_bail {
    ($($t:tt)*) => {
        return Err(respond_err!($($t)*).into())
    };
}
