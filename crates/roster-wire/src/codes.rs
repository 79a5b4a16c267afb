//! Result codes returned as the first byte of every response.

/// Behaviour shared by the per-command result-code enums.
pub trait ResultCode: Copy + Sized {
    /// Code reported when the daemon fails for reasons other than the
    /// command-specific outcomes.
    const OTHER_ERROR: Self;

    /// Encodes the code as its wire byte.
    fn as_byte(self) -> u8;

    /// Decodes a wire byte, returning `None` for bytes outside the command's
    /// code table.
    fn from_byte(byte: u8) -> Option<Self>;

    /// Returns true for the success code.
    fn is_success(self) -> bool {
        self.as_byte() == 0
    }
}

macro_rules! result_codes {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident = $value:literal,)+
        }
        other = $other:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$variant_meta])* $variant = $value,)+
        }

        impl ResultCode for $name {
            const OTHER_ERROR: Self = Self::$other;

            fn as_byte(self) -> u8 {
                self as u8
            }

            fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

result_codes! {
    /// Outcome of `REGISTER`.
    RegisterCode {
        /// The user directory was created.
        Success = 0,
        /// Another user already holds the name.
        NonUniqueUsername = 1,
        /// Invalid username or storage failure.
        OtherError = 2,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `UNREGISTER`.
    UnregisterCode {
        /// The user and all of their content were removed.
        Success = 0,
        /// No user with that name exists.
        NoSuchUser = 1,
        /// Invalid username or storage failure.
        OtherError = 2,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `CONNECT`.
    ConnectCode {
        /// The session was recorded.
        Success = 0,
        /// No user with that name exists.
        NoSuchUser = 1,
        /// The user already has a session.
        AlreadyConnected = 2,
        /// Invalid arguments or internal failure.
        OtherError = 3,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `DISCONNECT`.
    DisconnectCode {
        /// The session was removed.
        Success = 0,
        /// No user with that name exists.
        NoSuchUser = 1,
        /// The user has no session.
        NotConnected = 2,
        /// Invalid arguments or internal failure.
        OtherError = 3,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `PUBLISH`.
    PublishCode {
        /// The content item was created.
        Success = 0,
        /// No user with that name exists.
        NoSuchUser = 1,
        /// The user has no session.
        Disconnected = 2,
        /// The user already published a file with that name.
        AlreadyPublished = 3,
        /// Invalid arguments or storage failure.
        OtherError = 4,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `DELETE`.
    DeleteCode {
        /// The content item was removed.
        Success = 0,
        /// No user with that name exists.
        NoSuchUser = 1,
        /// The user has no session.
        Disconnected = 2,
        /// The user never published a file with that name.
        NotPublished = 3,
        /// Invalid arguments or storage failure.
        OtherError = 4,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `LIST_USERS`.
    ListUsersCode {
        /// A count and the connected users follow.
        Success = 0,
        /// The requesting user is not registered.
        NoSuchUser = 1,
        /// The requesting user has no session.
        Disconnected = 2,
        /// Invalid arguments or internal failure.
        OtherError = 3,
    }
    other = OtherError
}

result_codes! {
    /// Outcome of `LIST_CONTENT`.
    ListContentCode {
        /// A count and the owner's filenames follow.
        Success = 0,
        /// The requesting user is not registered.
        NotRegistered = 1,
        /// The requesting user has no session.
        Disconnected = 2,
        /// The content owner is not registered.
        NoSuchFilesOwner = 3,
        /// Invalid arguments or storage failure.
        OtherError = 4,
    }
    other = OtherError
}
