//! Human-readable rendering of daemon replies.

use roster_wire::{
    ConnectCode, ConnectedUser, DeleteCode, DisconnectCode, ListContentCode, ListUsersCode,
    Listing, PublishCode, RegisterCode, ResultCode, UnregisterCode,
};

/// What the CLI prints for one reply, and whether it counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) success: bool,
    pub(crate) lines: Vec<String>,
}

impl Outcome {
    fn of<C: ResultCode>(code: C, message: &str) -> Self {
        Self {
            success: code.is_success(),
            lines: vec![message.to_owned()],
        }
    }
}

pub(crate) fn register(code: RegisterCode) -> Outcome {
    Outcome::of(
        code,
        match code {
            RegisterCode::Success => "REGISTER OK",
            RegisterCode::NonUniqueUsername => "USERNAME IN USE",
            RegisterCode::OtherError => "REGISTER FAIL",
        },
    )
}

pub(crate) fn unregister(code: UnregisterCode) -> Outcome {
    Outcome::of(
        code,
        match code {
            UnregisterCode::Success => "UNREGISTER OK",
            UnregisterCode::NoSuchUser => "USER DOES NOT EXIST",
            UnregisterCode::OtherError => "UNREGISTER FAIL",
        },
    )
}

pub(crate) fn connect(code: ConnectCode) -> Outcome {
    Outcome::of(
        code,
        match code {
            ConnectCode::Success => "CONNECT OK",
            ConnectCode::NoSuchUser => "CONNECT FAIL, USER DOES NOT EXIST",
            ConnectCode::AlreadyConnected => "USER ALREADY CONNECTED",
            ConnectCode::OtherError => "CONNECT FAIL",
        },
    )
}

pub(crate) fn disconnect(code: DisconnectCode) -> Outcome {
    Outcome::of(
        code,
        match code {
            DisconnectCode::Success => "DISCONNECT OK",
            DisconnectCode::NoSuchUser => "DISCONNECT FAIL, USER DOES NOT EXIST",
            DisconnectCode::NotConnected => "DISCONNECT FAIL, USER NOT CONNECTED",
            DisconnectCode::OtherError => "DISCONNECT FAIL",
        },
    )
}

pub(crate) fn publish(code: PublishCode) -> Outcome {
    Outcome::of(
        code,
        match code {
            PublishCode::Success => "PUBLISH OK",
            PublishCode::NoSuchUser => "PUBLISH FAIL, USER DOES NOT EXIST",
            PublishCode::Disconnected => "PUBLISH FAIL, USER NOT CONNECTED",
            PublishCode::AlreadyPublished => "PUBLISH FAIL, CONTENT ALREADY PUBLISHED",
            PublishCode::OtherError => "PUBLISH FAIL",
        },
    )
}

pub(crate) fn delete(code: DeleteCode) -> Outcome {
    Outcome::of(
        code,
        match code {
            DeleteCode::Success => "DELETE OK",
            DeleteCode::NoSuchUser => "DELETE FAIL, USER DOES NOT EXIST",
            DeleteCode::Disconnected => "DELETE FAIL, USER NOT CONNECTED",
            DeleteCode::NotPublished => "DELETE FAIL, CONTENT NOT PUBLISHED",
            DeleteCode::OtherError => "DELETE FAIL",
        },
    )
}

/// One line per user, formatted `name ip port`.
pub(crate) fn list_users(listing: Listing<ListUsersCode, ConnectedUser>) -> Outcome {
    let mut outcome = Outcome::of(
        listing.code,
        match listing.code {
            ListUsersCode::Success => "LIST_USERS OK",
            ListUsersCode::NoSuchUser => "LIST_USERS FAIL, USER DOES NOT EXIST",
            ListUsersCode::Disconnected => "LIST_USERS FAIL, USER NOT CONNECTED",
            ListUsersCode::OtherError => "LIST_USERS FAIL",
        },
    );
    outcome.lines.extend(
        listing
            .entries
            .into_iter()
            .map(|user| format!("\t{} {} {}", user.username, user.ip, user.port)),
    );
    outcome
}

pub(crate) fn list_content(listing: Listing<ListContentCode, String>) -> Outcome {
    let mut outcome = Outcome::of(
        listing.code,
        match listing.code {
            ListContentCode::Success => "LIST_CONTENT OK",
            ListContentCode::NotRegistered => "LIST_CONTENT FAIL, USER DOES NOT EXIST",
            ListContentCode::Disconnected => "LIST_CONTENT FAIL, USER NOT CONNECTED",
            ListContentCode::NoSuchFilesOwner => "LIST_CONTENT FAIL, REMOTE USER DOES NOT EXIST",
            ListContentCode::OtherError => "LIST_CONTENT FAIL",
        },
    );
    outcome
        .lines
        .extend(listing.entries.into_iter().map(|file| format!("\t{file}")));
    outcome
}
