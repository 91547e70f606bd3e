use thiserror::Error;

use crate::catalog::{ClassId, ModuleId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("the username {0:?} is already taken")]
    DuplicateUsername(String),

    #[error("wrong username or password")]
    InvalidCredentials,

    #[error("no user called {0:?}")]
    UnknownUser(String),

    #[error("no class with id {0}")]
    UnknownClass(ClassId),

    #[error("class {class_id} has no module {module_id}")]
    UnknownModule { class_id: ClassId, module_id: ModuleId },

    #[error("could not hash password: {0}")]
    PasswordHash(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
