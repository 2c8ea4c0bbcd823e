use std::fmt;

/// Role of a registered person. Stored in `users.type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Admin,
    Regular,
}

impl UserType {
    pub const fn id(self) -> i32 {
        match self {
            UserType::Admin => 1,
            UserType::Regular => 2,
        }
    }

    /// Unknown or missing ids are treated as the least privileged role.
    pub fn from_id(id: Option<i32>) -> Self {
        match id {
            Some(1) => UserType::Admin,
            _ => UserType::Regular,
        }
    }
}

/// Kinds of identity documents. Stored in `documents.type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Passport,
    Policy,
    Snils,
    Inn,
}

impl DocumentType {
    pub const fn id(self) -> i32 {
        match self {
            DocumentType::Passport => 1,
            DocumentType::Policy => 2,
            DocumentType::Snils => 3,
            DocumentType::Inn => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(DocumentType::Passport),
            2 => Some(DocumentType::Policy),
            3 => Some(DocumentType::Snils),
            4 => Some(DocumentType::Inn),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentType::Passport => "passport",
            DocumentType::Policy => "policy",
            DocumentType::Snils => "SNILS",
            DocumentType::Inn => "INN",
        };
        f.write_str(name)
    }
}
