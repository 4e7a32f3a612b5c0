use std::fmt;

/// The logical tables persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Shops,
    Licenses,
    RecoveryCodes,
    AdminAccounts,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Shops,
        Table::Licenses,
        Table::RecoveryCodes,
        Table::AdminAccounts,
    ];

    /// Table name; also the AEAD context the blob is bound to.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shops => "shops",
            Self::Licenses => "licenses",
            Self::RecoveryCodes => "recovery_codes",
            Self::AdminAccounts => "admin_accounts",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Shops => "shops.dat",
            Self::Licenses => "licenses.dat",
            Self::RecoveryCodes => "recovery_codes.dat",
            Self::AdminAccounts => "admin_accounts.dat",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
