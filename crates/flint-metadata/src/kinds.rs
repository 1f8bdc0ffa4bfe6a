//! The closed set of schema object kinds
//!
//! Every item kind is immediately followed by its collection counterpart
//! in declaration order, so the two are interconvertible by code
//! arithmetic: `collection = item + 1`. `Database` is the only kind
//! without a collection and sits at code 0. The `dropObject`/`addObject`
//! routing in the container relies on this layout.

use serde::{Deserialize, Serialize};

/// Object kind tag for metadata items and their collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum ObjectKind {
    Database = 0,
    Schema,
    Schemas,
    Table,
    Tables,
    SystemTable,
    SystemTables,
    GlobalTemporaryTable,
    GlobalTemporaryTables,
    View,
    Views,
    Column,
    Columns,
    DmlTrigger,
    DmlTriggers,
    DbTrigger,
    DbTriggers,
    DdlTrigger,
    DdlTriggers,
    Domain,
    Domains,
    SystemDomain,
    SystemDomains,
    Procedure,
    Procedures,
    Function,
    Functions,
    Udf,
    Udfs,
    Generator,
    Generators,
    Exception,
    Exceptions,
    Index,
    Indices,
    SystemIndex,
    SystemIndices,
    Package,
    Packages,
    SystemPackage,
    SystemPackages,
    Role,
    Roles,
    SystemRole,
    SystemRoles,
    User,
    Users,
    Collation,
    Collations,
    CharacterSet,
    CharacterSets,
}

impl ObjectKind {
    /// Numeric type tag
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Reverse of [`ObjectKind::code`]
    pub fn from_code(code: u16) -> Option<ObjectKind> {
        use ObjectKind::*;
        const ALL: &[ObjectKind] = &[
            Database,
            Schema,
            Schemas,
            Table,
            Tables,
            SystemTable,
            SystemTables,
            GlobalTemporaryTable,
            GlobalTemporaryTables,
            View,
            Views,
            Column,
            Columns,
            DmlTrigger,
            DmlTriggers,
            DbTrigger,
            DbTriggers,
            DdlTrigger,
            DdlTriggers,
            Domain,
            Domains,
            SystemDomain,
            SystemDomains,
            Procedure,
            Procedures,
            Function,
            Functions,
            Udf,
            Udfs,
            Generator,
            Generators,
            Exception,
            Exceptions,
            Index,
            Indices,
            SystemIndex,
            SystemIndices,
            Package,
            Packages,
            SystemPackage,
            SystemPackages,
            Role,
            Roles,
            SystemRole,
            SystemRoles,
            User,
            Users,
            Collation,
            Collations,
            CharacterSet,
            CharacterSets,
        ];
        ALL.get(code as usize).copied()
    }

    /// Collection kinds sit at odd offsets right after their item kind
    pub fn is_collection(self) -> bool {
        let code = self.code();
        code != 0 && code % 2 == 0
    }

    /// The collection kind holding items of this kind
    pub fn collection_kind(self) -> Option<ObjectKind> {
        if self == ObjectKind::Database || self.is_collection() {
            return None;
        }
        ObjectKind::from_code(self.code() + 1)
    }

    /// The item kind contained by this collection kind
    pub fn item_kind(self) -> Option<ObjectKind> {
        if !self.is_collection() {
            return None;
        }
        ObjectKind::from_code(self.code() - 1)
    }

    /// Anything that owns columns and can be a DML trigger's target
    pub fn is_relation(self) -> bool {
        matches!(
            self,
            ObjectKind::Table
                | ObjectKind::SystemTable
                | ObjectKind::GlobalTemporaryTable
                | ObjectKind::View
        )
    }

    /// Server-predefined object kinds
    pub fn is_system(self) -> bool {
        matches!(
            self,
            ObjectKind::SystemTable
                | ObjectKind::SystemTables
                | ObjectKind::SystemDomain
                | ObjectKind::SystemDomains
                | ObjectKind::SystemIndex
                | ObjectKind::SystemIndices
                | ObjectKind::SystemPackage
                | ObjectKind::SystemPackages
                | ObjectKind::SystemRole
                | ObjectKind::SystemRoles
        )
    }

    /// SQL-ish type name, e.g. "TABLE" or "TRIGGER_COLLECTION"
    pub fn type_name(self) -> &'static str {
        use ObjectKind::*;
        match self {
            Database => "DATABASE",
            Schema => "SCHEMA",
            Schemas => "SCHEMA_COLLECTION",
            Table | SystemTable | GlobalTemporaryTable => "TABLE",
            Tables => "TABLE_COLLECTION",
            SystemTables => "SYSTABLE_COLLECTION",
            GlobalTemporaryTables => "GTT_COLLECTION",
            View => "VIEW",
            Views => "VIEW_COLLECTION",
            Column => "COLUMN",
            Columns => "COLUMN_COLLECTION",
            DmlTrigger | DbTrigger | DdlTrigger => "TRIGGER",
            DmlTriggers => "TRIGGER_COLLECTION",
            DbTriggers => "DBTRIGGER_COLLECTION",
            DdlTriggers => "DDLTRIGGER_COLLECTION",
            Domain | SystemDomain => "DOMAIN",
            Domains => "DOMAIN_COLLECTION",
            SystemDomains => "SYSDOMAIN_COLLECTION",
            Procedure => "PROCEDURE",
            Procedures => "PROCEDURE_COLLECTION",
            Function | Udf => "FUNCTION",
            Functions => "FUNCTION_COLLECTION",
            Udfs => "UDF_COLLECTION",
            Generator => "SEQUENCE",
            Generators => "SEQUENCE_COLLECTION",
            Exception => "EXCEPTION",
            Exceptions => "EXCEPTION_COLLECTION",
            Index | SystemIndex => "INDEX",
            Indices => "INDEX_COLLECTION",
            SystemIndices => "SYSINDEX_COLLECTION",
            Package | SystemPackage => "PACKAGE",
            Packages => "PACKAGE_COLLECTION",
            SystemPackages => "SYSPACKAGE_COLLECTION",
            Role | SystemRole => "ROLE",
            Roles => "ROLE_COLLECTION",
            SystemRoles => "SYSROLE_COLLECTION",
            User => "USER",
            Users => "USER_COLLECTION",
            Collation => "COLLATION",
            Collations => "COLLATION_COLLECTION",
            CharacterSet => "CHARACTER SET",
            CharacterSets => "CHARSET_COLLECTION",
        }
    }

    /// Human-readable collection title as shown in the navigation tree
    pub fn collection_title(self) -> &'static str {
        use ObjectKind::*;
        match self {
            Schemas => "Schemas",
            Tables => "Tables",
            SystemTables => "System Tables",
            GlobalTemporaryTables => "Global Temporary Tables",
            Views => "Views",
            Columns => "Columns",
            DmlTriggers => "Triggers",
            DbTriggers => "Database Triggers",
            DdlTriggers => "DDL Triggers",
            Domains => "Domains",
            SystemDomains => "System Domains",
            Procedures => "Procedures",
            Functions => "Functions",
            Udfs => "UDFs",
            Generators => "Sequences",
            Exceptions => "Exceptions",
            Indices => "Indices",
            SystemIndices => "System Indices",
            Packages => "Packages",
            SystemPackages => "System Packages",
            Roles => "Roles",
            SystemRoles => "System Roles",
            Users => "Users",
            Collations => "Collations",
            CharacterSets => "Character Sets",
            _ => self.type_name(),
        }
    }
}

#[cfg(test)]
#[path = "kinds_tests.rs"]
mod tests;
