//! Classified executed statements
//!
//! The SQL layer classifies every successfully executed statement into
//! an action, an object kind and a target name before handing it to the
//! change interpreter. Only the accessors the interpreter needs are
//! carried here; the statement text itself stays with the SQL layer.

use crate::{Identifier, MetadataItem, ObjectKind};
use std::sync::Arc;

/// Statement action vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementAction {
    Create,
    Alter,
    Drop,
    Set,
    Comment,
    Grant,
    Declare,
}

/// A successfully executed, classified SQL statement
#[derive(Clone)]
pub struct ExecutedStatement {
    action: StatementAction,
    object_kind: ObjectKind,
    name: Identifier,
    object: Option<Arc<MetadataItem>>,
    ddl: bool,
    field_name: Option<Identifier>,
    alters_datatype: bool,
    trigger_relation: Option<Identifier>,
}

impl ExecutedStatement {
    /// Classify a DDL statement
    pub fn new(action: StatementAction, object_kind: ObjectKind, name: impl Into<Identifier>) -> Self {
        Self {
            action,
            object_kind,
            name: name.into(),
            object: None,
            ddl: true,
            field_name: None,
            alters_datatype: false,
            trigger_relation: None,
        }
    }

    /// A statement that is not DDL at all (ignored by the interpreter)
    pub fn non_ddl() -> Self {
        let mut stm = Self::new(StatementAction::Set, ObjectKind::Database, "");
        stm.ddl = false;
        stm
    }

    /// Attach the already-resolved target item
    pub fn with_object(mut self, object: Arc<MetadataItem>) -> Self {
        self.object = Some(object);
        self
    }

    /// Mark as `ALTER TABLE <name> ALTER <column> ...`
    pub fn with_field(mut self, field: impl Into<Identifier>) -> Self {
        self.field_name = Some(field.into());
        self
    }

    /// Mark the altered column as changing its data type
    pub fn with_datatype_change(mut self) -> Self {
        self.alters_datatype = true;
        self
    }

    /// Record the relation a created trigger fires on
    pub fn with_trigger_relation(mut self, relation: impl Into<Identifier>) -> Self {
        self.trigger_relation = Some(relation.into());
        self
    }

    pub fn is_ddl(&self) -> bool {
        self.ddl
    }

    pub fn action(&self) -> StatementAction {
        self.action
    }

    pub fn action_is(&self, action: StatementAction) -> bool {
        self.action == action
    }

    /// Action and object kind match together
    pub fn action_on(&self, action: StatementAction, kind: ObjectKind) -> bool {
        self.action == action && self.object_kind == kind
    }

    pub fn object_kind(&self) -> ObjectKind {
        self.object_kind
    }

    pub fn name(&self) -> &str {
        self.name.get()
    }

    pub fn identifier(&self) -> &Identifier {
        &self.name
    }

    /// The resolved target item, when the SQL layer could find one
    pub fn object(&self) -> Option<&Arc<MetadataItem>> {
        self.object.as_ref()
    }

    pub fn is_alter_column(&self) -> bool {
        self.field_name.is_some()
    }

    pub fn field_name(&self) -> Option<&Identifier> {
        self.field_name.as_ref()
    }

    pub fn is_datatype(&self) -> bool {
        self.alters_datatype
    }

    pub fn create_trigger_relation(&self) -> Option<&Identifier> {
        self.trigger_relation.as_ref()
    }
}

impl std::fmt::Debug for ExecutedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutedStatement")
            .field("action", &self.action)
            .field("object_kind", &self.object_kind)
            .field("name", &self.name)
            .field("ddl", &self.ddl)
            .finish()
    }
}

#[cfg(test)]
#[path = "statement_tests.rs"]
mod tests;
