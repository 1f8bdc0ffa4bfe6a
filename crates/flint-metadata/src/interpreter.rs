//! The DDL change interpreter
//!
//! After a statement executes against the live database, exactly one of
//! the rules below decides which part of the metadata graph is stale.
//! Full reloads cost one query per object; this table invalidates only
//! what the statement could have changed.
//!
//! Rule order is significant and first match wins:
//!
//!  1. non-DDL statements are ignored
//!  2. GRANT notifies the target's observers only
//!  3. DROP INDEX sweeps the denormalized index caches
//!  4. CREATE/ALTER/SET on an index re-resolves the owning table
//!  5. DROP TRIGGER broadcasts to every relation (and drops the item)
//!  6. CREATE/DECLARE inserts an empty placeholder
//!  7. SET/ALTER on a generator re-fetches its value
//!  8. DROP removes the object, cascading to its DML triggers
//!  9. ALTER COLUMN with a type change invalidates the backing domain
//! 10. COMMENT invalidates only the description text
//! 11. ALTER falls back to a per-kind invalidation policy

use crate::database::{ignore_missing, Database};
use crate::kinds::ObjectKind;
use crate::procedure;
use crate::relation;
use crate::statement::{ExecutedStatement, StatementAction};
use flint_core::Result;
use std::sync::Arc;

impl Database {
    /// Apply the change a committed statement made to the metadata model
    pub async fn parse_committed_sql(
        self: &Arc<Self>,
        stm: &ExecutedStatement,
    ) -> Result<()> {
        // rule 1: nothing to do for plain DML
        if !stm.is_ddl() {
            return Ok(());
        }
        tracing::debug!(
            action = ?stm.action(),
            kind = ?stm.object_kind(),
            name = %stm.name(),
            "interpreting committed statement"
        );

        // rule 2: privileges are not cached in detail
        if stm.action_is(StatementAction::Grant) {
            if let Some(object) = stm.object() {
                object.notify_observers();
            }
            return Ok(());
        }

        // rule 3: every loaded relation forgets a dropped index it cached
        if stm.action_on(StatementAction::Drop, ObjectKind::Index) {
            for kind in [ObjectKind::Tables, ObjectKind::GlobalTemporaryTables] {
                if let Some(collection) = self.collection(kind) {
                    for table in collection.items() {
                        relation::invalidate_indices(&table, Some(stm.identifier()));
                    }
                }
            }
            return Ok(());
        }

        // rule 4: CREATE INDEX, ALTER INDEX, SET STATISTICS INDEX
        if stm.object_kind() == ObjectKind::Index
            && (stm.action_is(StatementAction::Create)
                || stm.action_is(StatementAction::Alter)
                || stm.action_is(StatementAction::Set))
        {
            if let Some(table_name) = self.relation_name_for_index(stm.name()).await?
                && let Some(table) = self.find_by_kind_and_name(ObjectKind::Table, table_name.get())
            {
                relation::invalidate_indices(&table, None);
            }
            if let Some(object) = stm.object()
                && object.kind() == ObjectKind::Index
            {
                object.invalidate();
                ignore_missing(object.ensure_properties_loaded(self).await)?;
                object.notify_observers();
            }
            // the tree may need to re-sort
            self.notify_observers();
            return Ok(());
        }

        // rule 5: a dropped trigger can affect any relation's trigger list
        if stm.action_on(StatementAction::Drop, ObjectKind::DmlTrigger) {
            for kind in [
                ObjectKind::Tables,
                ObjectKind::GlobalTemporaryTables,
                ObjectKind::Views,
            ] {
                if let Some(collection) = self.collection(kind) {
                    for item in collection.items() {
                        item.notify_observers();
                    }
                }
            }
            self.notify_observers();
            if let Some(object) = stm.object() {
                self.drop_object(object);
            }
            return Ok(());
        }

        // rule 6: a new object becomes an empty placeholder, no reload
        if stm.action_is(StatementAction::Create) || stm.action_is(StatementAction::Declare) {
            self.add_object(stm.object_kind(), stm.identifier().clone());
            if let Some(relation_name) = stm.create_trigger_relation() {
                match self.find_relation(relation_name) {
                    Some(relation) => relation.notify_observers(),
                    None => {}
                }
            } else if stm.object_kind() == ObjectKind::DmlTrigger {
                // database-level trigger, most likely
                self.notify_observers();
            }
            return Ok(());
        }

        // the remaining rules need the resolved target
        let Some(object) = stm.object().cloned() else {
            return Ok(());
        };

        // rule 7: the generator's current value went stale
        if stm.object_kind() == ObjectKind::Generator
            && (stm.action_is(StatementAction::Set) || stm.action_is(StatementAction::Alter))
        {
            object.invalidate();
            ignore_missing(object.ensure_properties_loaded(self).await)?;
            return Ok(());
        }

        // rule 8: removal, with the trigger cascade for relations
        if stm.action_is(StatementAction::Drop) {
            self.drop_object(&object);
            if matches!(
                stm.object_kind(),
                ObjectKind::Table | ObjectKind::View | ObjectKind::GlobalTemporaryTable
            ) && let Some(triggers) = self.collection(ObjectKind::DmlTriggers)
            {
                for trigger_item in triggers.items() {
                    let relation_name = self.relation_name_for_trigger(&trigger_item).await;
                    // an unresolvable relation is conservatively a match
                    let affected = match relation_name {
                        None => true,
                        Some(name) => name == *stm.identifier(),
                    };
                    if affected {
                        self.drop_object(&trigger_item);
                    }
                }
            }
            return Ok(());
        }

        // rule 9: ALTER COLUMN changing the data type shifts the column
        // onto another (possibly auto-created) domain
        if stm.is_alter_column() && stm.is_datatype() {
            let Some(relation_item) = self.find_relation(stm.identifier()) else {
                return Ok(());
            };
            relation_item.ensure_children_loaded(self).await?;
            let domain_name = stm
                .field_name()
                .and_then(|field| relation::find_column(&relation_item, field))
                .and_then(|column| relation::column_source(&column));
            if let Some(domain_name) = domain_name {
                let collection_kind = if domain_name.has_system_prefix() {
                    ObjectKind::SystemDomains
                } else {
                    ObjectKind::Domains
                };
                if let Some(domains) = self.collection(collection_kind) {
                    let domain = domains
                        .find_by_name(domain_name.get())
                        .unwrap_or_else(|| domains.insert(domain_name));
                    domain.invalidate();
                }
            }
            return Ok(());
        }

        // rule 10: only the description text changed
        if stm.action_is(StatementAction::Comment) {
            object.invalidate_description();
            object.notify_observers();
            return Ok(());
        }

        // rule 11: per-kind ALTER policy
        if stm.action_is(StatementAction::Alter) {
            match stm.object_kind() {
                ObjectKind::Procedure => {
                    object.invalidate();
                    procedure::check_dependent_procedures(self, &object).await?;
                }
                ObjectKind::DdlTrigger | ObjectKind::DbTrigger => {
                    object.invalidate();
                    ignore_missing(object.ensure_properties_loaded(self).await)?;
                    object.notify_observers();
                    self.notify_observers();
                }
                ObjectKind::DmlTrigger => {
                    object.invalidate();
                    ignore_missing(object.ensure_properties_loaded(self).await)?;
                    object.notify_observers();
                    match self.relation_for_trigger(&object) {
                        Some(relation_item) => relation_item.notify_observers(),
                        // database trigger
                        None => self.notify_observers(),
                    }
                }
                ObjectKind::Domain | ObjectKind::SystemDomain => {
                    object.invalidate();
                    // every column declared over this domain is stale now
                    for kind in [ObjectKind::Tables, ObjectKind::GlobalTemporaryTables] {
                        if let Some(collection) = self.collection(kind) {
                            for table in collection.items() {
                                for column in relation::columns(&table) {
                                    if relation::column_source(&column)
                                        .is_some_and(|source| source == *stm.identifier())
                                    {
                                        column.invalidate();
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {
                    object.invalidate();
                    object.notify_observers();
                    self.notify_observers();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
